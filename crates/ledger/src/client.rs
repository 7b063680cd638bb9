//! Query boundary to the ledger network.
//!
//! The reconciliation core only ever reads the ledger; everything it needs is
//! behind this trait so tests can script the chain state.

use crate::errors::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ledgermark_types::AssetRef;

/// An account holding a trustline to some asset, with its balance.
///
/// The query layer returns zero-balance trustlines too; filtering them out is
/// the owner resolver's job, since a closed trustline is not ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustlineHolder {
    pub account: String,
    pub balance: String,
}

impl TrustlineHolder {
    /// Whether the trustline carries a strictly positive balance.
    pub fn has_balance(&self) -> bool {
        self.balance.parse::<f64>().map(|b| b > 0.0).unwrap_or(false)
    }
}

/// A pending claimable balance: funds issued but not yet claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimableBalance {
    pub id: String,
    /// Accounts entitled to claim, in ledger order.
    pub claimants: Vec<String>,
    pub amount: String,
}

/// Which transaction log to walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxScope {
    /// One account's transaction history.
    Account(String),
    /// The network's global transaction stream.
    Global,
}

/// Summary record from the transaction log. Operation details require a
/// separate, lazy fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRecord {
    pub hash: String,
    pub source_account: String,
    /// Plain-text memo, if the transaction carried one.
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One page of transaction records, newest first.
#[derive(Debug, Clone, Default)]
pub struct TxPage {
    pub records: Vec<TxRecord>,
    /// Cursor for the next (older) page; `None` when the log is exhausted.
    pub next_cursor: Option<String>,
}

/// Detailed operation inside a transaction, reduced to what destination
/// extraction needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOperation {
    Payment { destination: String },
    CreateAccount { destination: String },
    CreateClaimableBalance { claimants: Vec<String> },
    Other,
}

/// Read-only view of the ledger network.
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    /// Accounts holding a trustline to the asset, with balances. Includes
    /// zero-balance trustlines.
    async fn trustline_holders(&self, asset: &AssetRef) -> Result<Vec<TrustlineHolder>>;

    /// Pending claimable balances for the asset.
    async fn claimable_balances(&self, asset: &AssetRef) -> Result<Vec<ClaimableBalance>>;

    /// One page of the transaction log for the scope, newest first.
    async fn transactions(
        &self,
        scope: &TxScope,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<TxPage>;

    /// Detailed operations of one transaction.
    async fn operations(&self, tx_hash: &str) -> Result<Vec<LedgerOperation>>;
}
