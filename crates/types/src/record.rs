//! Registry records and reconstructed ownership events.

use crate::key::AccountKey;
use crate::memo::EventKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a registry asset record. Records are never deleted,
/// only flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Active,
    Flagged,
    Burned,
}

/// Reference to one notarized asset class on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Short symbolic code.
    pub code: String,
    /// Issuing account key; immutable identity of the asset class.
    pub issuer: AccountKey,
}

impl AssetRef {
    pub fn new(code: impl Into<String>, issuer: AccountKey) -> Self {
        Self {
            code: code.into(),
            issuer,
        }
    }
}

/// Off-chain record of a notarized asset, always subordinate to live ledger
/// truth. Mutated only by the reconciliation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryAsset {
    /// Globally unique 6-digit numeric id.
    pub registered_id: String,
    pub asset_code: String,
    /// Immutable once set.
    pub issuer_key: AccountKey,
    /// Full content fingerprint, when known.
    pub fingerprint: Option<String>,
    /// Last known owner, per the most recent reconciliation.
    pub cached_owner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_verified_at: Option<DateTime<Utc>>,
    pub status: AssetStatus,
}

impl RegistryAsset {
    pub fn asset_ref(&self) -> AssetRef {
        AssetRef::new(self.asset_code.clone(), self.issuer_key.clone())
    }
}

/// One entry in the reconstructed ownership timeline. Immutable once
/// observed; the set is rebuilt, never edited, on each scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipEvent {
    pub kind: EventKind,
    /// The 20-character wire form of the fingerprint.
    pub fingerprint: String,
    /// Account emitting the registration or receiving the transfer.
    pub actor: String,
    /// Ledger transaction identifier.
    pub tx_ref: String,
    pub occurred_at: DateTime<Utc>,
}

/// Source of a verification verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationSource {
    LiveChain,
}

/// Append-only audit trail entry written by the reconciliation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationLog {
    pub registered_id: String,
    pub verified_owner: Option<String>,
    pub verified_at: DateTime<Utc>,
    pub source: VerificationSource,
    /// What triggered the verification (caller-supplied reference).
    pub trigger_ref: String,
}

/// Off-chain profile for a ledger account, upserted on first appearance of
/// an owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub wallet_address: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Placeholder profile for an owner seen for the first time.
    pub fn anonymous(wallet_address: impl Into<String>) -> Self {
        Self {
            wallet_address: wallet_address.into(),
            display_name: "Anonymous".to_string(),
            created_at: Utc::now(),
        }
    }
}
