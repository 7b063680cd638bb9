//! Ownership timeline reconstruction from the memo-tagged transaction log.

use crate::client::{LedgerOperation, LedgerQuery, TxRecord, TxScope};
use ledgermark_types::{decode_memo, EventKind, OwnershipEvent};
use serde::Serialize;
use std::sync::Arc;

/// Maximum pages walked per scan before returning a partial history.
pub const DEFAULT_PAGE_BUDGET: usize = 20;
/// Transaction records requested per page.
pub const PAGE_LIMIT: u32 = 200;

/// Result of one history scan, newest event first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoryScan {
    pub events: Vec<OwnershipEvent>,
    /// Whether the originating registration event was found. A `false` here
    /// with events present is a degraded-but-valid partial history: the
    /// chain's early pages may lie beyond the budget on a long-lived account.
    pub complete: bool,
    /// Set when a transient ledger failure cut the scan short.
    pub degraded: bool,
}

impl HistoryScan {
    /// The event that determines the current owner, if any matched.
    pub fn latest(&self) -> Option<&OwnershipEvent> {
        self.events.first()
    }
}

/// Walks the transaction log backward (newest first), decoding memos and
/// collecting the registration/transfer events for one fingerprint.
#[derive(Clone)]
pub struct HistoryScanner {
    ledger: Arc<dyn LedgerQuery>,
    page_budget: usize,
}

impl HistoryScanner {
    pub fn new(ledger: Arc<dyn LedgerQuery>) -> Self {
        Self {
            ledger,
            page_budget: DEFAULT_PAGE_BUDGET,
        }
    }

    pub fn with_page_budget(ledger: Arc<dyn LedgerQuery>, page_budget: usize) -> Self {
        Self {
            ledger,
            page_budget,
        }
    }

    /// Reconstruct the ordered event sequence for `fingerprint20`.
    ///
    /// Each call re-scans from the newest page. The scan stops early at the
    /// registration event, since nothing earlier is relevant, and returns
    /// whatever partial history it collected when the page budget runs out.
    pub async fn history(&self, fingerprint20: &str, scope: &TxScope) -> HistoryScan {
        let mut scan = HistoryScan::default();
        let mut cursor: Option<String> = None;

        for _ in 0..self.page_budget {
            let page = match self
                .ledger
                .transactions(scope, cursor.as_deref(), PAGE_LIMIT)
                .await
            {
                Ok(page) => page,
                Err(err) => {
                    tracing::warn!(fingerprint = fingerprint20, error = %err, "history page fetch failed");
                    scan.degraded = true;
                    return scan;
                }
            };

            if page.records.is_empty() {
                return scan;
            }

            for tx in &page.records {
                let Some(event) = decode_memo(tx.memo.as_deref()) else {
                    continue;
                };
                if event.fingerprint != fingerprint20 {
                    continue;
                }

                let actor = match event.kind {
                    EventKind::Register => tx.source_account.clone(),
                    // The new owner is in the transaction's operations, not
                    // the summary record; fetched lazily for matches only.
                    EventKind::Transfer => match self.transfer_destination(&tx.hash).await {
                        Some(destination) => destination,
                        None => tx.source_account.clone(),
                    },
                };

                scan.events.push(OwnershipEvent {
                    kind: event.kind,
                    fingerprint: event.fingerprint,
                    actor,
                    tx_ref: tx.hash.clone(),
                    occurred_at: tx.created_at,
                });

                if event.kind == EventKind::Register {
                    scan.complete = true;
                    return scan;
                }
            }

            cursor = page.next_cursor;
            if cursor.is_none() {
                return scan;
            }
        }

        scan
    }

    async fn transfer_destination(&self, tx_hash: &str) -> Option<String> {
        let operations = match self.ledger.operations(tx_hash).await {
            Ok(operations) => operations,
            Err(err) => {
                tracing::warn!(tx = tx_hash, error = %err, "operation fetch failed");
                return None;
            }
        };

        let mut payment = None;
        let mut claimant = None;
        for operation in operations {
            match operation {
                // Account-creation funding only occurs in transfer-to-new-
                // recipient flows, so it takes precedence over a payment.
                LedgerOperation::CreateAccount { destination } => return Some(destination),
                LedgerOperation::Payment { destination } if payment.is_none() => {
                    payment = Some(destination);
                }
                LedgerOperation::CreateClaimableBalance { claimants } if claimant.is_none() => {
                    claimant = claimants.into_iter().next();
                }
                _ => {}
            }
        }

        payment.or(claimant)
    }
}

/// Fold a transaction log (oldest first) into the current owner of a
/// fingerprint: the most recent matching registration or transfer wins.
pub fn resolve_owner(fingerprint20: &str, txs: &[TxRecord]) -> Option<String> {
    let mut owner = None;

    for tx in txs {
        let Some(event) = decode_memo(tx.memo.as_deref()) else {
            continue;
        };
        if event.fingerprint != fingerprint20 {
            continue;
        }

        match event.kind {
            EventKind::Register | EventKind::Transfer => {
                owner = Some(tx.source_account.clone());
            }
        }
    }

    owner
}
