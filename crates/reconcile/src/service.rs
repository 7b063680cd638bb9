//! Reconciliation of live chain truth against the off-chain index.

use crate::cache::{CacheEntry, OwnershipCache};
use crate::errors::Result;
use crate::resolve::{IdentifierResolver, Resolution};
use chrono::{DateTime, Utc};
use ledgermark_ledger::{
    HistoryScan, HistoryScanner, LedgerQuery, OnChainOwnerResolver, OwnerResolution, TxScope,
};
use ledgermark_registry::{RegistryError, RegistryIndex, VerificationUpdate};
use ledgermark_types::{
    AccountKey, AssetRef, AssetStatus, RegistryAsset, UserProfile, VerificationLog,
    VerificationSource,
};
use serde::Serialize;
use std::sync::Arc;

/// The resolved registry side of a verification.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryView {
    pub registered_id: String,
    pub asset_code: String,
    pub issuer_key: AccountKey,
    pub fingerprint: Option<String>,
    pub cached_owner: Option<String>,
    pub owner_name: Option<String>,
    pub status: AssetStatus,
    pub last_verified_at: Option<DateTime<Utc>>,
}

/// The live on-chain side of a verification.
#[derive(Debug, Clone, Serialize)]
pub struct LiveView {
    pub owner: Option<String>,
    pub issuer: Option<AccountKey>,
    /// Exact, case-sensitive match between the index's cached owner and the
    /// live owner.
    pub is_verified: bool,
}

/// Why a verification could not produce a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyIssue {
    /// The identifier matched none of the known shapes, or every lookup
    /// missed. Reported as "not found", never retried.
    UnresolvedIdentifier,
    /// The live read failed; try again. Never treated as "asset burned".
    LedgerUnavailable,
}

/// Structured verification verdict. Ephemeral; persisted only as a
/// verification log entry on sync.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationOutcome {
    pub registry: Option<RegistryView>,
    pub live: LiveView,
    pub issue: Option<VerifyIssue>,
}

impl VerificationOutcome {
    fn unresolved() -> Self {
        Self {
            registry: None,
            live: LiveView {
                owner: None,
                issuer: None,
                is_verified: false,
            },
            issue: Some(VerifyIssue::UnresolvedIdentifier),
        }
    }
}

/// Orchestrates identifier resolution, live owner lookup, and index
/// reconciliation.
///
/// `verify` is side-effect-free; `sync` performs the write-back. The split
/// keeps read-heavy verification traffic off the index's write path.
#[derive(Clone)]
pub struct ReconciliationService {
    resolver: IdentifierResolver,
    owners: OnChainOwnerResolver,
    scanner: HistoryScanner,
    index: Arc<dyn RegistryIndex>,
    cache: Arc<OwnershipCache>,
}

impl ReconciliationService {
    pub fn new(ledger: Arc<dyn LedgerQuery>, index: Arc<dyn RegistryIndex>) -> Self {
        Self {
            resolver: IdentifierResolver::new(index.clone()),
            owners: OnChainOwnerResolver::new(ledger.clone()),
            scanner: HistoryScanner::new(ledger),
            index,
            cache: Arc::new(OwnershipCache::new()),
        }
    }

    pub fn cache(&self) -> &OwnershipCache {
        &self.cache
    }

    /// Read-only verification of an identifier against live chain state.
    pub async fn verify(&self, identifier: &str) -> VerificationOutcome {
        let Resolution::Resolved { asset, record, .. } = self.resolver.resolve(identifier).await
        else {
            return VerificationOutcome::unresolved();
        };

        let resolution = self.owners.current_owner(&asset).await;
        self.outcome(&asset, record.as_ref(), &resolution).await
    }

    /// Verification with write-back: updates the index's cached owner, flags
    /// assets whose live owner is gone, and appends an audit log entry.
    pub async fn sync(&self, identifier: &str, trigger_ref: &str) -> Result<VerificationOutcome> {
        let Resolution::Resolved { asset, record, .. } = self.resolver.resolve(identifier).await
        else {
            return Ok(VerificationOutcome::unresolved());
        };

        let resolution = self.owners.current_owner(&asset).await;

        // A failed live read must never cause a destructive write: skip the
        // whole write path and surface the transient issue instead.
        if resolution.degraded {
            return Ok(self.outcome(&asset, record.as_ref(), &resolution).await);
        }

        let record = match record {
            Some(record) => record,
            None => return Ok(self.outcome(&asset, None, &resolution).await),
        };

        self.write_back(&record, &resolution).await?;

        self.index
            .append_log(VerificationLog {
                registered_id: record.registered_id.clone(),
                verified_owner: resolution.owner.clone(),
                verified_at: Utc::now(),
                source: VerificationSource::LiveChain,
                trigger_ref: trigger_ref.to_string(),
            })
            .await?;

        if let Some(owner) = &resolution.owner {
            if self.index.get_profile(owner).await?.is_none() {
                self.index
                    .upsert_profile(UserProfile::anonymous(owner.clone()))
                    .await?;
            }
            if let Some(fingerprint) = &record.fingerprint {
                self.cache.put(
                    ledgermark_types::wire_prefix(fingerprint),
                    CacheEntry {
                        owner: owner.clone(),
                        tx_ref: None,
                        observed_at: Utc::now(),
                    },
                );
            }
        }

        let refreshed = self.index.get_by_id(&record.registered_id).await?;
        Ok(self.outcome(&asset, refreshed.as_ref(), &resolution).await)
    }

    /// Current owner by fingerprint, read through the ownership cache.
    ///
    /// On a miss (or bypass) the history scanner reconstructs the timeline
    /// and the newest matching event's actor is cached.
    pub async fn owner_by_fingerprint(
        &self,
        fingerprint20: &str,
        scope: &TxScope,
        bypass: bool,
    ) -> Option<CacheEntry> {
        if let Some(entry) = self.cache.get(fingerprint20, bypass) {
            return Some(entry);
        }

        let scan = self.scanner.history(fingerprint20, scope).await;
        let latest = scan.latest()?;
        let entry = CacheEntry {
            owner: latest.actor.clone(),
            tx_ref: Some(latest.tx_ref.clone()),
            observed_at: Utc::now(),
        };
        self.cache.put(fingerprint20, entry.clone());
        Some(entry)
    }

    /// Full event timeline for a fingerprint.
    pub async fn timeline(&self, fingerprint20: &str, scope: &TxScope) -> HistoryScan {
        self.scanner.history(fingerprint20, scope).await
    }

    async fn write_back(
        &self,
        record: &RegistryAsset,
        resolution: &OwnerResolution,
    ) -> Result<()> {
        let update = build_update(record, resolution);
        match self
            .index
            .apply_verification(&record.registered_id, update)
            .await
        {
            Ok(()) => Ok(()),
            // One retry with fresh reads, then surface the conflict.
            Err(RegistryError::WriteConflict { .. }) => {
                let fresh = self
                    .index
                    .get_by_id(&record.registered_id)
                    .await?
                    .ok_or_else(|| RegistryError::AssetNotFound {
                        registered_id: record.registered_id.clone(),
                    })?;
                self.index
                    .apply_verification(&fresh.registered_id, build_update(&fresh, resolution))
                    .await?;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn outcome(
        &self,
        asset: &AssetRef,
        record: Option<&RegistryAsset>,
        resolution: &OwnerResolution,
    ) -> VerificationOutcome {
        let registry = match record {
            Some(record) => Some(RegistryView {
                registered_id: record.registered_id.clone(),
                asset_code: record.asset_code.clone(),
                issuer_key: record.issuer_key.clone(),
                fingerprint: record.fingerprint.clone(),
                cached_owner: record.cached_owner.clone(),
                owner_name: self.display_name(record.cached_owner.as_deref()).await,
                status: record.status,
                last_verified_at: record.last_verified_at,
            }),
            None => None,
        };

        let is_verified = match (&registry, &resolution.owner) {
            (Some(view), Some(owner)) => view.cached_owner.as_deref() == Some(owner.as_str()),
            _ => false,
        };

        VerificationOutcome {
            registry,
            live: LiveView {
                owner: resolution.owner.clone(),
                issuer: Some(asset.issuer.clone()),
                is_verified,
            },
            issue: resolution.degraded.then_some(VerifyIssue::LedgerUnavailable),
        }
    }

    async fn display_name(&self, owner: Option<&str>) -> Option<String> {
        let owner = owner?;
        match self.index.get_profile(owner).await {
            Ok(profile) => profile.map(|profile| profile.display_name),
            Err(err) => {
                tracing::warn!(owner, error = %err, "profile lookup failed");
                None
            }
        }
    }
}

fn build_update(record: &RegistryAsset, resolution: &OwnerResolution) -> VerificationUpdate {
    match &resolution.owner {
        Some(live) if record.cached_owner.as_deref() != Some(live.as_str()) => {
            VerificationUpdate {
                cached_owner: Some(live.clone()),
                status: None,
                last_verified_at: Utc::now(),
            }
        }
        Some(_) => VerificationUpdate {
            cached_owner: None,
            status: None,
            last_verified_at: Utc::now(),
        },
        // Burned or withdrawn: flag instead of clearing the cached owner, so
        // the forensic trail survives.
        None => VerificationUpdate {
            cached_owner: None,
            status: Some(AssetStatus::Flagged),
            last_verified_at: Utc::now(),
        },
    }
}
