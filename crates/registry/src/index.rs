//! Document-store boundary for the off-chain registry index.

use crate::errors::{RegistryError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ledgermark_types::{AssetStatus, RegistryAsset, UserProfile, VerificationLog};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Atomic verification write-back, applied as a single document update.
///
/// `cached_owner` and `status` are only touched when set; `cached_owner` is
/// never cleared so flagged records keep their forensic history.
#[derive(Debug, Clone)]
pub struct VerificationUpdate {
    pub cached_owner: Option<String>,
    pub status: Option<AssetStatus>,
    pub last_verified_at: DateTime<Utc>,
}

/// The off-chain index of asset records, profiles, and verification logs.
///
/// Backed by a document store in production; the in-memory implementation
/// below serves tests and local tooling.
#[async_trait]
pub trait RegistryIndex: Send + Sync {
    /// Fetch an asset record by its 6-digit registered id.
    async fn get_by_id(&self, registered_id: &str) -> Result<Option<RegistryAsset>>;

    /// Fetch an asset record by exact fingerprint equality.
    async fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Option<RegistryAsset>>;

    /// Conditionally create a record. Fails with `DuplicateId` if the
    /// registered id is taken; this is the real uniqueness guarantee behind
    /// the id allocator's pre-check.
    async fn create_asset(&self, asset: RegistryAsset) -> Result<()>;

    /// Apply a verification write-back atomically.
    async fn apply_verification(
        &self,
        registered_id: &str,
        update: VerificationUpdate,
    ) -> Result<()>;

    /// Append an audit trail entry. Logs are append-only, never deduplicated.
    async fn append_log(&self, log: VerificationLog) -> Result<()>;

    /// Audit trail for one asset, oldest first.
    async fn logs_for(&self, registered_id: &str) -> Result<Vec<VerificationLog>>;

    /// Insert or replace a user profile keyed by wallet address.
    async fn upsert_profile(&self, profile: UserProfile) -> Result<()>;

    async fn get_profile(&self, wallet_address: &str) -> Result<Option<UserProfile>>;
}

/// In-memory registry index.
#[derive(Default)]
pub struct InMemoryRegistryIndex {
    assets: RwLock<HashMap<String, RegistryAsset>>,
    logs: RwLock<Vec<VerificationLog>>,
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryRegistryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the index with existing records (CLI snapshot loading, tests).
    pub fn seeded(assets: impl IntoIterator<Item = RegistryAsset>) -> Self {
        let index = Self::new();
        {
            let mut map = index.assets.write();
            for asset in assets {
                map.insert(asset.registered_id.clone(), asset);
            }
        }
        index
    }
}

#[async_trait]
impl RegistryIndex for InMemoryRegistryIndex {
    async fn get_by_id(&self, registered_id: &str) -> Result<Option<RegistryAsset>> {
        Ok(self.assets.read().get(registered_id).cloned())
    }

    async fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Option<RegistryAsset>> {
        Ok(self
            .assets
            .read()
            .values()
            .find(|asset| asset.fingerprint.as_deref() == Some(fingerprint))
            .cloned())
    }

    async fn create_asset(&self, asset: RegistryAsset) -> Result<()> {
        let mut assets = self.assets.write();
        if assets.contains_key(&asset.registered_id) {
            return Err(RegistryError::DuplicateId {
                registered_id: asset.registered_id,
            });
        }
        assets.insert(asset.registered_id.clone(), asset);
        Ok(())
    }

    async fn apply_verification(
        &self,
        registered_id: &str,
        update: VerificationUpdate,
    ) -> Result<()> {
        let mut assets = self.assets.write();
        let asset = assets
            .get_mut(registered_id)
            .ok_or_else(|| RegistryError::AssetNotFound {
                registered_id: registered_id.to_string(),
            })?;

        if let Some(owner) = update.cached_owner {
            asset.cached_owner = Some(owner);
        }
        if let Some(status) = update.status {
            asset.status = status;
        }
        asset.last_verified_at = Some(update.last_verified_at);
        Ok(())
    }

    async fn append_log(&self, log: VerificationLog) -> Result<()> {
        self.logs.write().push(log);
        Ok(())
    }

    async fn logs_for(&self, registered_id: &str) -> Result<Vec<VerificationLog>> {
        Ok(self
            .logs
            .read()
            .iter()
            .filter(|log| log.registered_id == registered_id)
            .cloned()
            .collect())
    }

    async fn upsert_profile(&self, profile: UserProfile) -> Result<()> {
        self.profiles
            .write()
            .insert(profile.wallet_address.clone(), profile);
        Ok(())
    }

    async fn get_profile(&self, wallet_address: &str) -> Result<Option<UserProfile>> {
        Ok(self.profiles.read().get(wallet_address).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgermark_types::AccountKey;

    fn sample_asset(id: &str, fingerprint: &str) -> RegistryAsset {
        RegistryAsset {
            registered_id: id.to_string(),
            asset_code: "ART".to_string(),
            issuer_key: AccountKey::from_bytes(&[1u8; 32]),
            fingerprint: Some(fingerprint.to_string()),
            cached_owner: Some("GAAA".to_string()),
            created_at: Utc::now(),
            last_verified_at: None,
            status: AssetStatus::Active,
        }
    }

    #[tokio::test]
    async fn conditional_create_rejects_duplicates() {
        let index = InMemoryRegistryIndex::new();
        index.create_asset(sample_asset("123456", "fp-a")).await.unwrap();

        let err = index
            .create_asset(sample_asset("123456", "fp-b"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateId { .. }));
    }

    #[tokio::test]
    async fn lookup_by_id_and_fingerprint() {
        let index = InMemoryRegistryIndex::new();
        index.create_asset(sample_asset("111111", "fp-a")).await.unwrap();

        assert!(index.get_by_id("111111").await.unwrap().is_some());
        assert!(index.get_by_id("999999").await.unwrap().is_none());
        assert!(index.find_by_fingerprint("fp-a").await.unwrap().is_some());
        assert!(index.find_by_fingerprint("fp-x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn verification_update_preserves_cached_owner_when_flagging() {
        let index = InMemoryRegistryIndex::new();
        index.create_asset(sample_asset("222222", "fp-a")).await.unwrap();

        index
            .apply_verification(
                "222222",
                VerificationUpdate {
                    cached_owner: None,
                    status: Some(AssetStatus::Flagged),
                    last_verified_at: Utc::now(),
                },
            )
            .await
            .unwrap();

        let asset = index.get_by_id("222222").await.unwrap().unwrap();
        assert_eq!(asset.status, AssetStatus::Flagged);
        assert_eq!(asset.cached_owner.as_deref(), Some("GAAA"));
        assert!(asset.last_verified_at.is_some());
    }

    #[tokio::test]
    async fn update_on_missing_asset_reports_not_found() {
        let index = InMemoryRegistryIndex::new();
        let err = index
            .apply_verification(
                "000000",
                VerificationUpdate {
                    cached_owner: None,
                    status: None,
                    last_verified_at: Utc::now(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::AssetNotFound { .. }));
    }
}
