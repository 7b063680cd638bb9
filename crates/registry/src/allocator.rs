//! Collision-checked short id allocation.

use crate::errors::{RegistryError, Result};
use crate::index::RegistryIndex;
use rand::Rng;
use std::sync::Arc;

/// Length of a registered asset id, in ASCII digits.
pub const ID_LENGTH: usize = 6;
/// Allocation attempts before the id space is treated as near-full.
pub const MAX_ATTEMPTS: usize = 10;

/// Generates collision-free registered ids against the index.
///
/// The pre-check here has a benign race under concurrent callers; the
/// index's conditional create is the atomic safety net. Bounding the retry
/// keeps a sustained-collision scenario from leaking live network calls.
#[derive(Clone)]
pub struct UniqueIdAllocator {
    index: Arc<dyn RegistryIndex>,
    max_attempts: usize,
}

impl UniqueIdAllocator {
    pub fn new(index: Arc<dyn RegistryIndex>) -> Self {
        Self {
            index,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(index: Arc<dyn RegistryIndex>, max_attempts: usize) -> Self {
        Self {
            index,
            max_attempts,
        }
    }

    /// Allocate a 6-digit id that is unused at allocation time.
    pub async fn allocate(&self) -> Result<String> {
        for _ in 0..self.max_attempts {
            let candidate = random_id();
            if self.index.get_by_id(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }

        Err(RegistryError::IdSpaceExhausted {
            attempts: self.max_attempts,
        })
    }
}

fn random_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::InMemoryRegistryIndex;
    use async_trait::async_trait;
    use chrono::Utc;
    use ledgermark_types::{AccountKey, AssetStatus, RegistryAsset, UserProfile, VerificationLog};
    use std::collections::HashSet;

    fn placeholder_asset(id: &str) -> RegistryAsset {
        RegistryAsset {
            registered_id: id.to_string(),
            asset_code: "ART".to_string(),
            issuer_key: AccountKey::from_bytes(&[2u8; 32]),
            fingerprint: None,
            cached_owner: None,
            created_at: Utc::now(),
            last_verified_at: None,
            status: AssetStatus::Active,
        }
    }

    #[test]
    fn random_ids_are_six_ascii_digits() {
        for _ in 0..100 {
            let id = random_id();
            assert_eq!(id.len(), ID_LENGTH);
            assert!(id.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn repeated_allocation_never_duplicates() {
        let index = Arc::new(InMemoryRegistryIndex::new());
        // Pre-populate a collision set the allocator must dodge.
        for n in 0..500 {
            index
                .create_asset(placeholder_asset(&format!("{:06}", n)))
                .await
                .unwrap();
        }

        let allocator = UniqueIdAllocator::new(index.clone());
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let id = allocator.allocate().await.unwrap();
            assert!(seen.insert(id.clone()), "allocator returned duplicate {id}");
            index.create_asset(placeholder_asset(&id)).await.unwrap();
        }
    }

    /// Index double whose id space is entirely taken.
    struct FullIndex;

    #[async_trait]
    impl RegistryIndex for FullIndex {
        async fn get_by_id(&self, registered_id: &str) -> crate::Result<Option<RegistryAsset>> {
            Ok(Some(placeholder_asset(registered_id)))
        }

        async fn find_by_fingerprint(
            &self,
            _fingerprint: &str,
        ) -> crate::Result<Option<RegistryAsset>> {
            Ok(None)
        }

        async fn create_asset(&self, asset: RegistryAsset) -> crate::Result<()> {
            Err(RegistryError::DuplicateId {
                registered_id: asset.registered_id,
            })
        }

        async fn apply_verification(
            &self,
            _registered_id: &str,
            _update: crate::index::VerificationUpdate,
        ) -> crate::Result<()> {
            Ok(())
        }

        async fn append_log(&self, _log: VerificationLog) -> crate::Result<()> {
            Ok(())
        }

        async fn logs_for(&self, _registered_id: &str) -> crate::Result<Vec<VerificationLog>> {
            Ok(Vec::new())
        }

        async fn upsert_profile(&self, _profile: UserProfile) -> crate::Result<()> {
            Ok(())
        }

        async fn get_profile(&self, _wallet_address: &str) -> crate::Result<Option<UserProfile>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn exhausted_id_space_fails_within_the_retry_bound() {
        let allocator = UniqueIdAllocator::new(Arc::new(FullIndex));
        let err = allocator.allocate().await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::IdSpaceExhausted {
                attempts: MAX_ATTEMPTS
            }
        ));
    }
}
