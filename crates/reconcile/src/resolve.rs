//! Classification and resolution of opaque asset identifiers.

use ledgermark_registry::RegistryIndex;
use ledgermark_types::{AccountKey, AssetRef, RegistryAsset};
use std::sync::Arc;

/// Asset code assumed when the identifier is a bare issuer key with no
/// registry record behind it.
pub const DEFAULT_ASSET_CODE: &str = "ART";

/// How an identifier was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    RegistryId,
    AccountKey,
    Fingerprint,
}

/// Outcome of identifier resolution. `Unresolved` is a normal result the
/// caller must handle, not an error path.
#[derive(Debug, Clone)]
pub enum Resolution {
    Resolved {
        kind: IdentifierKind,
        asset: AssetRef,
        /// The richer off-chain record, when the index knows the asset.
        record: Option<RegistryAsset>,
    },
    Unresolved,
}

/// Classifies an input string as a registry id, a ledger account key, or a
/// content fingerprint, and resolves it to a canonical asset reference.
#[derive(Clone)]
pub struct IdentifierResolver {
    index: Arc<dyn RegistryIndex>,
}

impl IdentifierResolver {
    pub fn new(index: Arc<dyn RegistryIndex>) -> Self {
        Self { index }
    }

    pub async fn resolve(&self, identifier: &str) -> Resolution {
        if is_registry_id(identifier) {
            return match self.lookup_by_id(identifier).await {
                Some(record) => Resolution::Resolved {
                    kind: IdentifierKind::RegistryId,
                    asset: record.asset_ref(),
                    record: Some(record),
                },
                None => Resolution::Unresolved,
            };
        }

        if let Ok(issuer) = AccountKey::parse(identifier) {
            // The key is the issuer itself; a fingerprint-equality lookup may
            // still recover a richer record for it.
            let record = self.lookup_by_fingerprint(identifier).await;
            let asset = record
                .as_ref()
                .map(RegistryAsset::asset_ref)
                .unwrap_or_else(|| AssetRef::new(DEFAULT_ASSET_CODE, issuer));
            return Resolution::Resolved {
                kind: IdentifierKind::AccountKey,
                asset,
                record,
            };
        }

        match self.lookup_by_fingerprint(identifier).await {
            Some(record) => Resolution::Resolved {
                kind: IdentifierKind::Fingerprint,
                asset: record.asset_ref(),
                record: Some(record),
            },
            None => Resolution::Unresolved,
        }
    }

    async fn lookup_by_id(&self, registered_id: &str) -> Option<RegistryAsset> {
        match self.index.get_by_id(registered_id).await {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(registered_id, error = %err, "registry lookup by id failed");
                None
            }
        }
    }

    async fn lookup_by_fingerprint(&self, fingerprint: &str) -> Option<RegistryAsset> {
        match self.index.find_by_fingerprint(fingerprint).await {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(fingerprint, error = %err, "registry lookup by fingerprint failed");
                None
            }
        }
    }
}

/// Exactly six ASCII digits.
pub fn is_registry_id(identifier: &str) -> bool {
    identifier.len() == 6 && identifier.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgermark_types::is_valid_account_key;

    #[test]
    fn registry_id_shape() {
        assert!(is_registry_id("123456"));
        assert!(is_registry_id("000000"));
        assert!(!is_registry_id("12345"));
        assert!(!is_registry_id("1234567"));
        assert!(!is_registry_id("12345a"));
        assert!(!is_registry_id(""));
    }

    #[test]
    fn account_key_never_classifies_as_registry_id() {
        let key = ledgermark_types::encode_account_key(&[5u8; 32]);
        assert!(!is_registry_id(&key));
        assert!(is_valid_account_key(&key));
    }
}
