use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of fingerprint characters that fit in a transaction memo alongside
/// the event prefix. The memo field has a hard length limit, so only this
/// prefix goes on the wire; collisions within it are an accepted, documented
/// risk.
pub const MEMO_FINGERPRINT_LEN: usize = 20;

/// Errors that can occur when parsing a fingerprint string.
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    #[error("fingerprint must be {expected} hex characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("fingerprint is not lowercase hexadecimal")]
    InvalidHex,
}

/// Expected string length of a full fingerprint (SHA-256, lowercase hex).
pub const FINGERPRINT_LENGTH: usize = 64;

/// Content fingerprint of a notarized file: SHA-256 over the raw bytes,
/// rendered as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint the given content bytes.
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(data)))
    }

    /// Parse a full fingerprint from its hex string form.
    pub fn parse(value: &str) -> Result<Self, FingerprintError> {
        if value.len() != FINGERPRINT_LENGTH {
            return Err(FingerprintError::InvalidLength {
                expected: FINGERPRINT_LENGTH,
                actual: value.len(),
            });
        }
        if !value.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
            return Err(FingerprintError::InvalidHex);
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The truncated form that goes on the wire inside transaction memos.
    pub fn prefix20(&self) -> &str {
        &self.0[..MEMO_FINGERPRINT_LEN]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Fingerprint> for String {
    fn from(value: Fingerprint) -> Self {
        value.0
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = FingerprintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Fingerprint::parse(&value)
    }
}

/// Truncate an arbitrary identifier to the memo wire prefix.
///
/// Identifiers shorter than the wire length are used as-is, matching how the
/// scanner compares decoded memo payloads.
pub fn wire_prefix(identifier: &str) -> &str {
    identifier.get(..MEMO_FINGERPRINT_LEN).unwrap_or(identifier)
}
