use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors that can occur when parsing a ledger account key string.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("account key must start with '{ACCOUNT_KEY_PREFIX}'")]
    InvalidPrefix,
    #[error("account key must be {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("account key contains characters outside the base32 alphabet")]
    InvalidBase32,
    #[error("account key checksum mismatch")]
    InvalidChecksum,
    #[error("account key payload must be exactly {ACCOUNT_KEY_BYTES} bytes")]
    InvalidPayloadLength,
}

/// Number of raw ed25519 bytes contained in an account key.
pub const ACCOUNT_KEY_BYTES: usize = 32;
/// Expected string length of an encoded account key.
pub const ACCOUNT_KEY_LENGTH: usize = 56;
/// Leading character of every encoded account key.
pub const ACCOUNT_KEY_PREFIX: char = 'G';

/// Version byte for ed25519 public account keys (renders as a leading `G`).
const ACCOUNT_KEY_VERSION: u8 = 6 << 3;

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Encode a 32-byte ed25519 public key into the human readable ledger format.
///
/// Layout is version byte, payload, then a CRC16-XMODEM checksum over both,
/// base32-encoded without padding to exactly 56 characters.
pub fn encode_account_key(bytes: &[u8; ACCOUNT_KEY_BYTES]) -> String {
    let mut raw = Vec::with_capacity(1 + ACCOUNT_KEY_BYTES + 2);
    raw.push(ACCOUNT_KEY_VERSION);
    raw.extend_from_slice(bytes);
    let checksum = crc16_xmodem(&raw);
    raw.extend_from_slice(&checksum.to_le_bytes());
    base32_encode(&raw)
}

/// Attempt to decode an encoded account key string into the raw bytes.
pub fn decode_account_key(key: &str) -> Result<[u8; ACCOUNT_KEY_BYTES], KeyError> {
    if key.len() != ACCOUNT_KEY_LENGTH {
        return Err(KeyError::InvalidLength {
            expected: ACCOUNT_KEY_LENGTH,
            actual: key.len(),
        });
    }

    if !key.starts_with(ACCOUNT_KEY_PREFIX) {
        return Err(KeyError::InvalidPrefix);
    }

    let raw = base32_decode(key)?;
    if raw.len() != 1 + ACCOUNT_KEY_BYTES + 2 {
        return Err(KeyError::InvalidPayloadLength);
    }

    let (body, checksum) = raw.split_at(1 + ACCOUNT_KEY_BYTES);
    let expected = crc16_xmodem(body).to_le_bytes();
    if checksum != expected {
        return Err(KeyError::InvalidChecksum);
    }

    if body[0] != ACCOUNT_KEY_VERSION {
        return Err(KeyError::InvalidPrefix);
    }

    let mut bytes = [0u8; ACCOUNT_KEY_BYTES];
    bytes.copy_from_slice(&body[1..]);
    Ok(bytes)
}

/// Check whether the provided string is a syntactically valid account key.
pub fn is_valid_account_key(key: &str) -> bool {
    decode_account_key(key).is_ok()
}

/// Validated ledger account key, serialized as its string form in JSON.
///
/// Keys are compared case-sensitively and never normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountKey(String);

impl AccountKey {
    /// Parse and validate an encoded account key string.
    pub fn parse(key: &str) -> Result<Self, KeyError> {
        decode_account_key(key)?;
        Ok(Self(key.to_string()))
    }

    /// Build the key from raw ed25519 bytes.
    pub fn from_bytes(bytes: &[u8; ACCOUNT_KEY_BYTES]) -> Self {
        Self(encode_account_key(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<AccountKey> for String {
    fn from(value: AccountKey) -> Self {
        value.0
    }
}

impl TryFrom<String> for AccountKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        decode_account_key(&value)?;
        Ok(Self(value))
    }
}

fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 8 / 5 + 1);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for &byte in data {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }

    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }

    out
}

fn base32_decode(data: &str) -> Result<Vec<u8>, KeyError> {
    let mut out = Vec::with_capacity(data.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for ch in data.bytes() {
        let value = BASE32_ALPHABET
            .iter()
            .position(|&c| c == ch)
            .ok_or(KeyError::InvalidBase32)? as u32;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push(((buffer >> bits) & 0xff) as u8);
        }
    }

    Ok(out)
}

fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let bytes = [0xABu8; ACCOUNT_KEY_BYTES];
        let encoded = encode_account_key(&bytes);
        assert!(encoded.starts_with(ACCOUNT_KEY_PREFIX));
        assert_eq!(encoded.len(), ACCOUNT_KEY_LENGTH);

        let decoded = decode_account_key(&encoded).expect("key should decode");
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn invalid_length_rejected() {
        let err = decode_account_key("GAAA").unwrap_err();
        assert!(matches!(err, KeyError::InvalidLength { .. }));
    }

    #[test]
    fn invalid_prefix_rejected() {
        let mut encoded = encode_account_key(&[1u8; ACCOUNT_KEY_BYTES]);
        encoded.replace_range(0..1, "M");
        let err = decode_account_key(&encoded).unwrap_err();
        assert!(matches!(
            err,
            KeyError::InvalidPrefix | KeyError::InvalidChecksum
        ));
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let mut encoded = encode_account_key(&[7u8; ACCOUNT_KEY_BYTES]);
        // Flip a payload character without touching length or prefix.
        let replacement = if encoded.as_bytes()[10] == b'A' { "B" } else { "A" };
        encoded.replace_range(10..11, replacement);
        let err = decode_account_key(&encoded).unwrap_err();
        assert!(matches!(err, KeyError::InvalidChecksum));
    }

    #[test]
    fn lowercase_rejected() {
        let encoded = encode_account_key(&[9u8; ACCOUNT_KEY_BYTES]).to_lowercase();
        assert!(!is_valid_account_key(&encoded));
    }

    #[test]
    fn account_key_serde_uses_string_form() {
        let key = AccountKey::from_bytes(&[3u8; ACCOUNT_KEY_BYTES]);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{}\"", key.as_str()));

        let parsed: AccountKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);
    }
}
