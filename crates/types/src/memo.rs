//! Wire codec for the domain events embedded in transaction memos.
//!
//! Registrations are tagged `REG|<fingerprint20>`, transfers `OWN|<fingerprint20>`.
//! The transfer payload is always the fingerprint prefix: the history scanner
//! keys on fingerprints, so asset-code payloads emitted by older clients are
//! treated as a migration concern and never produced here.

use crate::fingerprint::wire_prefix;
use serde::{Deserialize, Serialize};

/// Memo prefix marking a registration event.
pub const REGISTER_PREFIX: &str = "REG|";
/// Memo prefix marking an ownership transfer event.
pub const TRANSFER_PREFIX: &str = "OWN|";

/// Kind of ownership event carried by a memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Register,
    Transfer,
}

/// Decoded memo event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoEvent {
    pub kind: EventKind,
    /// The 20-character fingerprint prefix carried on the wire.
    pub fingerprint: String,
}

/// Encode an ownership event into its memo string form.
///
/// Longer fingerprints are truncated to the wire prefix.
pub fn encode_memo(kind: EventKind, fingerprint: &str) -> String {
    let prefix = match kind {
        EventKind::Register => REGISTER_PREFIX,
        EventKind::Transfer => TRANSFER_PREFIX,
    };
    format!("{prefix}{}", wire_prefix(fingerprint))
}

/// Decode a transaction memo into an ownership event.
///
/// Total: unrecognized memos yield `None`, never an error.
pub fn decode_memo(memo: Option<&str>) -> Option<MemoEvent> {
    let memo = memo?;

    if let Some(payload) = memo.strip_prefix(REGISTER_PREFIX) {
        return Some(MemoEvent {
            kind: EventKind::Register,
            fingerprint: payload.to_string(),
        });
    }

    if let Some(payload) = memo.strip_prefix(TRANSFER_PREFIX) {
        return Some(MemoEvent {
            kind: EventKind::Transfer,
            fingerprint: payload.to_string(),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_registration() {
        let event = decode_memo(Some("REG|abcd1234")).unwrap();
        assert_eq!(event.kind, EventKind::Register);
        assert_eq!(event.fingerprint, "abcd1234");
    }

    #[test]
    fn detects_transfer() {
        let event = decode_memo(Some("OWN|abcd1234")).unwrap();
        assert_eq!(event.kind, EventKind::Transfer);
        assert_eq!(event.fingerprint, "abcd1234");
    }

    #[test]
    fn ignores_unrelated_memos() {
        assert_eq!(decode_memo(Some("hello world")), None);
        assert_eq!(decode_memo(None), None);
        assert_eq!(decode_memo(Some("")), None);
    }

    #[test]
    fn roundtrip_both_kinds() {
        let fingerprint20 = "0123456789abcdef0123";
        for kind in [EventKind::Register, EventKind::Transfer] {
            let memo = encode_memo(kind, fingerprint20);
            let event = decode_memo(Some(&memo)).unwrap();
            assert_eq!(event.kind, kind);
            assert_eq!(event.fingerprint, fingerprint20);
        }
    }

    #[test]
    fn encode_truncates_full_fingerprints() {
        let full = "f".repeat(64);
        let memo = encode_memo(EventKind::Register, &full);
        assert_eq!(memo, format!("REG|{}", "f".repeat(20)));
    }
}
