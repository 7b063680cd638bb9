//! Core domain types for the ledgermark notarization registry.
//!
//! Everything the read-side stack shares lives here: ledger account keys,
//! content fingerprints, the memo wire codec, and the off-chain registry
//! records that get reconciled against live chain state.

pub mod fingerprint;
pub mod key;
pub mod memo;
pub mod record;

pub use fingerprint::*;
pub use key::*;
pub use memo::*;
pub use record::*;
