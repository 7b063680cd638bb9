//! Ownership verification and reconciliation core.
//!
//! Resolves an opaque identifier to a canonical asset, determines the
//! authoritative current owner from the ledger, and reconciles that truth
//! against the off-chain registry index.

pub mod cache;
pub mod errors;
pub mod resolve;
pub mod service;

pub use cache::*;
pub use errors::*;
pub use resolve::*;
pub use service::*;
