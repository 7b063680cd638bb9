//! Off-chain registry index for the ledgermark stack.
//!
//! The index is the mutable, cache-like store of believed asset state. It is
//! consulted for resolution and reconciled against live chain truth, never
//! blindly trusted.

pub mod allocator;
pub mod errors;
pub mod index;

pub use allocator::*;
pub use errors::*;
pub use index::*;
