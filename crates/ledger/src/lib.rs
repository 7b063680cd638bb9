//! Ledger read side for the ledgermark registry.
//!
//! Defines the query boundary to the ledger network (`LedgerQuery`), an HTTP
//! client implementing it against a Horizon-style API, the on-chain owner
//! resolver, and the memo-driven history scanner.

pub mod client;
pub mod errors;
pub mod history;
pub mod horizon;
pub mod owner;

pub use client::*;
pub use errors::*;
pub use history::*;
pub use horizon::HorizonClient;
pub use owner::*;
