use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ledger query rejected: {0}")]
    Rpc(String),

    #[error("ledger response could not be decoded: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
