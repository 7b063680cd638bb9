use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("registry index error: {0}")]
    Registry(#[from] ledgermark_registry::RegistryError),

    #[error("ledger error: {0}")]
    Ledger(#[from] ledgermark_ledger::LedgerError),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
