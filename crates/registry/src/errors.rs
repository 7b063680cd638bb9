use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("asset not found: {registered_id}")]
    AssetNotFound { registered_id: String },

    #[error("registered id already exists: {registered_id}")]
    DuplicateId { registered_id: String },

    #[error("concurrent update conflict on asset {registered_id}")]
    WriteConflict { registered_id: String },

    #[error("failed to allocate a unique id after {attempts} attempts; registry may be near full")]
    IdSpaceExhausted { attempts: usize },

    #[error("index storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
