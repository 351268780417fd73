use thiserror::Error;

/// The common error type used by this crate
#[derive(Error, Debug)]
pub enum RolegateStorageError {
    /// An error that occurs when working with a storage backend
    #[error("Storage backend error: {0}")]
    StorageBackend(String),

    /// An error that occurs while decoding persisted bytes
    #[error("Failed to decode stored bytes: {0}")]
    DecodeFailed(String),

    /// The commit journal is present but does not verify
    #[error("Commit journal is corrupt: {0}")]
    CorruptJournal(String),

    /// The store directory is held by another process
    #[error("Store is locked: {0}")]
    StoreLocked(String),
}

impl From<std::io::Error> for RolegateStorageError {
    fn from(value: std::io::Error) -> Self {
        RolegateStorageError::StorageBackend(format!("{value}"))
    }
}
