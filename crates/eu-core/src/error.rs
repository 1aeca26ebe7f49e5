use thiserror::Error;

/// Failure writing or reading the durable diagram store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("diagram JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure producing a shareable link.
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("failed to generate shareable link: {0}")]
    Encode(#[from] serde_json::Error),
}
