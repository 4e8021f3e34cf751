use thiserror::Error;

/// An error resulting from operations on a backing medium.
#[derive(Debug, Error)]
pub enum MediumError {
    /// An internal SQLite error.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// A stored value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The database location could not be prepared.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The background writer stopped and can no longer accept edits.
    #[error("Background writer is not running")]
    WriterUnavailable,

    /// One or more queued edits could not be persisted.
    #[error("Failed to flush pending edits: {0}")]
    FlushFailed(String),
}
