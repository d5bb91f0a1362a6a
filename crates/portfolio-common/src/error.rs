//! Storage error type shared by the database layer and the gallery.
//!
//! Every failure of the persistent image store surfaces as this type. The
//! gallery treats it as the storage half of its error taxonomy; decode
//! failures live in `portfolio-imaging`.

/// Error type for image store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A database read or write failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new Storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias using the storage Error type.
pub type Result<T> = std::result::Result<T, Error>;
