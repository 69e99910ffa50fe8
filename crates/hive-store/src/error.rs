//! Error types for store operations.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key is empty or contains bytes that cannot name a published
    /// attribute.
    #[error("invalid key: {reason}")]
    InvalidKey { reason: String },

    /// A request parameter is malformed (empty key, bad payload shape).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An entry with this key already exists and replacement was not allowed.
    #[error("key already exists: {key}")]
    AlreadyExists { key: String },

    /// No entry with this key.
    #[error("key not found: {key}")]
    NotFound { key: String },

    /// The operation conflicts with an active iteration, or the iteration
    /// protocol was misused (next/end without begin).
    #[error("busy: {0}")]
    Busy(&'static str),

    /// The caller's buffer is too small. Carries the exact sizes required so
    /// the caller can reallocate and retry.
    #[error("buffer too small: key needs {key_len} bytes, value needs {value_len} bytes")]
    InsufficientBuffer { key_len: usize, value_len: usize },

    /// A key or value buffer could not be allocated. Any partially linked
    /// state has been rolled back before this is returned.
    #[error("out of memory allocating {requested} bytes")]
    OutOfMemory { requested: usize },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by an [`AttributeSink`](crate::AttributeSink).
///
/// Publication failures never roll back the store mutation that triggered
/// them; the store logs them and carries on.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A resource with this name is already published.
    #[error("attribute already published: {name}")]
    AlreadyPublished { name: String },

    /// No resource with this name is published.
    #[error("attribute not published: {name}")]
    NotPublished { name: String },

    /// The sink refused the name.
    #[error("publish rejected for {name}: {reason}")]
    Rejected { name: String, reason: String },
}

/// Render a key for error messages and log fields. Keys are validated to be
/// printable ASCII before they are stored, so the lossy conversion is exact
/// for any key that made it into the table.
pub(crate) fn display_key(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}
