//! Error types for the attribute surface.

use thiserror::Error;

use hive_store::StoreError;

/// Errors that can occur when reading or writing attributes.
#[derive(Debug, Error)]
pub enum AttributeError {
    /// The underlying store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No per-key resource with this name is currently published.
    #[error("attribute not published: {name}")]
    NotPublished { name: String },

    /// The name does not match any root attribute.
    #[error("no such attribute: {name}")]
    UnknownAttribute { name: String },

    /// The attribute only supports writes.
    #[error("attribute is write-only: {name}")]
    WriteOnly { name: String },

    /// The attribute only supports reads.
    #[error("attribute is read-only: {name}")]
    ReadOnly { name: String },

    /// An add/set payload had no newline separating key from value.
    #[error("payload has no key/value separator")]
    MissingSeparator,
}

/// Result alias for attribute operations.
pub type AttributeResult<T> = Result<T, AttributeError>;
