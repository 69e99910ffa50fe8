//! The [`AttributeSink`] trait: the seam between the store and whatever
//! publishes per-key resources.
//!
//! The store calls the sink on the success path of add and delete, while it
//! holds its own lock. Implementations must therefore never call back into
//! the store; they only maintain the set of published names. Failures are
//! logged by the store and never roll back the mutation that triggered
//! them: the store's data-integrity contract takes precedence over
//! resource-surface consistency.

use crate::error::PublishError;

/// Receives publish/unpublish notifications for live keys.
///
/// The resource name is the key's bytes; keys are validated to be printable
/// ASCII before the sink ever sees them.
pub trait AttributeSink: Send + Sync {
    /// A new entry was inserted; expose a resource named after its key.
    fn publish(&self, key: &[u8]) -> Result<(), PublishError>;

    /// An entry was removed; hide its resource.
    fn unpublish(&self, key: &[u8]) -> Result<(), PublishError>;
}

/// A sink that publishes nothing. Default for stores without an attribute
/// surface, and handy in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl AttributeSink for NoopSink {
    fn publish(&self, _key: &[u8]) -> Result<(), PublishError> {
        Ok(())
    }

    fn unpublish(&self, _key: &[u8]) -> Result<(), PublishError> {
        Ok(())
    }
}
