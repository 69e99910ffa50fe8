//! In-memory chained-hash key/value store.
//!
//! The store keeps variable-length binary keys and values in a fixed-size
//! chained hash table (djb2, power-of-two buckets) behind a single coarse
//! mutex. Three things distinguish it from a plain map:
//!
//! - **External iteration**: a client walks the table one entry per call via
//!   a begin/next/end protocol, without holding the lock between calls. A
//!   store-wide exclusivity flag blocks structural mutation for the duration
//!   of the walk.
//! - **Attribute publication**: every live key is mirrored to an
//!   [`AttributeSink`], which exposes one externally addressable read/write
//!   resource per entry (see the `hive-publish` crate). Keys are therefore
//!   validated to be printable ASCII.
//! - **Two-call growth protocol**: lookups that land in an undersized caller
//!   buffer fail with [`StoreError::InsufficientBuffer`] carrying the exact
//!   sizes required, so the caller reallocates and retries.
//!
//! # Design Rules
//!
//! 1. One entry per key; the live count always equals the entries reachable
//!    by walking every bucket.
//! 2. The lock is taken per operation and never held across client calls.
//! 3. Value replacement swaps in a freshly allocated buffer; the old one is
//!    dropped only after the swap.
//! 4. Publication failures are logged, never rolled back; store integrity
//!    outranks surface consistency.
//! 5. Allocation failures roll back all partial state before returning.

pub mod config;
pub mod cursor;
pub mod error;
pub mod hash;
pub mod keys;
pub mod store;
pub mod table;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use config::StoreConfig;
pub use cursor::Cursor;
pub use error::{PublishError, StoreError, StoreResult};
pub use store::{SessionId, Store};
pub use table::{Entry, EntryHandle, HashTable};
pub use traits::{AttributeSink, NoopSink};
