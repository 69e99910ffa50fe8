//! Attribute publication for the hive store.
//!
//! Every live entry in a [`Store`](hive_store::Store) is mirrored as an
//! individually addressable read/write resource named after its key,
//! alongside a fixed set of root control attributes (`add`, `set`,
//! `delete`, `locked`, `collision_counter`). The store drives the mapping
//! through its [`AttributeSink`](hive_store::AttributeSink) seam; this crate
//! provides the sink implementation ([`AttributeRegistry`]) and the resource
//! hierarchy over it ([`AttributeTree`]).
//!
//! Reads of a per-key resource return the entry's value; writes replace it
//! in place, through a path that is deliberately exempt from the
//! iteration-exclusivity flag.

pub mod error;
pub mod registry;
pub mod tree;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{AttributeError, AttributeResult};
pub use registry::AttributeRegistry;
pub use tree::{AttributeTree, RootAttribute};
