//! Control surface for the hive store.
//!
//! Exposes the closed command set (`Version`, `Add`, `Set`, `Get`,
//! `Delete`, `Count`, `BeginIteration`, `NextIteration`, `EndIteration`)
//! as a per-session dispatcher over one shared [`Store`](hive_store::Store).
//! Each call is a single store operation under the store's mutex; the
//! iteration triad spans calls through the store's exclusivity flag, and
//! dropping a [`Session`] releases a lock its client abandoned.

pub mod session;
pub mod surface;

pub use session::Session;
pub use surface::ControlSurface;
