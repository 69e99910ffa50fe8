//! Client sessions.
//!
//! A [`Session`] stands for one connected client. Its only state is its
//! identity; the cursor and the exclusivity flag live in the store, keyed by
//! that identity. Dropping a session releases an iteration lock it still
//! holds, on every exit path, so an abandoned walk can never wedge the
//! store against mutation.

use std::sync::Arc;

use hive_store::{SessionId, Store};

/// One client session over a shared store.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    store: Arc<Store>,
}

impl Session {
    pub(crate) fn new(id: SessionId, store: Arc<Store>) -> Self {
        Self { id, store }
    }

    /// This session's identity, as seen by the store's iteration protocol.
    pub fn id(&self) -> SessionId {
        self.id
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.store.release_session(self.id);
    }
}
