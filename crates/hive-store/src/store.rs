//! The concurrent store: a [`HashTable`] behind one mutex, plus the
//! iteration-exclusivity flag and the attribute-sink hookup.
//!
//! The lock is coarse and per-operation: it is taken and released inside
//! every method, never held across client calls. Everything done under it is
//! O(chain length), or O(bucket count) for diagnostics; nothing blocks on
//! external I/O.
//!
//! Iteration exclusivity is a second, logically distinct piece of state kept
//! inside the same guarded region: while some session holds it, structural
//! mutation (add, delete) from *every* session fails fast with
//! [`StoreError::Busy`] instead of blocking. Value-only replacement through
//! the publisher path ([`Store::replace_value`]) is deliberately exempt, so
//! a walk can observe a value change of the entry under the cursor. That is
//! the documented contract, not a race.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::cursor::Cursor;
use crate::error::{display_key, StoreError, StoreResult};
use crate::keys::validate_key;
use crate::table::HashTable;
use crate::traits::{AttributeSink, NoopSink};

/// Identifies a client session for the iteration protocol.
///
/// Sessions are minted by the control surface; the store only compares them.
pub type SessionId = u64;

struct IterState {
    session: SessionId,
    cursor: Option<Cursor>,
}

struct StoreState {
    table: HashTable,
    iter: Option<IterState>,
}

/// The shared key/value store.
pub struct Store {
    state: Mutex<StoreState>,
    sink: Arc<dyn AttributeSink>,
}

impl Store {
    /// Create a store with no attribute surface.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_sink(config, Arc::new(NoopSink))
    }

    /// Create a store that publishes every live key to `sink`.
    pub fn with_sink(config: StoreConfig, sink: Arc<dyn AttributeSink>) -> Self {
        let table = HashTable::new(config.min_buckets);
        debug!(
            min_buckets = config.min_buckets,
            bucket_count = table.bucket_count(),
            "store created"
        );
        Self {
            state: Mutex::new(StoreState { table, iter: None }),
            sink,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("store lock poisoned")
    }

    // -----------------------------------------------------------------------
    // Structural mutation (gated by the iteration flag)
    // -----------------------------------------------------------------------

    /// Add an entry, or replace an existing entry's value when
    /// `allow_replace` is set.
    ///
    /// Fails `Busy` while any iteration is active. A replace touches only
    /// the value buffer; identity and the published resource are untouched.
    /// For a new key, publication failure is logged and does not fail the
    /// add.
    pub fn add(&self, key: &[u8], value: &[u8], allow_replace: bool) -> StoreResult<()> {
        let mut state = self.lock();
        if state.iter.is_some() {
            return Err(StoreError::Busy("iteration in progress"));
        }

        if let Some(handle) = state.table.find(key) {
            if !allow_replace {
                return Err(StoreError::AlreadyExists {
                    key: display_key(key),
                });
            }
            state.table.replace_value(handle, value)?;
            debug!(key = %display_key(key), value_len = value.len(), "value replaced");
            return Ok(());
        }

        validate_key(key)?;
        state.table.insert(key, value)?;
        if let Err(e) = self.sink.publish(key) {
            warn!(key = %display_key(key), error = %e, "attribute publish failed");
        }
        debug!(key = %display_key(key), value_len = value.len(), "entry added");
        Ok(())
    }

    /// Remove an entry by key.
    ///
    /// Fails `Busy` while any iteration is active. Unpublication failure is
    /// logged and does not resurrect the entry.
    pub fn delete(&self, key: &[u8]) -> StoreResult<()> {
        let mut state = self.lock();
        if state.iter.is_some() {
            return Err(StoreError::Busy("iteration in progress"));
        }

        let handle = state.table.find(key).ok_or_else(|| StoreError::NotFound {
            key: display_key(key),
        })?;
        state.table.remove(handle);
        if let Err(e) = self.sink.unpublish(key) {
            warn!(key = %display_key(key), error = %e, "attribute unpublish failed");
        }
        debug!(key = %display_key(key), "entry deleted");
        Ok(())
    }

    /// Drop every entry and its published resource.
    ///
    /// Teardown only: bypasses the busy check, because it runs when no
    /// concurrent session can exist any more.
    pub fn clear(&self) {
        let mut state = self.lock();
        for key in state.table.keys() {
            if let Err(e) = self.sink.unpublish(&key) {
                warn!(key = %display_key(&key), error = %e, "attribute unpublish failed");
            }
        }
        state.table.clear();
        state.iter = None;
        debug!("store cleared");
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Look a value up, with the two-call growth protocol: when `capacity`
    /// is smaller than the value, fails `InsufficientBuffer` carrying the
    /// exact sizes required, so the caller can reallocate and retry.
    pub fn get(&self, key: &[u8], capacity: usize) -> StoreResult<Vec<u8>> {
        let state = self.lock();
        let handle = state.table.find(key).ok_or_else(|| StoreError::NotFound {
            key: display_key(key),
        })?;
        let Some(entry) = state.table.entry(handle) else {
            return Err(StoreError::NotFound {
                key: display_key(key),
            });
        };
        if capacity < entry.value().len() {
            return Err(StoreError::InsufficientBuffer {
                key_len: entry.key().len(),
                value_len: entry.value().len(),
            });
        }
        Ok(entry.value().to_vec())
    }

    /// The whole value for `key`. Publisher read path: no capacity protocol.
    pub fn value_of(&self, key: &[u8]) -> StoreResult<Vec<u8>> {
        self.get(key, usize::MAX)
    }

    /// Replace the value of an existing entry. Publisher write path.
    ///
    /// Deliberately not gated by the iteration flag: value-only updates stay
    /// possible during a walk, and are visible through the cursor. Fails
    /// `NotFound` rather than creating an entry.
    pub fn replace_value(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        let mut state = self.lock();
        let handle = state.table.find(key).ok_or_else(|| StoreError::NotFound {
            key: display_key(key),
        })?;
        state.table.replace_value(handle, value)?;
        debug!(key = %display_key(key), value_len = value.len(), "value replaced via attribute");
        Ok(())
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.lock().table.len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().table.is_empty()
    }

    /// The deepest collision chain currently observed. Diagnostic.
    pub fn deepest_chain(&self) -> usize {
        self.lock().table.deepest_chain()
    }

    /// Returns `true` while some session holds the iteration lock.
    pub fn locked(&self) -> bool {
        self.lock().iter.is_some()
    }

    // -----------------------------------------------------------------------
    // Iteration protocol
    // -----------------------------------------------------------------------

    /// Acquire the iteration lock for `session` and position the cursor at
    /// the first entry in bucket order.
    ///
    /// Fails `Busy` if any session (this one included) already holds the
    /// lock.
    pub fn begin_iteration(&self, session: SessionId) -> StoreResult<()> {
        let mut state = self.lock();
        if state.iter.is_some() {
            return Err(StoreError::Busy("iteration already in progress"));
        }
        let cursor = Cursor::first(&state.table);
        state.iter = Some(IterState { session, cursor });
        debug!(session, "iteration started");
        Ok(())
    }

    /// Return the entry under the cursor and advance.
    ///
    /// - `Busy` if `session` does not hold the iteration lock.
    /// - `Ok(None)` when the walk is exhausted (end-of-sequence, not an
    ///   error).
    /// - `InsufficientBuffer` with the exact required sizes when either
    ///   capacity is too small; the cursor does not advance, so the caller
    ///   retries the same entry with bigger buffers.
    pub fn next_iteration(
        &self,
        session: SessionId,
        key_capacity: usize,
        value_capacity: usize,
    ) -> StoreResult<Option<(Vec<u8>, Vec<u8>)>> {
        let mut state = self.lock();
        let holder = state.iter.as_ref().map(|it| it.session);
        if holder != Some(session) {
            return Err(StoreError::Busy("session does not hold the iteration lock"));
        }

        let cursor = match state.iter.as_ref().and_then(|it| it.cursor) {
            Some(c) => c,
            None => return Ok(None),
        };
        let Some(entry) = cursor.current(&state.table) else {
            // The entry under the cursor is gone. Structural mutation is
            // blocked while the lock is held, so this is unreachable in
            // practice; end the walk rather than panic.
            return Ok(None);
        };

        let key_len = entry.key().len();
        let value_len = entry.value().len();
        if key_capacity < key_len || value_capacity < value_len {
            return Err(StoreError::InsufficientBuffer { key_len, value_len });
        }

        let item = (entry.key().to_vec(), entry.value().to_vec());
        let next = cursor.advance(&state.table);
        if let Some(it) = state.iter.as_mut() {
            it.cursor = next;
        }
        Ok(Some(item))
    }

    /// Release the iteration lock held by `session`.
    ///
    /// Fails `Busy` (protocol misuse) if the session never acquired it.
    pub fn end_iteration(&self, session: SessionId) -> StoreResult<()> {
        let mut state = self.lock();
        match &state.iter {
            Some(it) if it.session == session => {
                state.iter = None;
                debug!(session, "iteration ended");
                Ok(())
            }
            _ => Err(StoreError::Busy("session does not hold the iteration lock")),
        }
    }

    /// Session cleanup: drop the iteration lock if this session holds it.
    ///
    /// Called when a session terminates, normally or not. Without it an
    /// abandoned iteration would wedge the store against mutation forever.
    pub fn release_session(&self, session: SessionId) {
        let mut state = self.lock();
        if let Some(it) = &state.iter {
            if it.session == session {
                state.iter = None;
                debug!(session, "iteration lock released on session close");
            }
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("Store")
            .field("entries", &state.table.len())
            .field("buckets", &state.table.bucket_count())
            .field("locked", &state.iter.is_some())
            .finish()
    }
}
