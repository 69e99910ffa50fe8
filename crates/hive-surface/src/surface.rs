//! The command dispatcher.
//!
//! Every request is a single store operation under the store's lock; the
//! lock is never held across requests. The iteration triad is the one
//! protocol that spans requests, and it does so through the store's
//! exclusivity flag rather than through the dispatcher.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use hive_protocol::{
    ErrorCode, HiveCodec, ProtocolResult, Request, Response, PROTOCOL_VERSION,
};
use hive_store::{Store, StoreConfig, StoreError};

use crate::session::Session;

/// The store's request/response control surface.
pub struct ControlSurface {
    store: Arc<Store>,
    next_session: AtomicU64,
}

impl ControlSurface {
    /// Build a surface over a fresh store with no attribute surface.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_store(Arc::new(Store::new(config)))
    }

    /// Build a surface over an existing store (typically one wired to an
    /// attribute registry).
    pub fn with_store(store: Arc<Store>) -> Self {
        Self {
            store,
            next_session: AtomicU64::new(1),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// The fixed-format version string returned by `Request::Version`.
    pub fn version_string() -> String {
        format!("hive-{}", env!("CARGO_PKG_VERSION"))
    }

    /// Open a new client session. The returned handle releases any held
    /// iteration lock when dropped.
    pub fn open_session(&self) -> Session {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        debug!(session = id, "session opened");
        Session::new(id, Arc::clone(&self.store))
    }

    /// Dispatch one decoded request for `session`.
    pub fn dispatch(&self, session: &Session, request: &Request) -> Response {
        debug!(session = session.id(), command = request.type_name(), "dispatch");
        match request {
            Request::Version => Response::Version {
                protocol: PROTOCOL_VERSION,
                version: Self::version_string(),
            },

            Request::Add { key, value } => self.do_add(key, value, false),
            Request::Set { key, value } => self.do_add(key, value, true),

            Request::Get { key, value_capacity } => {
                if let Err(e) = check_key(key) {
                    return Response::from_store_error(&e);
                }
                let capacity = clamp_capacity(*value_capacity);
                match self.store.get(key, capacity) {
                    Ok(value) => Response::Value { value },
                    Err(e) => Response::from_store_error(&e),
                }
            }

            Request::Delete { key } => {
                if let Err(e) = check_key(key) {
                    return Response::from_store_error(&e);
                }
                match self.store.delete(key) {
                    Ok(()) => Response::Ok,
                    Err(e) => Response::from_store_error(&e),
                }
            }

            Request::Count => Response::Count {
                count: self.store.len() as u64,
            },

            Request::BeginIteration => match self.store.begin_iteration(session.id()) {
                Ok(()) => Response::Ok,
                Err(e) => Response::from_store_error(&e),
            },

            Request::NextIteration {
                key_capacity,
                value_capacity,
            } => {
                let key_cap = clamp_capacity(*key_capacity);
                let value_cap = clamp_capacity(*value_capacity);
                match self.store.next_iteration(session.id(), key_cap, value_cap) {
                    Ok(Some((key, value))) => Response::Entry { key, value },
                    // End-of-sequence is reported as NotFound, per the
                    // command contract; it is a signal, not a failure.
                    Ok(None) => Response::Error {
                        code: ErrorCode::NotFound,
                        message: "end of iteration".into(),
                    },
                    Err(e) => Response::from_store_error(&e),
                }
            }

            Request::EndIteration => match self.store.end_iteration(session.id()) {
                Ok(()) => Response::Ok,
                Err(e) => Response::from_store_error(&e),
            },
        }
    }

    /// Decode one framed request, dispatch it, and encode the response.
    ///
    /// A frame that cannot be decoded yields an encoded `Fault` response;
    /// only a failure to encode the response itself is an `Err`.
    pub fn dispatch_frame(&self, session: &Session, frame: &[u8]) -> ProtocolResult<Vec<u8>> {
        let response = match HiveCodec::decode_request(frame) {
            Ok((request, _consumed)) => self.dispatch(session, &request),
            Err(e) => Response::fault(e.to_string()),
        };
        HiveCodec::encode_response(&response)
    }

    fn do_add(&self, key: &[u8], value: &[u8], allow_replace: bool) -> Response {
        if let Err(e) = check_key(key) {
            return Response::from_store_error(&e);
        }
        match self.store.add(key, value, allow_replace) {
            Ok(()) => Response::Ok,
            Err(e) => Response::from_store_error(&e),
        }
    }
}

/// Payload validation that happens before the store allocates anything.
fn check_key(key: &[u8]) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::InvalidArgument("key must not be empty".into()));
    }
    Ok(())
}

fn clamp_capacity(capacity: u64) -> usize {
    usize::try_from(capacity).unwrap_or(usize::MAX)
}

impl std::fmt::Debug for ControlSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlSurface")
            .field("store", &self.store)
            .finish()
    }
}
