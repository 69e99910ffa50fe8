//! Wire protocol for the hive store.
//!
//! Defines the framing, the closed request/response command set, and the
//! error-code taxonomy used between clients and the control surface. One
//! request maps to one response; the only state spanning requests is the
//! iteration lock, which lives in the store, not in the protocol.

pub mod codec;
pub mod error;
pub mod message;

pub use codec::HiveCodec;
pub use error::{ProtocolError, ProtocolResult};
pub use message::{ErrorCode, Request, Response, MAX_MESSAGE_SIZE, PROTOCOL_VERSION};
