use serde::{Deserialize, Serialize};

use hive_store::StoreError;

/// Wire protocol revision, echoed in every `Version` response so clients
/// can refuse a surface they do not understand.
pub const PROTOCOL_VERSION: u32 = 1;
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// The closed command set accepted by the control surface.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Request {
    Version,
    Add { key: Vec<u8>, value: Vec<u8> },
    Set { key: Vec<u8>, value: Vec<u8> },
    Get { key: Vec<u8>, value_capacity: u64 },
    Delete { key: Vec<u8> },
    Count,
    BeginIteration,
    NextIteration { key_capacity: u64, value_capacity: u64 },
    EndIteration,
}

/// One response per request; every command either succeeds or carries a
/// single [`ErrorCode`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Response {
    Version { protocol: u32, version: String },
    Ok,
    Value { value: Vec<u8> },
    Entry { key: Vec<u8>, value: Vec<u8> },
    Count { count: u64 },
    Error { code: ErrorCode, message: String },
}

/// The store error taxonomy as it crosses the session boundary.
///
/// `InsufficientBuffer` carries the exact required sizes so the caller can
/// reallocate and retry; the other codes are plain. `Fault` means the
/// payload itself could not be transferred (a codec failure), not a store
/// condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    InvalidArgument,
    AlreadyExists,
    NotFound,
    OutOfMemory,
    Busy,
    InsufficientBuffer { key_len: u64, value_len: u64 },
    Fault,
}

impl ErrorCode {
    /// Stable numeric identity, independent of the serialized layout.
    pub fn code_number(self) -> u32 {
        match self {
            Self::InvalidArgument => 1,
            Self::AlreadyExists => 2,
            Self::NotFound => 3,
            Self::OutOfMemory => 4,
            Self::Busy => 5,
            Self::InsufficientBuffer { .. } => 6,
            Self::Fault => 7,
        }
    }
}

impl From<&StoreError> for ErrorCode {
    fn from(err: &StoreError) -> Self {
        match err {
            StoreError::InvalidKey { .. } | StoreError::InvalidArgument(_) => {
                Self::InvalidArgument
            }
            StoreError::AlreadyExists { .. } => Self::AlreadyExists,
            StoreError::NotFound { .. } => Self::NotFound,
            StoreError::Busy(_) => Self::Busy,
            StoreError::InsufficientBuffer { key_len, value_len } => Self::InsufficientBuffer {
                key_len: *key_len as u64,
                value_len: *value_len as u64,
            },
            StoreError::OutOfMemory { .. } => Self::OutOfMemory,
        }
    }
}

impl Response {
    /// Build the error response for a failed store operation.
    pub fn from_store_error(err: &StoreError) -> Self {
        Self::Error {
            code: ErrorCode::from(err),
            message: err.to_string(),
        }
    }

    /// Build a `Fault` response: the payload could not cross the session
    /// boundary.
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Error {
            code: ErrorCode::Fault,
            message: message.into(),
        }
    }
}

impl Request {
    pub fn type_tag(&self) -> u8 {
        match self {
            Self::Version => 1,
            Self::Add { .. } => 2,
            Self::Set { .. } => 3,
            Self::Get { .. } => 4,
            Self::Delete { .. } => 5,
            Self::Count => 6,
            Self::BeginIteration => 7,
            Self::NextIteration { .. } => 8,
            Self::EndIteration => 9,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Version => "Version",
            Self::Add { .. } => "Add",
            Self::Set { .. } => "Set",
            Self::Get { .. } => "Get",
            Self::Delete { .. } => "Delete",
            Self::Count => "Count",
            Self::BeginIteration => "BeginIteration",
            Self::NextIteration { .. } => "NextIteration",
            Self::EndIteration => "EndIteration",
        }
    }
}

impl Response {
    pub fn type_tag(&self) -> u8 {
        match self {
            Self::Version { .. } => 1,
            Self::Ok => 2,
            Self::Value { .. } => 3,
            Self::Entry { .. } => 4,
            Self::Count { .. } => 5,
            Self::Error { .. } => 255,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Version { .. } => "Version",
            Self::Ok => "Ok",
            Self::Value { .. } => "Value",
            Self::Entry { .. } => "Entry",
            Self::Count { .. } => "Count",
            Self::Error { .. } => "Error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(ErrorCode::InvalidArgument.code_number(), 1);
        assert_eq!(ErrorCode::Busy.code_number(), 5);
        assert_eq!(
            ErrorCode::InsufficientBuffer {
                key_len: 0,
                value_len: 0
            }
            .code_number(),
            6
        );
        assert_eq!(ErrorCode::Fault.code_number(), 7);
    }

    #[test]
    fn store_errors_map_to_codes() {
        let err = StoreError::InsufficientBuffer {
            key_len: 5,
            value_len: 42,
        };
        assert_eq!(
            ErrorCode::from(&err),
            ErrorCode::InsufficientBuffer {
                key_len: 5,
                value_len: 42
            }
        );

        assert_eq!(
            ErrorCode::from(&StoreError::Busy("iteration in progress")),
            ErrorCode::Busy
        );
        assert_eq!(
            ErrorCode::from(&StoreError::InvalidKey {
                reason: "empty".into()
            }),
            ErrorCode::InvalidArgument
        );
    }

    #[test]
    fn error_response_keeps_message() {
        let err = StoreError::NotFound { key: "k".into() };
        match Response::from_store_error(&err) {
            Response::Error { code, message } => {
                assert_eq!(code, ErrorCode::NotFound);
                assert!(message.contains('k'));
            }
            other => panic!("expected error response, got {other:?}"),
        }
    }
}
