use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{Request, Response, MAX_MESSAGE_SIZE};

/// Codec for framed hive protocol messages.
///
/// Framing: `[4 bytes big-endian len][1 byte tag][payload]`, where `len`
/// covers the tag byte plus the bincode payload.
pub struct HiveCodec;

impl HiveCodec {
    /// Encode a request frame.
    pub fn encode_request(req: &Request) -> ProtocolResult<Vec<u8>> {
        encode_frame(req, req.type_tag())
    }

    /// Decode a request frame. Returns (request, bytes consumed).
    pub fn decode_request(data: &[u8]) -> ProtocolResult<(Request, usize)> {
        decode_frame(data)
    }

    /// Encode a response frame.
    pub fn encode_response(resp: &Response) -> ProtocolResult<Vec<u8>> {
        encode_frame(resp, resp.type_tag())
    }

    /// Decode a response frame. Returns (response, bytes consumed).
    pub fn decode_response(data: &[u8]) -> ProtocolResult<(Response, usize)> {
        decode_frame(data)
    }
}

fn encode_frame<M: Serialize>(msg: &M, tag: u8) -> ProtocolResult<Vec<u8>> {
    let payload =
        bincode::serialize(msg).map_err(|e| ProtocolError::Serialization(e.to_string()))?;
    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: payload.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    let len = (payload.len() + 1) as u32;
    let mut buf = Vec::with_capacity(4 + 1 + payload.len());
    buf.extend_from_slice(&len.to_be_bytes());
    buf.push(tag);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

fn decode_frame<M: DeserializeOwned>(data: &[u8]) -> ProtocolResult<(M, usize)> {
    if data.len() < 5 {
        return Err(ProtocolError::FramingError("too short".into()));
    }
    let len = u32::from_be_bytes(data[0..4].try_into().expect("4-byte slice")) as usize;
    if len < 1 {
        return Err(ProtocolError::FramingError("zero-length frame".into()));
    }
    if len - 1 > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len - 1,
            max: MAX_MESSAGE_SIZE,
        });
    }
    let total = 4 + len;
    if data.len() < total {
        return Err(ProtocolError::FramingError(format!(
            "incomplete: have {}, need {}",
            data.len(),
            total
        )));
    }
    let payload = &data[5..total];
    let msg: M =
        bincode::deserialize(payload).map_err(|e| ProtocolError::Deserialization(e.to_string()))?;
    Ok((msg, total))
}
