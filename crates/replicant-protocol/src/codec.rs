//! JSON codec for session frames

use crate::error::{ProtocolError, ProtocolResult};
use crate::message::ClientMessage;
use crate::reply::ServerMessage;

/// Maximum inbound frame size (1MB)
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Decode one inbound frame into a client message
pub fn decode_message(frame: &str) -> ProtocolResult<ClientMessage> {
    if frame.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: frame.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(serde_json::from_str(frame)?)
}

/// Encode one server message into an outbound frame
pub fn encode_reply(reply: &ServerMessage) -> String {
    serde_json::to_string(reply).unwrap_or_else(|_| {
        r#"{"type":"error","code":"ENCODE","message":"failed to encode reply"}"#.to_string()
    })
}
