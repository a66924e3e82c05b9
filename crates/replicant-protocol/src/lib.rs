//! Replicant Wire Protocol
//!
//! JSON message objects exchanged between remote sessions and the
//! authoritative process. The transport (WebSocket) delimits messages,
//! so each frame carries exactly one encoded object.

pub mod codec;
pub mod error;
pub mod message;
pub mod reply;

pub use codec::{decode_message, encode_reply, MAX_MESSAGE_SIZE};
pub use error::{ProtocolError, ProtocolResult};
pub use message::ClientMessage;
pub use reply::ServerMessage;
