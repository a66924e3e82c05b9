//! Protocol error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Message exceeds size limit: {size} > {max}")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
