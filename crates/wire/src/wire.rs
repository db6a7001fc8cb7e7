// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::message::Message;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },
}

/// Upper bound on a single encoded message.
pub const MAX_MESSAGE_SIZE: usize = 8 * 1024 * 1024;

pub fn encode(msg: &Message) -> Result<String, ProtocolError> {
    let text = serde_json::to_string(msg)?;
    if text.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge { size: text.len(), max: MAX_MESSAGE_SIZE });
    }
    Ok(text)
}

pub fn decode(text: &str) -> Result<Message, ProtocolError> {
    if text.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge { size: text.len(), max: MAX_MESSAGE_SIZE });
    }
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
