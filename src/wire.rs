//! Client-side framing for the storage node's data-transfer protocol.
//!
//! The protocol itself is owned by the storage node; this module only builds
//! the read-request frame and, for test harnesses standing up loopback
//! storage nodes, parses one back. The response is a plain byte stream of up
//! to the requested length.

use crate::block::{AccessToken, BlockDescriptor};
use std::convert::TryInto;
use thiserror::Error;

pub const OP_READ_BLOCK: u8 = 0x51;

/// Fixed-width portion of the request payload: block id, generation stamp,
/// offset and length (u64 LE each) plus the token length prefix (u32 LE).
const FIXED_PAYLOAD_LEN: usize = 8 * 4 + 4;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame truncated: need {needed} bytes, have {have}")]
    Truncated { needed: usize, have: usize },
    #[error("unknown opcode {0:#x}")]
    UnknownOpcode(u8),
    #[error("payload length mismatch: header says {header}, frame carries {actual}")]
    LengthMismatch { header: usize, actual: usize },
}

/// Read request as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequestFrame {
    pub block_id: u64,
    pub generation_stamp: u64,
    pub offset: u64,
    pub len: u64,
    pub token: Vec<u8>,
}

/// Encodes a range-read request: opcode, u32 LE payload length, payload.
pub fn encode_read_request(
    block: &BlockDescriptor,
    token: &AccessToken,
    offset: u64,
    len: u64,
) -> Vec<u8> {
    let payload_len = FIXED_PAYLOAD_LEN + token.as_bytes().len();
    let mut frame = Vec::with_capacity(1 + 4 + payload_len);
    frame.push(OP_READ_BLOCK);
    frame.extend_from_slice(&(payload_len as u32).to_le_bytes());
    frame.extend_from_slice(&block.id.to_le_bytes());
    frame.extend_from_slice(&block.generation_stamp.to_le_bytes());
    frame.extend_from_slice(&offset.to_le_bytes());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&(token.as_bytes().len() as u32).to_le_bytes());
    frame.extend_from_slice(token.as_bytes());
    frame
}

/// Parses a request frame produced by `encode_read_request`. Used by test
/// fixtures acting as the storage-node side of the protocol.
pub fn decode_read_request(frame: &[u8]) -> Result<ReadRequestFrame, FrameError> {
    if frame.len() < 5 {
        return Err(FrameError::Truncated {
            needed: 5,
            have: frame.len(),
        });
    }
    if frame[0] != OP_READ_BLOCK {
        return Err(FrameError::UnknownOpcode(frame[0]));
    }
    let payload_len = u32::from_le_bytes(frame[1..5].try_into().unwrap()) as usize;
    let payload = &frame[5..];
    if payload.len() != payload_len {
        return Err(FrameError::LengthMismatch {
            header: payload_len,
            actual: payload.len(),
        });
    }
    if payload.len() < FIXED_PAYLOAD_LEN {
        return Err(FrameError::Truncated {
            needed: FIXED_PAYLOAD_LEN,
            have: payload.len(),
        });
    }
    let u64_at = |at: usize| u64::from_le_bytes(payload[at..at + 8].try_into().unwrap());
    let token_len = u32::from_le_bytes(payload[32..36].try_into().unwrap()) as usize;
    if payload.len() != FIXED_PAYLOAD_LEN + token_len {
        return Err(FrameError::Truncated {
            needed: FIXED_PAYLOAD_LEN + token_len,
            have: payload.len(),
        });
    }
    Ok(ReadRequestFrame {
        block_id: u64_at(0),
        generation_stamp: u64_at(8),
        offset: u64_at(16),
        len: u64_at(24),
        token: payload[36..].to_vec(),
    })
}

/// Byte length of a full request frame carrying a token of `token_len` bytes.
pub fn request_frame_len(token_len: usize) -> usize {
    1 + 4 + FIXED_PAYLOAD_LEN + token_len
}
