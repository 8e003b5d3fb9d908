use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable identity of a block as reported by the block-location resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    pub id: u64,
    pub generation_stamp: u64,
    /// Total length of the block in bytes.
    pub len: u64,
}

impl BlockDescriptor {
    pub fn new(id: u64, generation_stamp: u64, len: u64) -> Self {
        Self {
            id,
            generation_stamp,
            len,
        }
    }
}

/// Data-transfer address of a storage node claiming to hold a replica.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplicaEndpoint {
    pub host: String,
    pub transfer_port: u16,
}

impl ReplicaEndpoint {
    pub fn new(host: impl Into<String>, transfer_port: u16) -> Self {
        Self {
            host: host.into(),
            transfer_port,
        }
    }

    /// `host:port` form accepted by `ToSocketAddrs`.
    pub fn transfer_addr(&self) -> String {
        format!("{}:{}", self.host, self.transfer_port)
    }
}

impl fmt::Display for ReplicaEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.transfer_port)
    }
}

/// Opaque credential authorizing a block read. Passed through to the read
/// session unmodified; the `Debug` impl redacts the payload so the token can
/// never end up in a log line.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(Vec<u8>);

impl AccessToken {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(<{} bytes redacted>)", self.0.len())
    }
}

/// Byte range requested into a block. The amount actually read is clamped to
/// the block length, so a range reaching past the end is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRange {
    pub offset: u64,
    pub len: u64,
}

impl ReadRange {
    pub fn new(offset: u64, len: u64) -> Self {
        Self { offset, len }
    }

    /// Number of bytes a session will request: `min(len, block.len - offset)`.
    pub fn effective_len(&self, block: &BlockDescriptor) -> u64 {
        self.len.min(block.len.saturating_sub(self.offset))
    }
}
