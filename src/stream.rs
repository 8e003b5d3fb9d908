//! Resilient block-range streaming.
//!
//! Opens a short-lived read session against one replica, requests a byte
//! range, and drives it to completion under a bounded retry budget. Partial
//! reads are normal and handled by continuing the loop; an exhausted budget
//! aborts the whole call. The caller never sees a truncated buffer.

use crate::block::{AccessToken, BlockDescriptor, ReadRange, ReplicaEndpoint};
use crate::timeouts::{DEFAULT_READ_RETRIES, READ_TIMEOUT};
use crate::wire::encode_read_request;
use log::{debug, warn};
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("read session error: {0}")]
    Io(#[from] io::Error),
    #[error("could not read data from storage node: {unread} bytes unread after retries exhausted")]
    RetriesExhausted { unread: u64 },
}

/// One live read session. Short reads are expected; an error (or a
/// zero-length read with bytes still outstanding) is a transient failure
/// charged against the retry budget.
pub trait RangeSession {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Opens read sessions. The production transport speaks TCP; tests inject
/// scripted implementations.
pub trait SessionTransport {
    type Session: RangeSession;

    fn open(
        &self,
        endpoint: &ReplicaEndpoint,
        block: &BlockDescriptor,
        token: &AccessToken,
        offset: u64,
        len: u64,
        timeout: Duration,
    ) -> io::Result<Self::Session>;
}

/// Production transport: one TCP connection per session, connect and read
/// bounded by the caller-supplied timeout, request frame sent on open.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpTransport;

impl SessionTransport for TcpTransport {
    type Session = TcpRangeSession;

    fn open(
        &self,
        endpoint: &ReplicaEndpoint,
        block: &BlockDescriptor,
        token: &AccessToken,
        offset: u64,
        len: u64,
        timeout: Duration,
    ) -> io::Result<Self::Session> {
        let mut last_err = None;
        for addr in endpoint.transfer_addr().to_socket_addrs()? {
            debug!("event=read_session_attempt peer={addr} block={}", block.id);
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(timeout))?;
                    stream.set_write_timeout(Some(timeout))?;
                    let mut session = TcpRangeSession { stream };
                    session
                        .stream
                        .write_all(&encode_read_request(block, token, offset, len))?;
                    debug!(
                        "event=read_session_open peer={addr} block={} offset={offset} len={len}",
                        block.id
                    );
                    return Ok(session);
                }
                Err(err) => {
                    debug!("event=read_session_error peer={addr} error={err}");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "address resolved empty")))
    }
}

/// Exclusively owns its socket; drop closes it on every exit path.
pub struct TcpRangeSession {
    stream: TcpStream,
}

impl RangeSession for TcpRangeSession {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Drop for TcpRangeSession {
    fn drop(&mut self) {
        match self.stream.peer_addr() {
            Ok(addr) => debug!("event=read_session_close peer={addr}"),
            Err(_) => debug!("event=read_session_close peer=unknown"),
        }
    }
}

/// One line of block content with the block-relative byte offset at which it
/// began. The newline delimiter is stripped but still accounted for in the
/// following line's offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLine {
    pub text: String,
    pub offset: u64,
}

pub struct RangeStreamer<T = TcpTransport> {
    transport: T,
    session_timeout: Duration,
    max_retries: u32,
}

impl RangeStreamer<TcpTransport> {
    pub fn new() -> Self {
        Self::with_transport(TcpTransport, READ_TIMEOUT, DEFAULT_READ_RETRIES)
    }
}

impl Default for RangeStreamer<TcpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SessionTransport> RangeStreamer<T> {
    pub fn with_transport(transport: T, session_timeout: Duration, max_retries: u32) -> Self {
        Self {
            transport,
            session_timeout,
            max_retries,
        }
    }

    /// Reads `range.effective_len(block)` bytes of `block` from `endpoint`.
    ///
    /// Returns the fully populated buffer or fails; a zero-length effective
    /// range returns an empty buffer without opening a connection. The
    /// session tolerates up to `max_retries` transient read failures and
    /// fails with `StreamError::RetriesExhausted` on the next one.
    pub fn stream(
        &self,
        endpoint: &ReplicaEndpoint,
        block: &BlockDescriptor,
        token: &AccessToken,
        range: ReadRange,
    ) -> Result<Vec<u8>, StreamError> {
        let effective = range.effective_len(block);
        if effective == 0 {
            return Ok(Vec::new());
        }
        let mut session = self.transport.open(
            endpoint,
            block,
            token,
            range.offset,
            effective,
            self.session_timeout,
        )?;
        let mut buf = vec![0u8; effective as usize];
        let mut filled = 0usize;
        let mut retries = self.max_retries;
        while filled < buf.len() {
            match session.read_chunk(&mut buf[filled..]) {
                Ok(n) if n > 0 => {
                    filled += n;
                }
                outcome => {
                    let unread = (buf.len() - filled) as u64;
                    match outcome {
                        Err(err) => warn!(
                            "event=block_read_retry peer={endpoint} block={} unread={unread} error={err}",
                            block.id
                        ),
                        Ok(_) => warn!(
                            "event=block_read_retry peer={endpoint} block={} unread={unread} error=closed-early",
                            block.id
                        ),
                    }
                    if retries == 0 {
                        return Err(StreamError::RetriesExhausted { unread });
                    }
                    retries -= 1;
                }
            }
        }
        Ok(buf)
    }

    /// Line-oriented variant for per-line provenance links: splits the
    /// streamed range on `\n` and reports where each line began within the
    /// block. Offsets advance by the raw byte length of the line plus the
    /// stripped delimiter, so they stay exact even when a line needs lossy
    /// UTF-8 conversion.
    pub fn stream_lines(
        &self,
        endpoint: &ReplicaEndpoint,
        block: &BlockDescriptor,
        token: &AccessToken,
        range: ReadRange,
    ) -> Result<Vec<BlockLine>, StreamError> {
        let buf = self.stream(endpoint, block, token, range)?;
        Ok(split_lines(&buf, range.offset))
    }
}

fn split_lines(buf: &[u8], start_offset: u64) -> Vec<BlockLine> {
    let mut lines = Vec::new();
    let mut offset = start_offset;
    let mut segments = buf.split(|byte| *byte == b'\n').peekable();
    while let Some(segment) = segments.next() {
        // A trailing delimiter yields a final empty segment with no line
        // after it; interior empty segments are real (empty) lines.
        if segment.is_empty() && segments.peek().is_none() {
            break;
        }
        lines.push(BlockLine {
            text: String::from_utf8_lossy(segment).into_owned(),
            offset,
        });
        offset += segment.len() as u64 + 1;
    }
    lines
}
