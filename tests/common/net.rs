#![cfg(test)]

use blockview::wire::decode_read_request;
use std::convert::TryInto;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;

/// Reserves and returns an ephemeral loopback address nothing listens on.
pub fn next_loopback() -> SocketAddr {
    TcpListener::bind("127.0.0.1:0")
        .expect("bind ephemeral port")
        .local_addr()
        .expect("ephemeral addr")
}

/// Loopback stand-in for a storage node's data-transfer endpoint. Serves the
/// requested range of `content` on each connection that sends a read-request
/// frame; probe connections that close without writing are tolerated.
pub struct BlockServer {
    pub addr: SocketAddr,
    handle: thread::JoinHandle<()>,
}

impl BlockServer {
    pub fn join(self) {
        let _ = self.handle.join();
    }
}

/// Spawns a server that accepts `accepts` connections and answers range
/// reads from `content`, writing at most `chunk` bytes per write so clients
/// see partial reads.
pub fn spawn_block_server(content: Vec<u8>, accepts: usize, chunk: usize) -> BlockServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind block server");
    let addr = listener.local_addr().expect("block server addr");
    let handle = thread::spawn(move || {
        for _ in 0..accepts {
            match listener.accept() {
                Ok((stream, _)) => {
                    // Probes close without sending a frame; ignore the
                    // resulting short read.
                    let _ = serve_connection(stream, &content, chunk);
                }
                Err(_) => break,
            }
        }
    });
    BlockServer { addr, handle }
}

fn serve_connection(mut stream: TcpStream, content: &[u8], chunk: usize) -> std::io::Result<()> {
    let mut header = [0u8; 5];
    stream.read_exact(&mut header)?;
    let payload_len = u32::from_le_bytes(header[1..5].try_into().unwrap()) as usize;
    let mut frame = header.to_vec();
    frame.resize(5 + payload_len, 0);
    stream.read_exact(&mut frame[5..])?;
    let request = decode_read_request(&frame).expect("well-formed read request");
    let start = (request.offset as usize).min(content.len());
    let end = (start + request.len as usize).min(content.len());
    for piece in content[start..end].chunks(chunk.max(1)) {
        stream.write_all(piece)?;
        stream.flush()?;
    }
    Ok(())
}
