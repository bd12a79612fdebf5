//! Scripted in-memory transport.
//!
//! Each queued chunk is returned by one `read` call (split if the caller
//! asks for fewer bytes). An empty chunk yields a zero-length read, which
//! lets tests model a device that is slow to answer. Once the script is
//! exhausted every read returns `Ok(0)`.
//!
//! # Example
//!
//! ```
//! use alex_link::transport::{MemoryTransport, Transport};
//!
//! let mut transport = MemoryTransport::new();
//! transport.push_chunk(b"ab");
//! transport.push_empty();
//!
//! let mut buf = [0u8; 8];
//! assert_eq!(transport.read(&mut buf).unwrap(), 2);
//! assert_eq!(transport.read(&mut buf).unwrap(), 0);
//! ```

use std::collections::VecDeque;

use bytes::{Buf, Bytes};

use super::Transport;

/// Reply produced when the transport sees a write.
type Responder = Box<dyn FnMut(&[u8]) -> Option<Vec<u8>> + Send>;

/// In-memory transport with a scripted inbound side.
#[derive(Default)]
pub struct MemoryTransport {
    inbound: VecDeque<Bytes>,
    written: Vec<u8>,
    reads: usize,
    responder: Option<Responder>,
}

impl MemoryTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport that answers every write with the responder's
    /// output (queued as one chunk).
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: FnMut(&[u8]) -> Option<Vec<u8>> + Send + 'static,
    {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::default()
        }
    }

    /// Queue a chunk to be returned by the next read.
    pub fn push_chunk(&mut self, bytes: &[u8]) {
        self.inbound.push_back(Bytes::copy_from_slice(bytes));
    }

    /// Queue a zero-length read.
    pub fn push_empty(&mut self) {
        self.inbound.push_back(Bytes::new());
    }

    /// Queue `bytes` split into chunks of at most `chunk_size` bytes.
    pub fn push_chunked(&mut self, bytes: &[u8], chunk_size: usize) {
        for chunk in bytes.chunks(chunk_size.max(1)) {
            self.push_chunk(chunk);
        }
    }

    /// Everything written so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Drain and return everything written so far.
    pub fn take_written(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.written)
    }

    /// Number of read calls served.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Number of scripted chunks not yet consumed.
    pub fn pending_chunks(&self) -> usize {
        self.inbound.len()
    }
}

impl Transport for MemoryTransport {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reads += 1;
        let Some(front) = self.inbound.front_mut() else {
            return Ok(0);
        };

        let n = front.len().min(buf.len());
        buf[..n].copy_from_slice(&front[..n]);
        front.advance(n);
        if front.is_empty() {
            self.inbound.pop_front();
        }
        Ok(n)
    }

    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.written.extend_from_slice(bytes);
        if let Some(responder) = self.responder.as_mut() {
            if let Some(reply) = responder(bytes) {
                self.inbound.push_back(Bytes::from(reply));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransport")
            .field("pending_chunks", &self.inbound.len())
            .field("written", &self.written.len())
            .field("reads", &self.reads)
            .finish()
    }
}
