//! Transport module - the byte channel under the link.
//!
//! Provides:
//! - [`Transport`] - non-blocking read / complete write contract
//! - [`IoTransport`] - adapter over any `Read + Write` stream
//! - [`SerialTransport`] - the configured serial device node
//! - [`MemoryTransport`] - scripted in-memory channel for tests and demos

mod memory;
mod serial;

pub use memory::MemoryTransport;
pub use serial::{IoTransport, SerialTransport};

/// A half-duplex byte channel.
pub trait Transport {
    /// Read up to `buf.len()` bytes.
    ///
    /// Returns `Ok(0)` when no data is available yet; that is not an error
    /// and not end-of-stream.
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

    /// Write all of `bytes`.
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        (**self).write(bytes)
    }
}
