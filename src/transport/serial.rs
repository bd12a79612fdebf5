//! Serial device transport.
//!
//! The port is opened raw at the configured baud rate, 8N1, no flow
//! control, with a short read timeout. A read that times out is reported
//! as "no data yet", so a waiting receive gets back to its cancel check
//! at least once per timeout.
//!
//! # Example
//!
//! ```ignore
//! use alex_link::config::LinkConfig;
//! use alex_link::transport::SerialTransport;
//!
//! let config = LinkConfig::default();
//! let transport = SerialTransport::open(&config)?;
//! ```

use std::io::{ErrorKind, Read, Write};

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use super::Transport;
use crate::config::LinkConfig;
use crate::error::Result;

/// Adapter turning a std stream into a [`Transport`].
///
/// `WouldBlock`, `TimedOut` and `Interrupted` become `Ok(0)`.
#[derive(Debug)]
pub struct IoTransport<S> {
    stream: S,
}

impl<S: Read + Write> IoTransport<S> {
    /// Wrap a stream.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Unwrap the adapter.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> Transport for IoTransport<S> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.stream.read(buf) {
            Ok(n) => Ok(n),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.stream.write_all(bytes)?;
        self.stream.flush()
    }
}

/// Transport over a serial port.
///
/// The port is closed when the transport is dropped.
pub struct SerialTransport {
    io: IoTransport<Box<dyn SerialPort>>,
    port: String,
}

impl SerialTransport {
    /// Open the configured port: `baud_rate` 8N1, no flow control,
    /// `read_timeout_ms` per read.
    pub fn open(config: &LinkConfig) -> Result<Self> {
        let port = serialport::new(&config.port, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout())
            .open()?;
        tracing::info!(
            "Opened serial port {} at {} baud",
            config.port,
            config.baud_rate
        );
        Ok(Self::from_port(port))
    }

    /// Wrap an already configured port. Its timeout decides how often a
    /// waiting receive checks for cancellation.
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        let name = port.name().unwrap_or_else(|| "<unnamed>".to_string());
        Self {
            io: IoTransport::new(port),
            port: name,
        }
    }

    /// Name of the opened port.
    pub fn port(&self) -> &str {
        &self.port
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.io.read(buf)
    }

    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.io.write(bytes)
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port", &self.port)
            .finish()
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        tracing::debug!("Closing serial port {}", self.port);
    }
}
