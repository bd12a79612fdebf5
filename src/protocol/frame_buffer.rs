//! Frame accumulator for assembling fixed-size frames from partial reads.
//!
//! The accumulator owns a buffer of exactly [`COMMS_PACKET_SIZE`] bytes and
//! a cursor. Each poll asks the transport for the bytes still missing;
//! whatever arrives (possibly nothing) is appended at the cursor. When the
//! buffer is full it becomes a [`Frame`].
//!
//! There is no sleep or timeout in the loop. A silent transport keeps the
//! receive spinning until its [`CancelToken`] is set; the token is checked
//! once per iteration.
//!
//! # Example
//!
//! ```
//! use alex_link::protocol::{serialize, FrameAccumulator, Inbound, Packet};
//! use alex_link::transport::MemoryTransport;
//! use alex_link::CancelToken;
//!
//! let mut transport = MemoryTransport::new();
//! transport.push_chunked(&serialize(&Packet::message("hi")), 7);
//!
//! let mut accumulator = FrameAccumulator::new();
//! match accumulator.receive_packet(&mut transport, &CancelToken::new()).unwrap() {
//!     Inbound::Packet(packet) => assert_eq!(packet.text(), "hi"),
//!     Inbound::Rejected(err) => panic!("unexpected {err}"),
//! }
//! ```

use super::codec::deserialize;
use super::packet::Packet;
use super::wire_format::COMMS_PACKET_SIZE;
use super::Frame;
use crate::cancel::CancelToken;
use crate::error::{FramingError, LinkError, Result};
use crate::transport::Transport;

/// Outcome of receiving one complete frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Frame passed both checks.
    Packet(Packet),
    /// Frame was complete but failed the magic or checksum check.
    Rejected(FramingError),
}

impl Inbound {
    /// The packet, if the frame was accepted.
    pub fn packet(self) -> Option<Packet> {
        match self {
            Inbound::Packet(packet) => Some(packet),
            Inbound::Rejected(_) => None,
        }
    }
}

/// Accumulates bytes from a transport until a full frame is available.
pub struct FrameAccumulator {
    /// Frame being assembled.
    buffer: [u8; COMMS_PACKET_SIZE],
    /// Bytes filled so far.
    filled: usize,
}

impl FrameAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self {
            buffer: [0u8; COMMS_PACKET_SIZE],
            filled: 0,
        }
    }

    /// Poll the transport until a full frame is assembled.
    ///
    /// Zero-length reads are not errors; the loop simply polls again.
    ///
    /// # Errors
    ///
    /// - [`LinkError::Cancelled`] if `cancel` is set before the frame completes
    /// - [`LinkError::Io`] if the transport fails
    ///
    /// Bytes already accumulated are kept after an error, so a later call
    /// resumes the same frame.
    pub fn receive_frame<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        cancel: &CancelToken,
    ) -> Result<Frame> {
        loop {
            if cancel.is_cancelled() {
                tracing::debug!("Receive cancelled with {} bytes buffered", self.filled);
                return Err(LinkError::Cancelled);
            }

            let n = transport.read(&mut self.buffer[self.filled..])?;
            // A misbehaving transport must not push the cursor past the buffer.
            self.filled += n.min(COMMS_PACKET_SIZE - self.filled);

            if self.filled == COMMS_PACKET_SIZE {
                self.filled = 0;
                return Ok(Frame::new(self.buffer));
            }
        }
    }

    /// Receive one frame and run it through the codec.
    ///
    /// Rejected frames are logged and returned as [`Inbound::Rejected`];
    /// they never abort the session.
    pub fn receive_packet<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        cancel: &CancelToken,
    ) -> Result<Inbound> {
        let frame = self.receive_frame(transport, cancel)?;
        match deserialize(&frame) {
            Ok(packet) => {
                tracing::debug!(
                    "Received {} packet, command {}",
                    packet.packet_type,
                    packet.command
                );
                Ok(Inbound::Packet(packet))
            }
            Err(err) => {
                tracing::warn!("Rejected frame: {}", err);
                Ok(Inbound::Rejected(err))
            }
        }
    }

    /// Number of bytes of the current frame received so far.
    pub fn buffered(&self) -> usize {
        self.filled
    }

    /// Discard a partially received frame.
    pub fn clear(&mut self) {
        self.filled = 0;
    }
}

impl Default for FrameAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrameAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameAccumulator")
            .field("filled", &self.filled)
            .finish()
    }
}
