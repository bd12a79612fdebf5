//! HELLO handshake.
//!
//! The host sends one HELLO packet (command = STOP, all params zero) and
//! reads exactly one frame back. Only RESPONSE/RESP_OK establishes the
//! session; anything else, including a rejected frame or cancellation,
//! fails it. There is no retry here; callers that want one construct a
//! new [`Handshake`].
//!
//! ```text
//! Idle ──send HELLO──► AwaitingHello ──RESPONSE/RESP_OK──► Established
//!                            │
//!                            └──anything else──► Failed
//! ```
//!
//! # Example
//!
//! ```
//! use alex_link::control::{Handshake, HandshakeState};
//! use alex_link::protocol::{serialize, FrameAccumulator, Packet, ResponseKind};
//! use alex_link::transport::MemoryTransport;
//! use alex_link::CancelToken;
//!
//! let ack = serialize(&Packet::response(ResponseKind::Ok, &[]).unwrap());
//! let mut transport = MemoryTransport::new();
//! transport.push_chunk(&ack);
//!
//! let mut handshake = Handshake::new();
//! handshake
//!     .perform(&mut transport, &mut FrameAccumulator::new(), &CancelToken::new())
//!     .unwrap();
//! assert_eq!(handshake.state(), HandshakeState::Established);
//! ```

use serde::Serialize;

use crate::cancel::CancelToken;
use crate::error::{LinkError, Result};
use crate::protocol::{serialize, FrameAccumulator, Inbound, Packet, PacketType, ResponseKind};
use crate::transport::Transport;

/// Handshake progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeState {
    /// Nothing sent yet.
    Idle,
    /// HELLO sent, waiting for the reply frame.
    AwaitingHello,
    /// Device acknowledged HELLO.
    Established,
    /// Device answered with something else, or nothing usable.
    Failed,
}

/// One-shot HELLO state machine.
#[derive(Debug, Clone)]
pub struct Handshake {
    state: HandshakeState,
}

impl Handshake {
    /// Create a handshake in the `Idle` state.
    pub fn new() -> Self {
        Self {
            state: HandshakeState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Whether the session is established.
    pub fn is_established(&self) -> bool {
        self.state == HandshakeState::Established
    }

    /// Run the exchange.
    ///
    /// # Errors
    ///
    /// - [`LinkError::HandshakeMismatch`] for any reply other than
    ///   RESPONSE/RESP_OK, a rejected frame, or cancellation; `observed`
    ///   carries the packet type that actually arrived
    /// - [`LinkError::Io`] if the HELLO cannot be written or the transport
    ///   fails while reading (state becomes `Failed`)
    /// - [`LinkError::Protocol`] if the handshake was already run
    pub fn perform<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        accumulator: &mut FrameAccumulator,
        cancel: &CancelToken,
    ) -> Result<()> {
        if self.state != HandshakeState::Idle {
            return Err(LinkError::Protocol(format!(
                "handshake already run (state {:?})",
                self.state
            )));
        }

        tracing::debug!("Sending HELLO");
        if let Err(e) = transport.write(&serialize(&Packet::hello())) {
            self.state = HandshakeState::Failed;
            return Err(e.into());
        }
        self.state = HandshakeState::AwaitingHello;

        let observed = match accumulator.receive_packet(transport, cancel) {
            Ok(Inbound::Packet(packet)) => {
                if packet.packet_type == PacketType::Response
                    && packet.response_kind() == Some(ResponseKind::Ok)
                {
                    self.state = HandshakeState::Established;
                    tracing::info!("Received HELLO response, session established");
                    return Ok(());
                }
                Some(packet.packet_type)
            }
            Ok(Inbound::Rejected(err)) => {
                tracing::warn!("HELLO reply rejected: {}", err);
                None
            }
            Err(LinkError::Cancelled) => None,
            Err(e) => {
                self.state = HandshakeState::Failed;
                return Err(e);
            }
        };

        self.state = HandshakeState::Failed;
        tracing::error!(
            "Failed to receive proper response from device (observed {:?})",
            observed
        );
        Err(LinkError::HandshakeMismatch { observed })
    }
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{deserialize, CommandKind, Frame, COMMS_PACKET_SIZE};
    use crate::transport::MemoryTransport;

    fn reply(packet: &Packet) -> Vec<u8> {
        serialize(packet).to_vec()
    }

    fn run(transport: &mut MemoryTransport) -> (Handshake, Result<()>) {
        let mut handshake = Handshake::new();
        let result = handshake.perform(transport, &mut FrameAccumulator::new(), &CancelToken::new());
        (handshake, result)
    }

    #[test]
    fn test_starts_idle() {
        let handshake = Handshake::new();
        assert_eq!(handshake.state(), HandshakeState::Idle);
        assert!(!handshake.is_established());
    }

    #[test]
    fn test_sends_hello_packet() {
        let mut transport = MemoryTransport::new();
        transport.push_chunk(&reply(&Packet::response(ResponseKind::Ok, &[]).unwrap()));
        let (_, result) = run(&mut transport);
        result.unwrap();

        let written = transport.written();
        assert_eq!(written.len(), COMMS_PACKET_SIZE);
        let hello = deserialize(&Frame::try_from(written).unwrap()).unwrap();
        assert_eq!(hello.packet_type, PacketType::Hello);
        assert_eq!(hello.command, CommandKind::Stop.as_u8());
        assert!(hello.params.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_ok_reply_establishes() {
        let mut transport = MemoryTransport::new();
        transport.push_chunked(&reply(&Packet::response(ResponseKind::Ok, &[]).unwrap()), 9);
        let (handshake, result) = run(&mut transport);

        assert!(result.is_ok());
        assert_eq!(handshake.state(), HandshakeState::Established);
    }

    #[test]
    fn test_status_reply_fails_with_response_type() {
        let mut transport = MemoryTransport::new();
        transport.push_chunk(&reply(&Packet::response(ResponseKind::Status, &[1, 2]).unwrap()));
        let (handshake, result) = run(&mut transport);

        assert!(matches!(
            result,
            Err(LinkError::HandshakeMismatch {
                observed: Some(PacketType::Response)
            })
        ));
        assert_eq!(handshake.state(), HandshakeState::Failed);
    }

    #[test]
    fn test_error_packet_reply_fails() {
        let mut transport = MemoryTransport::new();
        let packet = Packet::new(PacketType::Error, ResponseKind::BadPacket.as_u8(), &[]).unwrap();
        transport.push_chunk(&reply(&packet));
        let (_, result) = run(&mut transport);

        assert!(matches!(
            result,
            Err(LinkError::HandshakeMismatch {
                observed: Some(PacketType::Error)
            })
        ));
    }

    #[test]
    fn test_corrupted_reply_fails() {
        let mut bytes = reply(&Packet::response(ResponseKind::Ok, &[]).unwrap());
        bytes[40] ^= 0x10;
        let mut transport = MemoryTransport::new();
        transport.push_chunk(&bytes);
        let (handshake, result) = run(&mut transport);

        assert!(matches!(
            result,
            Err(LinkError::HandshakeMismatch { observed: None })
        ));
        assert_eq!(handshake.state(), HandshakeState::Failed);
    }

    #[test]
    fn test_cancellation_fails() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut transport = MemoryTransport::new();
        let mut handshake = Handshake::new();

        let result = handshake.perform(&mut transport, &mut FrameAccumulator::new(), &cancel);
        assert!(matches!(
            result,
            Err(LinkError::HandshakeMismatch { observed: None })
        ));
        assert_eq!(handshake.state(), HandshakeState::Failed);
        // HELLO still goes out before the wait.
        assert_eq!(transport.written().len(), COMMS_PACKET_SIZE);
    }

    #[test]
    fn test_cannot_run_twice() {
        let mut transport = MemoryTransport::new();
        transport.push_chunk(&reply(&Packet::response(ResponseKind::Ok, &[]).unwrap()));
        let (mut handshake, result) = run(&mut transport);
        result.unwrap();

        let again = handshake.perform(
            &mut transport,
            &mut FrameAccumulator::new(),
            &CancelToken::new(),
        );
        assert!(matches!(again, Err(LinkError::Protocol(_))));
        assert_eq!(handshake.state(), HandshakeState::Established);
    }
}
