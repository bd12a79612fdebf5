//! Link session: handshake, then one request and one reply at a time.
//!
//! [`Link`] owns the transport, the frame accumulator and the cancel
//! token. The lifecycle is:
//! 1. `handshake()` exchanges HELLO and RESPONSE/RESP_OK
//! 2. `send()` writes a command frame
//! 3. `receive()` blocks until a frame arrives or the token is cancelled
//!
//! # Example
//!
//! ```
//! use alex_link::command::CommandRequest;
//! use alex_link::protocol::{serialize, CommandKind, Packet, ResponseKind};
//! use alex_link::transport::MemoryTransport;
//! use alex_link::Link;
//!
//! // Device that acknowledges everything.
//! let ack = serialize(&Packet::response(ResponseKind::Ok, &[]).unwrap()).to_vec();
//! let transport = MemoryTransport::with_responder(move |_| Some(ack.clone()));
//!
//! let mut link = Link::new(transport);
//! link.handshake().unwrap();
//! link.send(&CommandRequest::new(CommandKind::Forward, vec![10, 50])).unwrap();
//! let reply = link.receive().unwrap();
//! assert!(reply.packet().is_some());
//! ```

use crate::cancel::CancelToken;
use crate::command::CommandRequest;
use crate::control::{Handshake, HandshakeState};
use crate::error::{LinkError, Result};
use crate::protocol::{FrameAccumulator, Inbound};
use crate::transport::Transport;

/// An open link to the device.
pub struct Link<T: Transport> {
    transport: T,
    accumulator: FrameAccumulator,
    handshake: Handshake,
    cancel: CancelToken,
}

impl<T: Transport> Link<T> {
    /// Wrap a transport with a fresh cancel token.
    pub fn new(transport: T) -> Self {
        Self::with_cancel_token(transport, CancelToken::new())
    }

    /// Wrap a transport with a cancel token shared with other code.
    pub fn with_cancel_token(transport: T, cancel: CancelToken) -> Self {
        Self {
            transport,
            accumulator: FrameAccumulator::new(),
            handshake: Handshake::new(),
            cancel,
        }
    }

    /// Establish the session. See [`Handshake::perform`].
    pub fn handshake(&mut self) -> Result<()> {
        self.handshake
            .perform(&mut self.transport, &mut self.accumulator, &self.cancel)
    }

    /// Whether the handshake succeeded.
    pub fn is_established(&self) -> bool {
        self.handshake.is_established()
    }

    /// Handshake state.
    pub fn state(&self) -> HandshakeState {
        self.handshake.state()
    }

    /// Encode and write one command.
    ///
    /// # Errors
    ///
    /// - [`LinkError::Protocol`] if the session is not established
    /// - [`LinkError::InvalidParameterCount`] if the request has too many
    ///   params (nothing is written)
    /// - [`LinkError::Io`] if the write fails
    pub fn send(&mut self, request: &CommandRequest) -> Result<()> {
        if !self.is_established() {
            return Err(LinkError::Protocol(format!(
                "cannot send before handshake (state {:?})",
                self.state()
            )));
        }
        let bytes = request.encode()?;
        self.transport.write(&bytes)?;
        tracing::debug!(
            "Sent {} packet, command {}, params {:?}",
            request.packet_type,
            request.command,
            request.params
        );
        Ok(())
    }

    /// Wait for the next frame.
    ///
    /// Rejected frames come back as [`Inbound::Rejected`]; the next call
    /// reads the following frame.
    ///
    /// # Errors
    ///
    /// - [`LinkError::Cancelled`] if the token is cancelled while waiting
    /// - [`LinkError::Io`] if the transport fails
    pub fn receive(&mut self) -> Result<Inbound> {
        self.accumulator
            .receive_packet(&mut self.transport, &self.cancel)
    }

    /// Token that stops a blocked `receive()`. Clones share state.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Close the link and return the transport.
    pub fn into_transport(self) -> T {
        tracing::debug!("Closing link");
        self.transport
    }
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for Link<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("transport", &self.transport)
            .field("state", &self.handshake.state())
            .field("buffered", &self.accumulator.buffered())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{
        deserialize, serialize, CommandKind, Frame, Packet, PacketType, ResponseKind,
        COMMS_PACKET_SIZE,
    };
    use crate::transport::MemoryTransport;
    use crate::FramingError;

    fn ack() -> Vec<u8> {
        serialize(&Packet::response(ResponseKind::Ok, &[]).unwrap()).to_vec()
    }

    fn established() -> Link<MemoryTransport> {
        let mut transport = MemoryTransport::new();
        transport.push_chunk(&ack());
        let mut link = Link::new(transport);
        link.handshake().unwrap();
        link.transport_mut().take_written();
        link
    }

    #[test]
    fn test_send_before_handshake_rejected() {
        let mut link = Link::new(MemoryTransport::new());
        let request = CommandRequest::new(CommandKind::Stop, vec![]);

        assert!(matches!(link.send(&request), Err(LinkError::Protocol(_))));
        assert!(link.transport().written().is_empty());
        assert_eq!(link.state(), HandshakeState::Idle);
    }

    #[test]
    fn test_send_after_handshake() {
        let mut link = established();
        assert!(link.is_established());

        link.send(&CommandRequest::new(CommandKind::TurnRight, vec![90, 60]))
            .unwrap();

        let written = link.transport().written();
        assert_eq!(written.len(), COMMS_PACKET_SIZE);
        let packet = deserialize(&Frame::try_from(written).unwrap()).unwrap();
        assert_eq!(packet.packet_type, PacketType::Command);
        assert_eq!(packet.command_kind(), Some(CommandKind::TurnRight));
        assert_eq!(packet.params[..2], [90, 60]);
    }

    #[test]
    fn test_oversized_request_writes_nothing() {
        let mut link = established();
        let request = CommandRequest::new(CommandKind::Forward, vec![1; 11]);

        assert!(matches!(
            link.send(&request),
            Err(LinkError::InvalidParameterCount { given: 11 })
        ));
        assert!(link.transport().written().is_empty());
    }

    #[test]
    fn test_receive_continues_after_rejection() {
        let mut link = established();
        let mut bad = ack();
        bad[0] = 0;
        link.transport_mut().push_chunk(&bad);
        link.transport_mut().push_chunked(
            &serialize(&Packet::message("ready")),
            7,
        );

        assert!(matches!(
            link.receive().unwrap(),
            Inbound::Rejected(FramingError::BadPacket)
        ));
        let packet = link.receive().unwrap().packet().unwrap();
        assert_eq!(packet.text(), "ready");
    }

    #[test]
    fn test_cancel_token_stops_receive() {
        let mut link = established();
        link.cancel_token().cancel();

        let err = link.receive().unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_failed_handshake_blocks_send() {
        let mut transport = MemoryTransport::new();
        transport.push_chunk(&serialize(&Packet::message("boot")));
        let mut link = Link::new(transport);

        assert!(matches!(
            link.handshake(),
            Err(LinkError::HandshakeMismatch {
                observed: Some(PacketType::Message)
            })
        ));
        assert_eq!(link.state(), HandshakeState::Failed);
        let request = CommandRequest::new(CommandKind::Stop, vec![]);
        assert!(matches!(link.send(&request), Err(LinkError::Protocol(_))));
    }
}
