//! Control module - session establishment.
//!
//! Before any command is sent the host and device exchange HELLO and
//! RESPONSE/RESP_OK. See [`Handshake`] for the state machine.

mod handshake;

pub use handshake::{Handshake, HandshakeState};
