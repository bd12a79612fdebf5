//! # alex-link
//!
//! Host side of the serial link to the Alex motor-control board.
//!
//! The link carries fixed-size 80-byte frames over a half-duplex byte
//! stream. The host sends commands; the device answers with
//! acknowledgements, status and colour reports, error notices or text.
//!
//! ## Architecture
//!
//! - **Protocol** ([`protocol`]): wire layout, CRC-16 check, packet codec
//!   and the frame accumulator that assembles frames from partial reads
//! - **Control** ([`control`]): HELLO handshake state machine
//! - **Handler** ([`handler`]): packet classification and reports
//! - **Command** ([`command`]): operator input to command requests
//! - **Transport** ([`transport`]): byte channel abstraction (serial,
//!   in-memory)
//!
//! Blocking receives are stopped with a shared [`CancelToken`].
//!
//! ## Example
//!
//! ```
//! use alex_link::command::{CommandRegistry, Parsed};
//! use alex_link::handler::Report;
//! use alex_link::protocol::{serialize, Packet, ResponseKind};
//! use alex_link::transport::MemoryTransport;
//! use alex_link::Link;
//!
//! let ack = serialize(&Packet::response(ResponseKind::Ok, &[]).unwrap()).to_vec();
//! let mut link = Link::new(MemoryTransport::with_responder(move |_| Some(ack.clone())));
//! link.handshake().unwrap();
//!
//! let registry = CommandRegistry::new();
//! if let Parsed::Command(request) = registry.parse("f 20 70").unwrap() {
//!     link.send(&request).unwrap();
//!     let packet = link.receive().unwrap().packet().unwrap();
//!     assert_eq!(Report::from_packet(&packet).to_string(), "Command OK");
//! }
//! ```

pub mod command;
pub mod config;
pub mod control;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod transport;

mod cancel;
mod session;

pub use cancel::CancelToken;
pub use config::LinkConfig;
pub use error::{FramingError, LinkError, Result};
pub use session::Link;
