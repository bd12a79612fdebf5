//! Protocol module - wire format, packets, framing and codec.
//!
//! This module implements the link layer:
//! - Fixed 80-byte frame layout and CRC-16 integrity check
//! - Typed packet vocabulary
//! - Frame accumulator for assembling frames from partial reads
//! - Codec turning frames into packets and back

mod codec;
mod frame;
mod frame_buffer;
mod packet;
mod wire_format;

pub use codec::{deserialize, encode_command, serialize};
pub use frame::Frame;
pub use frame_buffer::{FrameAccumulator, Inbound};
pub use packet::{CommandKind, Packet, PacketType, ResponseKind, UnknownType};
pub use wire_format::{
    checksum, CHECKSUM_OFFSET, CHECKSUM_SIZE, COMMS_MAGIC_NUMBER, COMMS_PACKET_SIZE, MAGIC_SIZE,
    PAYLOAD_DATA_SIZE, PAYLOAD_OFFSET, PAYLOAD_PACKET_SIZE, PAYLOAD_PARAMS_COUNT,
};
