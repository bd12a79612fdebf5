//! Packet codec: typed packets to frames and back.
//!
//! Decoding checks, in order, the magic number and then the checksum.
//! A frame that fails either check never yields a packet, so a single
//! corrupted byte cannot silently change a field.
//!
//! # Example
//!
//! ```
//! use alex_link::protocol::{deserialize, encode_command, CommandKind, Frame, PacketType};
//!
//! let bytes = encode_command(PacketType::Command, CommandKind::Forward.as_u8(), &[10, 50]).unwrap();
//! let frame = Frame::try_from(&bytes[..]).unwrap();
//! let packet = deserialize(&frame).unwrap();
//! assert_eq!(packet.params[..2], [10, 50]);
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::packet::{Packet, PacketType};
use super::wire_format::{
    checksum, COMMS_MAGIC_NUMBER, COMMS_PACKET_SIZE, PAYLOAD_DATA_SIZE, PAYLOAD_PARAMS_COUNT,
};
use super::Frame;
use crate::error::{FramingError, Result};

/// Encode a packet into a frame ready for the transport.
///
/// The result is always exactly [`COMMS_PACKET_SIZE`] bytes.
pub fn serialize(packet: &Packet) -> Bytes {
    let mut buf = BytesMut::with_capacity(COMMS_PACKET_SIZE);
    buf.put_u32_le(COMMS_MAGIC_NUMBER);

    let payload_start = buf.len();
    buf.put_u8(packet.packet_type.as_u8());
    buf.put_u8(packet.command);
    for &param in &packet.params {
        buf.put_u32_le(param);
    }
    buf.put_slice(&packet.data);

    let crc = checksum(&buf[payload_start..]);
    buf.put_u16_le(crc);

    debug_assert_eq!(buf.len(), COMMS_PACKET_SIZE);
    buf.freeze()
}

/// Build and encode a packet from a `(type, command, params)` triple.
///
/// # Errors
///
/// Returns [`LinkError::InvalidParameterCount`](crate::LinkError::InvalidParameterCount)
/// if more than [`PAYLOAD_PARAMS_COUNT`] params are supplied. Nothing is
/// truncated.
pub fn encode_command(packet_type: PacketType, command: u8, params: &[u32]) -> Result<Bytes> {
    let packet = Packet::new(packet_type, command, params)?;
    Ok(serialize(&packet))
}

/// Decode a complete frame.
///
/// # Errors
///
/// - [`FramingError::BadPacket`] if the magic number does not match
/// - [`FramingError::BadChecksum`] if the payload checksum does not match
pub fn deserialize(frame: &Frame) -> std::result::Result<Packet, FramingError> {
    let mut magic = frame.magic();
    if magic.get_u32_le() != COMMS_MAGIC_NUMBER {
        return Err(FramingError::BadPacket);
    }

    let payload = frame.payload();
    if checksum(payload) != frame.checksum() {
        return Err(FramingError::BadChecksum);
    }

    let mut cursor = payload;
    let packet_type = PacketType::from(cursor.get_u8());
    let command = cursor.get_u8();
    let mut params = [0u32; PAYLOAD_PARAMS_COUNT];
    for param in params.iter_mut() {
        *param = cursor.get_u32_le();
    }
    let mut data = [0u8; PAYLOAD_DATA_SIZE];
    cursor.copy_to_slice(&mut data);

    Ok(Packet {
        packet_type,
        command,
        params,
        data,
    })
}
