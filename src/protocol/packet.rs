//! Decoded packet and its vocabulary.
//!
//! A [`Packet`] is the typed view of a frame's payload. Its `command`
//! byte is interpreted according to `packet_type`: a [`CommandKind`] for
//! COMMAND packets, a [`ResponseKind`] for RESPONSE and ERROR packets.
//!
//! # Example
//!
//! ```
//! use alex_link::protocol::{CommandKind, Packet, PacketType};
//!
//! let packet = Packet::command(CommandKind::Forward, &[10, 50]).unwrap();
//! assert_eq!(packet.packet_type, PacketType::Command);
//! assert_eq!(packet.params[..3], [10, 50, 0]);
//! ```

use std::fmt;

use serde::Serialize;

use super::wire_format::{PAYLOAD_DATA_SIZE, PAYLOAD_PARAMS_COUNT};
use crate::error::{LinkError, Result};

/// Packet type byte.
///
/// Decoding is total: bytes outside the vocabulary become `Unknown`.
/// `Unknown` can only be built from such a byte, so every value maps to
/// exactly one wire byte and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketType {
    /// Host to device command.
    Command,
    /// Device acknowledgement or report.
    Response,
    /// Device error notice.
    Error,
    /// Free-text message from the device.
    Message,
    /// Session establishment.
    Hello,
    /// Byte outside the vocabulary.
    Unknown(UnknownType),
}

/// A packet type byte with no assigned meaning (5..=255).
///
/// Only produced by `PacketType::from(u8)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UnknownType(u8);

impl UnknownType {
    /// Raw wire byte.
    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl PacketType {
    /// Wire value of this type.
    pub fn as_u8(self) -> u8 {
        match self {
            PacketType::Command => 0,
            PacketType::Response => 1,
            PacketType::Error => 2,
            PacketType::Message => 3,
            PacketType::Hello => 4,
            PacketType::Unknown(raw) => raw.get(),
        }
    }
}

impl From<u8> for PacketType {
    fn from(raw: u8) -> Self {
        match raw {
            0 => PacketType::Command,
            1 => PacketType::Response,
            2 => PacketType::Error,
            3 => PacketType::Message,
            4 => PacketType::Hello,
            other => PacketType::Unknown(UnknownType(other)),
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketType::Command => f.write_str("COMMAND"),
            PacketType::Response => f.write_str("RESPONSE"),
            PacketType::Error => f.write_str("ERROR"),
            PacketType::Message => f.write_str("MESSAGE"),
            PacketType::Hello => f.write_str("HELLO"),
            PacketType::Unknown(raw) => write!(f, "UNKNOWN({})", raw.get()),
        }
    }
}

/// Motion and housekeeping commands understood by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CommandKind {
    Forward = 0,
    Reverse = 1,
    TurnLeft = 2,
    TurnRight = 3,
    Stop = 4,
    GetStats = 5,
    ClearStats = 6,
    Open = 7,
    Close = 8,
    Scan = 9,
    Drop = 10,
}

impl CommandKind {
    /// Every command, in wire order.
    pub const ALL: [CommandKind; 11] = [
        CommandKind::Forward,
        CommandKind::Reverse,
        CommandKind::TurnLeft,
        CommandKind::TurnRight,
        CommandKind::Stop,
        CommandKind::GetStats,
        CommandKind::ClearStats,
        CommandKind::Open,
        CommandKind::Close,
        CommandKind::Scan,
        CommandKind::Drop,
    ];

    /// Wire value of this command.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Look up a command by wire value.
    pub fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

/// Response and error codes sent by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ResponseKind {
    Ok = 0,
    Status = 1,
    BadPacket = 2,
    BadChecksum = 3,
    BadCommand = 4,
    BadResponse = 5,
    Color = 6,
}

impl ResponseKind {
    /// Every response code, in wire order.
    pub const ALL: [ResponseKind; 7] = [
        ResponseKind::Ok,
        ResponseKind::Status,
        ResponseKind::BadPacket,
        ResponseKind::BadChecksum,
        ResponseKind::BadCommand,
        ResponseKind::BadResponse,
        ResponseKind::Color,
    ];

    /// Wire value of this response code.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Look up a response code by wire value.
    pub fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

/// A decoded packet.
///
/// `params` always holds exactly [`PAYLOAD_PARAMS_COUNT`] entries; slots
/// the sender did not use are zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Packet {
    /// Packet type.
    pub packet_type: PacketType,
    /// Command or response code, meaning depends on `packet_type`.
    pub command: u8,
    /// Integer params, zero padded.
    pub params: [u32; PAYLOAD_PARAMS_COUNT],
    /// Free-text payload (MESSAGE packets), NUL padded.
    #[serde(serialize_with = "serialize_text")]
    pub data: [u8; PAYLOAD_DATA_SIZE],
}

impl Packet {
    /// Build a packet with params zero-padded to the fixed count.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::InvalidParameterCount`] if more than
    /// [`PAYLOAD_PARAMS_COUNT`] params are supplied.
    pub fn new(packet_type: PacketType, command: u8, params: &[u32]) -> Result<Self> {
        if params.len() > PAYLOAD_PARAMS_COUNT {
            return Err(LinkError::InvalidParameterCount {
                given: params.len(),
            });
        }
        let mut padded = [0u32; PAYLOAD_PARAMS_COUNT];
        padded[..params.len()].copy_from_slice(params);
        Ok(Self {
            packet_type,
            command,
            params: padded,
            data: [0u8; PAYLOAD_DATA_SIZE],
        })
    }

    /// Build a COMMAND packet.
    pub fn command(kind: CommandKind, params: &[u32]) -> Result<Self> {
        Self::new(PacketType::Command, kind.as_u8(), params)
    }

    /// Build a RESPONSE packet.
    pub fn response(kind: ResponseKind, params: &[u32]) -> Result<Self> {
        Self::new(PacketType::Response, kind.as_u8(), params)
    }

    /// Build the HELLO packet that opens a session (command = STOP, no params).
    pub fn hello() -> Self {
        Self {
            packet_type: PacketType::Hello,
            command: CommandKind::Stop.as_u8(),
            params: [0; PAYLOAD_PARAMS_COUNT],
            data: [0; PAYLOAD_DATA_SIZE],
        }
    }

    /// Build a MESSAGE packet. Text longer than the data field is truncated.
    pub fn message(text: &str) -> Self {
        let mut data = [0u8; PAYLOAD_DATA_SIZE];
        let bytes = text.as_bytes();
        let len = bytes.len().min(PAYLOAD_DATA_SIZE);
        data[..len].copy_from_slice(&bytes[..len]);
        Self {
            packet_type: PacketType::Message,
            command: 0,
            params: [0; PAYLOAD_PARAMS_COUNT],
            data,
        }
    }

    /// Command kind, if this is a COMMAND packet with a known code.
    pub fn command_kind(&self) -> Option<CommandKind> {
        match self.packet_type {
            PacketType::Command => CommandKind::from_u8(self.command),
            _ => None,
        }
    }

    /// Response kind, if this is a RESPONSE or ERROR packet with a known code.
    pub fn response_kind(&self) -> Option<ResponseKind> {
        match self.packet_type {
            PacketType::Response | PacketType::Error => ResponseKind::from_u8(self.command),
            _ => None,
        }
    }

    /// Data field as text, up to the first NUL. Invalid UTF-8 is replaced.
    pub fn text(&self) -> String {
        decode_text(&self.data)
    }
}

fn decode_text(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).into_owned()
}

fn serialize_text<S: serde::Serializer>(
    data: &[u8; PAYLOAD_DATA_SIZE],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&decode_text(data))
}
