//! Packet classification.

use serde::Serialize;

use crate::protocol::{Packet, PacketType, ResponseKind};

/// What an inbound packet means to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// A COMMAND packet. Only the host sends these, so it is informational.
    CommandEcho,
    /// RESPONSE/RESP_OK.
    AckOk,
    /// RESPONSE/RESP_STATUS with ten tick and distance counters.
    StatusReport,
    /// RESPONSE/RESP_COLOR with R, G, B frequencies.
    ColorReport,
    /// RESPONSE with any other code.
    UnknownResponse,
    /// ERROR/RESP_BAD_PACKET: the device saw a bad magic number.
    ErrorBadPacket,
    /// ERROR/RESP_BAD_CHECKSUM.
    ErrorBadChecksum,
    /// ERROR/RESP_BAD_COMMAND.
    ErrorBadCommand,
    /// ERROR/RESP_BAD_RESPONSE.
    ErrorBadResponse,
    /// ERROR with any other code.
    ErrorUnknown,
    /// MESSAGE packet carrying free text.
    TextMessage,
    /// HELLO or a packet type outside the vocabulary.
    Unexpected,
}

/// Classify a packet by type and command.
///
/// Total over every `(packet_type, command)` pair; never fails.
pub fn classify(packet: &Packet) -> Category {
    match packet.packet_type {
        PacketType::Command => Category::CommandEcho,
        PacketType::Response => match ResponseKind::from_u8(packet.command) {
            Some(ResponseKind::Ok) => Category::AckOk,
            Some(ResponseKind::Status) => Category::StatusReport,
            Some(ResponseKind::Color) => Category::ColorReport,
            _ => Category::UnknownResponse,
        },
        PacketType::Error => match ResponseKind::from_u8(packet.command) {
            Some(ResponseKind::BadPacket) => Category::ErrorBadPacket,
            Some(ResponseKind::BadChecksum) => Category::ErrorBadChecksum,
            Some(ResponseKind::BadCommand) => Category::ErrorBadCommand,
            Some(ResponseKind::BadResponse) => Category::ErrorBadResponse,
            _ => Category::ErrorUnknown,
        },
        PacketType::Message => Category::TextMessage,
        PacketType::Hello | PacketType::Unknown(_) => Category::Unexpected,
    }
}
