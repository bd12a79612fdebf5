//! Structured reports for classified packets.
//!
//! A [`Report`] is what the host shows the operator for one inbound
//! packet. `Display` gives the console text, `Serialize` gives JSON.

use std::fmt;

use serde::Serialize;

use super::category::{classify, Category};
use crate::error::FramingError;
use crate::protocol::{Packet, PacketType, PAYLOAD_PARAMS_COUNT};

/// Labels for the status counters, in param order.
pub const STATUS_LABELS: [&str; PAYLOAD_PARAMS_COUNT] = [
    "Left Forward Ticks",
    "Right Forward Ticks",
    "Left Reverse Ticks",
    "Right Reverse Ticks",
    "Left Forward Ticks Turns",
    "Right Forward Ticks Turns",
    "Left Reverse Ticks Turns",
    "Right Reverse Ticks Turns",
    "Forward Distance",
    "Reverse Distance",
];

/// Reference (R, G, B) frequencies for a red target.
pub const RED_REFERENCE: (u32, u32, u32) = (71, 235, 179);

/// Reference (R, G, B) frequencies for a green target.
pub const GREEN_REFERENCE: (u32, u32, u32) = (59, 51, 54);

/// A reading further than this from both references is no colour.
pub const COLOR_THRESHOLD: f64 = 100.0;

/// Odometry counters from a RESP_STATUS packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCounters {
    pub left_forward_ticks: u32,
    pub right_forward_ticks: u32,
    pub left_reverse_ticks: u32,
    pub right_reverse_ticks: u32,
    pub left_forward_ticks_turns: u32,
    pub right_forward_ticks_turns: u32,
    pub left_reverse_ticks_turns: u32,
    pub right_reverse_ticks_turns: u32,
    pub forward_distance: u32,
    pub reverse_distance: u32,
}

impl StatusCounters {
    /// Read the counters from packet params.
    pub fn from_params(params: &[u32; PAYLOAD_PARAMS_COUNT]) -> Self {
        Self {
            left_forward_ticks: params[0],
            right_forward_ticks: params[1],
            left_reverse_ticks: params[2],
            right_reverse_ticks: params[3],
            left_forward_ticks_turns: params[4],
            right_forward_ticks_turns: params[5],
            left_reverse_ticks_turns: params[6],
            right_reverse_ticks_turns: params[7],
            forward_distance: params[8],
            reverse_distance: params[9],
        }
    }

    /// Counters paired with their labels, in param order.
    pub fn labelled(&self) -> [(&'static str, u32); PAYLOAD_PARAMS_COUNT] {
        let values = [
            self.left_forward_ticks,
            self.right_forward_ticks,
            self.left_reverse_ticks,
            self.right_reverse_ticks,
            self.left_forward_ticks_turns,
            self.right_forward_ticks_turns,
            self.left_reverse_ticks_turns,
            self.right_reverse_ticks_turns,
            self.forward_distance,
            self.reverse_distance,
        ];
        std::array::from_fn(|i| (STATUS_LABELS[i], values[i]))
    }
}

/// Colour decided from a sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectedColor {
    Red,
    Green,
    None,
}

impl fmt::Display for DetectedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectedColor::Red => f.write_str("RED"),
            DetectedColor::Green => f.write_str("GREEN"),
            DetectedColor::None => f.write_str("NO COLOR"),
        }
    }
}

/// Colour sensor frequencies from a RESP_COLOR packet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorReading {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    pub detected: DetectedColor,
}

impl ColorReading {
    /// Build a reading from the first three params and classify it.
    pub fn from_params(params: &[u32; PAYLOAD_PARAMS_COUNT]) -> Self {
        let (red, green, blue) = (params[0], params[1], params[2]);
        Self {
            red,
            green,
            blue,
            detected: nearest_color((red, green, blue)),
        }
    }
}

fn distance(a: (u32, u32, u32), b: (u32, u32, u32)) -> f64 {
    let d = |x: u32, y: u32| {
        let diff = f64::from(x) - f64::from(y);
        diff * diff
    };
    (d(a.0, b.0) + d(a.1, b.1) + d(a.2, b.2)).sqrt()
}

/// Nearest-reference classification of an (R, G, B) reading.
///
/// Ties go to neither colour.
pub fn nearest_color(rgb: (u32, u32, u32)) -> DetectedColor {
    let to_red = distance(rgb, RED_REFERENCE);
    let to_green = distance(rgb, GREEN_REFERENCE);
    if to_red < to_green && to_red < COLOR_THRESHOLD {
        DetectedColor::Red
    } else if to_green < to_red && to_green < COLOR_THRESHOLD {
        DetectedColor::Green
    } else {
        DetectedColor::None
    }
}

/// Operator-facing view of one inbound packet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    /// A COMMAND packet came back; nothing to do.
    CommandEcho { command: u8 },
    /// The device accepted the last command.
    Ack,
    /// Odometry counters.
    Status { counters: StatusCounters },
    /// Colour sensor reading.
    Color { reading: ColorReading },
    /// RESPONSE with a code the host does not know.
    UnknownResponse { code: u8 },
    /// ERROR packet from the device.
    DeviceError { category: Category, code: u8 },
    /// Free text from the device.
    Message { text: String },
    /// HELLO or an unknown packet type.
    Unexpected { packet_type: PacketType, command: u8 },
}

impl Report {
    /// Build the report for a packet.
    pub fn from_packet(packet: &Packet) -> Self {
        let category = classify(packet);
        match category {
            Category::CommandEcho => Report::CommandEcho {
                command: packet.command,
            },
            Category::AckOk => Report::Ack,
            Category::StatusReport => Report::Status {
                counters: StatusCounters::from_params(&packet.params),
            },
            Category::ColorReport => Report::Color {
                reading: ColorReading::from_params(&packet.params),
            },
            Category::UnknownResponse => Report::UnknownResponse {
                code: packet.command,
            },
            Category::ErrorBadPacket
            | Category::ErrorBadChecksum
            | Category::ErrorBadCommand
            | Category::ErrorBadResponse
            | Category::ErrorUnknown => Report::DeviceError {
                category,
                code: packet.command,
            },
            Category::TextMessage => Report::Message {
                text: packet.text(),
            },
            Category::Unexpected => Report::Unexpected {
                packet_type: packet.packet_type,
                command: packet.command,
            },
        }
    }

    /// Category this report was built from.
    pub fn category(&self) -> Category {
        match self {
            Report::CommandEcho { .. } => Category::CommandEcho,
            Report::Ack => Category::AckOk,
            Report::Status { .. } => Category::StatusReport,
            Report::Color { .. } => Category::ColorReport,
            Report::UnknownResponse { .. } => Category::UnknownResponse,
            Report::DeviceError { category, .. } => *category,
            Report::Message { .. } => Category::TextMessage,
            Report::Unexpected { .. } => Category::Unexpected,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::CommandEcho { command } => {
                write!(f, "Ignoring COMMAND packet (code {command})")
            }
            Report::Ack => f.write_str("Command OK"),
            Report::Status { counters } => {
                writeln!(f, "\n ------- ALEX STATUS REPORT ------- \n")?;
                for (label, value) in counters.labelled() {
                    // Labels under 24 columns get a second tab so values line up.
                    let tabs = if label.len() + 1 < 24 { "\t\t" } else { "\t" };
                    writeln!(f, "{label}:{tabs}{value}")?;
                }
                write!(f, "\n---------------------------------------\n")
            }
            Report::Color { reading } => {
                writeln!(f, "\n --------- ALEX COLOR SENSOR --------- \n")?;
                writeln!(f, "Red (R) frequency:\t{}", reading.red)?;
                writeln!(f, "Green (G) frequency:\t{}", reading.green)?;
                writeln!(f, "Blue (B) frequency:\t{}", reading.blue)?;
                write!(f, "Detected Color: {}", reading.detected)
            }
            Report::UnknownResponse { .. } => f.write_str("Arduino is confused"),
            Report::DeviceError { category, .. } => f.write_str(match category {
                Category::ErrorBadPacket => "Arduino received bad magic number",
                Category::ErrorBadChecksum => "Arduino received bad checksum",
                Category::ErrorBadCommand => "Arduino received bad command",
                Category::ErrorBadResponse => "Arduino received unexpected response",
                _ => "Arduino reports a weird error",
            }),
            Report::Message { text } => write!(f, "Message from Alex: {text}"),
            Report::Unexpected {
                packet_type,
                command,
            } => write!(f, "Unexpected {packet_type} packet (code {command})"),
        }
    }
}

/// Console text for a frame rejected on this side of the link.
pub fn describe_rejection(err: &FramingError) -> &'static str {
    match err {
        FramingError::BadPacket => "ERROR: Bad Magic Number",
        FramingError::BadChecksum => "ERROR: Bad checksum",
    }
}
