//! Error types for alex-link.

use thiserror::Error;

use crate::protocol::{PacketType, PAYLOAD_PARAMS_COUNT};

/// Verdict for a complete frame that could not be turned into a packet.
///
/// Both variants are recoverable: the receiver reports them and moves on
/// to the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FramingError {
    /// Magic number mismatch (stream desync or wrong device).
    #[error("bad packet: magic number mismatch")]
    BadPacket,

    /// Payload checksum mismatch (corruption on the line).
    #[error("bad checksum")]
    BadChecksum,
}

/// Main error type for all link operations.
#[derive(Debug, Error)]
pub enum LinkError {
    /// I/O error from the underlying transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port could not be opened or configured.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// JSON error (configuration and JSON reports).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A received frame was rejected.
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// The device did not answer HELLO with RESPONSE/RESP_OK.
    #[error("handshake failed: expected RESPONSE/RESP_OK, observed {}", describe_observed(.observed))]
    HandshakeMismatch {
        /// Packet type actually received, `None` if nothing decodable arrived.
        observed: Option<PacketType>,
    },

    /// More params supplied than a packet can carry.
    #[error("invalid parameter count: {given} (maximum {max})", max = PAYLOAD_PARAMS_COUNT)]
    InvalidParameterCount {
        /// Number of params the caller supplied.
        given: usize,
    },

    /// A blocking operation was stopped through its cancel token.
    #[error("operation cancelled")]
    Cancelled,

    /// Command token not present in the registry.
    #[error("{0} is not a valid command")]
    UnknownCommand(String),

    /// User input that could not be parsed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Protocol misuse (wrong session state, etc.).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),
}

impl LinkError {
    /// True if this error is a cooperative shutdown rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LinkError::Cancelled)
    }
}

fn describe_observed(observed: &Option<PacketType>) -> String {
    match observed {
        Some(packet_type) => format!("packet type {}", packet_type),
        None => "no valid packet".to_string(),
    }
}

/// Result type alias using LinkError.
pub type Result<T> = std::result::Result<T, LinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_mismatch_message() {
        let err = LinkError::HandshakeMismatch {
            observed: Some(PacketType::Error),
        };
        assert!(err.to_string().contains("packet type ERROR"));

        let err = LinkError::HandshakeMismatch { observed: None };
        assert!(err.to_string().contains("no valid packet"));
    }

    #[test]
    fn test_framing_error_converts() {
        let err: LinkError = FramingError::BadChecksum.into();
        assert!(matches!(err, LinkError::Framing(FramingError::BadChecksum)));
        assert!(!err.is_cancelled());
        assert!(LinkError::Cancelled.is_cancelled());
    }

    #[test]
    fn test_invalid_parameter_count_message() {
        let err = LinkError::InvalidParameterCount { given: 11 };
        assert_eq!(
            err.to_string(),
            format!("invalid parameter count: 11 (maximum {})", PAYLOAD_PARAMS_COUNT)
        );
    }
}
