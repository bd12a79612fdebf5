//! Fixed-length raw frame.
//!
//! A [`Frame`] can only exist with exactly [`COMMS_PACKET_SIZE`] bytes;
//! partial reads never reach the codec.
//!
//! # Example
//!
//! ```
//! use alex_link::protocol::{Frame, COMMS_PACKET_SIZE};
//!
//! let bytes = vec![0u8; COMMS_PACKET_SIZE];
//! let frame = Frame::try_from(&bytes[..]).unwrap();
//! assert_eq!(frame.as_bytes().len(), COMMS_PACKET_SIZE);
//!
//! assert!(Frame::try_from(&bytes[..10]).is_err());
//! ```

use super::wire_format::{
    CHECKSUM_OFFSET, CHECKSUM_SIZE, COMMS_PACKET_SIZE, MAGIC_SIZE, PAYLOAD_OFFSET,
};
use crate::error::LinkError;

/// A complete frame as it crosses the transport.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; COMMS_PACKET_SIZE]);

impl Frame {
    /// Wrap a full buffer.
    #[inline]
    pub fn new(bytes: [u8; COMMS_PACKET_SIZE]) -> Self {
        Self(bytes)
    }

    /// All frame bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; COMMS_PACKET_SIZE] {
        &self.0
    }

    /// Magic number field.
    #[inline]
    pub fn magic(&self) -> &[u8] {
        &self.0[..MAGIC_SIZE]
    }

    /// Payload bytes covered by the checksum.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.0[PAYLOAD_OFFSET..CHECKSUM_OFFSET]
    }

    /// Transmitted checksum.
    #[inline]
    pub fn checksum(&self) -> u16 {
        u16::from_le_bytes([self.0[CHECKSUM_OFFSET], self.0[CHECKSUM_OFFSET + 1]])
    }

    /// Consume the frame, returning the raw bytes.
    #[inline]
    pub fn into_bytes(self) -> [u8; COMMS_PACKET_SIZE] {
        self.0
    }
}

impl TryFrom<&[u8]> for Frame {
    type Error = LinkError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; COMMS_PACKET_SIZE] = bytes.try_into().map_err(|_| {
            LinkError::Protocol(format!(
                "frame must be exactly {} bytes, got {}",
                COMMS_PACKET_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("magic", &self.magic())
            .field("payload_len", &self.payload().len())
            .field("checksum", &format_args!("{:#06x}", self.checksum()))
            .finish()
    }
}

const _: () = assert!(CHECKSUM_OFFSET + CHECKSUM_SIZE == COMMS_PACKET_SIZE);
