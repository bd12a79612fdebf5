//! Wire format constants and integrity check.
//!
//! Every frame on the link has the same fixed length:
//! ```text
//! ┌──────────┬──────┬─────────┬────────────┬──────────┬──────────┐
//! │ Magic    │ Type │ Command │ Params     │ Data     │ Checksum │
//! │ 4 bytes  │ u8   │ u8      │ 10 x u32 LE│ 32 bytes │ u16 LE   │
//! │ u32 LE   │      │         │            │          │          │
//! └──────────┴──────┴─────────┴────────────┴──────────┴──────────┘
//! ```
//!
//! The checksum is CRC-16/CCITT-FALSE over the payload (type through
//! data). The magic number is not covered by it: the two checks are
//! independent and produce distinct verdicts.

/// Magic number that opens every frame.
pub const COMMS_MAGIC_NUMBER: u32 = 0xFCFD_FEFF;

/// Size of the magic number field.
pub const MAGIC_SIZE: usize = 4;

/// Number of integer params carried by every packet.
pub const PAYLOAD_PARAMS_COUNT: usize = 10;

/// Size of the free-text data field.
pub const PAYLOAD_DATA_SIZE: usize = 32;

/// Size of the encoded packet (type + command + params + data).
pub const PAYLOAD_PACKET_SIZE: usize = 1 + 1 + PAYLOAD_PARAMS_COUNT * 4 + PAYLOAD_DATA_SIZE;

/// Size of the trailing checksum field.
pub const CHECKSUM_SIZE: usize = 2;

/// Total frame length, shared by both ends of the link.
pub const COMMS_PACKET_SIZE: usize = MAGIC_SIZE + PAYLOAD_PACKET_SIZE + CHECKSUM_SIZE;

/// Offset of the packet payload inside a frame.
pub const PAYLOAD_OFFSET: usize = MAGIC_SIZE;

/// Offset of the checksum inside a frame.
pub const CHECKSUM_OFFSET: usize = PAYLOAD_OFFSET + PAYLOAD_PACKET_SIZE;

/// CRC-16/CCITT-FALSE (poly 0x1021, init 0xFFFF).
///
/// # Example
///
/// ```
/// use alex_link::protocol::checksum;
///
/// assert_eq!(checksum(b"123456789"), 0x29B1);
/// ```
pub fn checksum(bytes: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &b in bytes {
        crc ^= (b as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_is_exactly_80() {
        assert_eq!(PAYLOAD_PACKET_SIZE, 74);
        assert_eq!(COMMS_PACKET_SIZE, 80);
        assert_eq!(CHECKSUM_OFFSET + CHECKSUM_SIZE, COMMS_PACKET_SIZE);
    }

    #[test]
    fn test_checksum_check_value() {
        assert_eq!(checksum(b"123456789"), 0x29B1);
        assert_eq!(checksum(&[]), 0xFFFF);
    }

    #[test]
    fn test_checksum_is_position_sensitive() {
        assert_ne!(checksum(&[1, 2, 3, 4]), checksum(&[2, 1, 3, 4]));
    }

    #[test]
    fn test_checksum_catches_every_single_byte_change() {
        let base = [0u8; PAYLOAD_PACKET_SIZE];
        let reference = checksum(&base);
        for pos in 0..PAYLOAD_PACKET_SIZE {
            for value in 1..=255u8 {
                let mut corrupted = base;
                corrupted[pos] = value;
                assert_ne!(checksum(&corrupted), reference, "pos {pos} value {value}");
            }
        }
    }
}
