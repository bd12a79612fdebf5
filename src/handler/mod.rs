//! Handler module - interpreting inbound packets.
//!
//! Provides:
//! - [`classify`] - total mapping from packet to [`Category`]
//! - [`Report`] - operator-facing view of a packet (text or JSON)
//! - [`describe_rejection`] - text for frames rejected locally
//!
//! # Example
//!
//! ```
//! use alex_link::handler::{classify, Category, Report};
//! use alex_link::protocol::{Packet, ResponseKind};
//!
//! let packet = Packet::response(ResponseKind::Ok, &[]).unwrap();
//! assert_eq!(classify(&packet), Category::AckOk);
//! assert_eq!(Report::from_packet(&packet).to_string(), "Command OK");
//! ```

mod category;
mod report;

pub use category::{classify, Category};
pub use report::{
    describe_rejection, nearest_color, ColorReading, DetectedColor, Report, StatusCounters,
    COLOR_THRESHOLD, GREEN_REFERENCE, RED_REFERENCE, STATUS_LABELS,
};
