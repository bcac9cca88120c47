//! Stateless frame classifier.
//!
//! Reads the report-type byte of a payload and reports which
//! [`ReportType`] it carries and whether the keep-alive flag is set.  The
//! classifier never looks at device state and never panics, whatever bytes
//! an attacker puts on the air.

use crate::protocol::report::{
    ReportType, KEEP_ALIVE_FAMILY_TAG, KEEP_ALIVE_FRAME_LEN, REPORT_BIT_KEEP_ALIVE,
    REPORT_TYPE_MASK, REPORT_TYPE_OFFSET,
};

/// Result of classifying one payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Report type decoded from the header.
    pub report_type: ReportType,
    /// Raw masked tag, kept because tag 0x00 has no [`ReportType`] of its own.
    pub tag: u8,
    /// Whether the keep-alive flag bit is set.
    pub keep_alive: bool,
    /// Payload length the classification was made for.
    pub len: usize,
}

impl Classification {
    /// Returns `true` for a bare protocol keep-alive (`00 40 xx xx cs`).
    ///
    /// A 5-byte frame of the encrypted-keyboard family with the keep-alive
    /// bit set is a keep-alive regardless of any per-type length rule.
    pub fn is_keep_alive_frame(&self) -> bool {
        self.len == KEEP_ALIVE_FRAME_LEN && self.tag == KEEP_ALIVE_FAMILY_TAG && self.keep_alive
    }
}

/// Classifies a raw payload.
///
/// Payloads shorter than two bytes have no report-type byte and classify
/// as [`ReportType::Invalid`] without the keep-alive flag.
pub fn classify(payload: &[u8]) -> Classification {
    match payload.get(REPORT_TYPE_OFFSET) {
        Some(&type_byte) => {
            let tag = type_byte & REPORT_TYPE_MASK;
            Classification {
                report_type: ReportType::from_tag(tag),
                tag,
                keep_alive: type_byte & REPORT_BIT_KEEP_ALIVE != 0,
                len: payload.len(),
            }
        }
        None => Classification {
            report_type: ReportType::Invalid,
            tag: KEEP_ALIVE_FAMILY_TAG,
            keep_alive: false,
            len: payload.len(),
        },
    }
}
