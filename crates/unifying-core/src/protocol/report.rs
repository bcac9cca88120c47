//! Unifying RF report-type taxonomy.
//!
//! Every non-empty Unifying frame carries a report-type byte at offset 1.
//! The low five bits select the report type, the upper bits are flags:
//!
//! ```text
//!   bit 7      bit 6        bits 4..0
//! [unknown] [keep-alive] [report type]
//! ```
//!
//! | Report type            | Tag  |
//! |------------------------|------|
//! | Plain keyboard         | 0x01 |
//! | Plain mouse            | 0x02 |
//! | Plain multimedia       | 0x03 |
//! | Plain system control   | 0x04 |
//! | Keyboard LED           | 0x0E |
//! | Set keep-alive         | 0x0F |
//! | HID++ short            | 0x10 |
//! | HID++ long             | 0x11 |
//! | Encrypted keyboard     | 0x13 |
//! | Pairing                | 0x1F |
//!
//! Tags outside this table map to [`ReportType::Invalid`].

use serde::{Deserialize, Serialize};

/// Offset of the report-type byte inside a frame payload.
pub const REPORT_TYPE_OFFSET: usize = 1;

/// Mask selecting the report-type tag from the report-type byte.
pub const REPORT_TYPE_MASK: u8 = 0x1F;

/// Flag bit set on frames that also act as a keep-alive.
pub const REPORT_BIT_KEEP_ALIVE: u8 = 0x40;

/// Flag bit of unknown meaning, set by genuine keyboards on plain reports.
pub const REPORT_BIT_UNKNOWN: u8 = 0x80;

/// Tag of the encrypted-keyboard family used by bare keep-alive frames.
pub const KEEP_ALIVE_FAMILY_TAG: u8 = 0x00;

/// Length of a bare keep-alive frame (`00 40 xx xx cs`).
pub const KEEP_ALIVE_FRAME_LEN: usize = 5;

/// Closed set of report types a frame can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ReportType {
    PlainKeyboard = 0x01,
    PlainMouse = 0x02,
    PlainMultimedia = 0x03,
    PlainSystemControl = 0x04,
    Led = 0x0E,
    SetKeepAlive = 0x0F,
    HidppShort = 0x10,
    HidppLong = 0x11,
    EncryptedKeyboard = 0x13,
    Pairing = 0x1F,
    /// Any tag not listed above.
    Invalid = 0xFF,
}

impl ReportType {
    /// Number of distinct report types, and therefore of per-type counters.
    pub const COUNT: usize = 11;

    /// All report types in counter-index order.
    pub const ALL: [ReportType; Self::COUNT] = [
        ReportType::EncryptedKeyboard,
        ReportType::HidppLong,
        ReportType::HidppShort,
        ReportType::Led,
        ReportType::Pairing,
        ReportType::PlainKeyboard,
        ReportType::PlainMouse,
        ReportType::PlainMultimedia,
        ReportType::PlainSystemControl,
        ReportType::SetKeepAlive,
        ReportType::Invalid,
    ];

    /// Maps a masked report-type tag to a [`ReportType`].
    ///
    /// Unassigned tags map to [`ReportType::Invalid`].
    pub fn from_tag(tag: u8) -> Self {
        match tag & REPORT_TYPE_MASK {
            0x01 => ReportType::PlainKeyboard,
            0x02 => ReportType::PlainMouse,
            0x03 => ReportType::PlainMultimedia,
            0x04 => ReportType::PlainSystemControl,
            0x0E => ReportType::Led,
            0x0F => ReportType::SetKeepAlive,
            0x10 => ReportType::HidppShort,
            0x11 => ReportType::HidppLong,
            0x13 => ReportType::EncryptedKeyboard,
            0x1F => ReportType::Pairing,
            _ => ReportType::Invalid,
        }
    }

    /// Returns the on-air tag, or `None` for [`ReportType::Invalid`].
    pub fn tag(self) -> Option<u8> {
        match self {
            ReportType::Invalid => None,
            other => Some(other as u8),
        }
    }

    /// Index of this type's bucket in [`crate::FrameCounters::typed`].
    pub fn counter_index(self) -> usize {
        match self {
            ReportType::EncryptedKeyboard => 0,
            ReportType::HidppLong => 1,
            ReportType::HidppShort => 2,
            ReportType::Led => 3,
            ReportType::Pairing => 4,
            ReportType::PlainKeyboard => 5,
            ReportType::PlainMouse => 6,
            ReportType::PlainMultimedia => 7,
            ReportType::PlainSystemControl => 8,
            ReportType::SetKeepAlive => 9,
            ReportType::Invalid => 10,
        }
    }

    /// Exact payload length a frame of this type must have, if the type
    /// enforces one.
    pub fn required_len(self) -> Option<usize> {
        match self {
            ReportType::EncryptedKeyboard | ReportType::HidppLong => Some(22),
            ReportType::HidppShort
            | ReportType::Led
            | ReportType::PlainMouse
            | ReportType::SetKeepAlive => Some(10),
            ReportType::Pairing
            | ReportType::PlainKeyboard
            | ReportType::PlainMultimedia
            | ReportType::PlainSystemControl
            | ReportType::Invalid => None,
        }
    }

    /// Short human-readable name used in logs and listings.
    pub fn name(self) -> &'static str {
        match self {
            ReportType::EncryptedKeyboard => "encrypted-keyboard",
            ReportType::HidppLong => "hidpp-long",
            ReportType::HidppShort => "hidpp-short",
            ReportType::Led => "led",
            ReportType::Pairing => "pairing",
            ReportType::PlainKeyboard => "plain-keyboard",
            ReportType::PlainMouse => "plain-mouse",
            ReportType::PlainMultimedia => "plain-multimedia",
            ReportType::PlainSystemControl => "plain-system-control",
            ReportType::SetKeepAlive => "set-keep-alive",
            ReportType::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
