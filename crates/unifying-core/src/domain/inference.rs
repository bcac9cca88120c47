//! Capability inference engine.
//!
//! Turns a stream of frames for one endpoint into accumulated knowledge
//! about that endpoint: which report types it sends, whether it speaks the
//! Unifying protocol, whether its link is encrypted, and whether it has
//! been seen accepting plaintext keystrokes.
//!
//! # Evidence threshold (for beginners)
//!
//! On an open radio channel most of what a sniffer picks up is noise.  A
//! single frame that happens to look like a HID++ report proves nothing, so
//! most capabilities are only promoted once the same report type has been
//! counted more than [`HYSTERESIS_THRESHOLD`] times.  A frame that carries
//! a valid Unifying checksum is strong evidence on its own and promotes
//! immediately.
//!
//! LED reports, multimedia and system-control reports promote on every
//! frame that passes the length check.  Pairing, set-keep-alive and unknown
//! reports are only counted.
//!
//! Promoted bits are never cleared.

use tracing::{debug, info};

use crate::domain::device::{Capabilities, DeviceCaps, DeviceRecord, ReportTypes};
use crate::protocol::checksum::validate_checksum;
use crate::protocol::classify::classify;
use crate::protocol::frame::Frame;
use crate::protocol::report::ReportType;

/// A report type's counter must exceed this value before it promotes a
/// capability without checksum evidence.
pub const HYSTERESIS_THRESHOLD: u32 = 2;

/// What the inference engine did with one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Empty frame (link-layer acknowledgement) or unknown prefix index.
    Ignored,
    /// Bare protocol keep-alive.
    KeepAlive,
    /// Frame was counted under this report type.
    Counted(ReportType),
    /// Frame failed its type's length check.  It still counts towards
    /// `overall` and the checksum hits, but not towards its type.
    Malformed {
        report_type: ReportType,
        expected: usize,
        actual: usize,
    },
}

/// Capability changes a report type triggers once promoted.
struct Promotion {
    caps: u8,
    report_types: u8,
    plain_injectable: bool,
    logitech: bool,
}

impl Promotion {
    const NONE: Promotion = Promotion {
        caps: 0,
        report_types: 0,
        plain_injectable: false,
        logitech: false,
    };

    fn apply(&self, caps: &mut Capabilities) {
        caps.add_caps(self.caps);
        caps.add_report_types(self.report_types);
        if self.plain_injectable {
            caps.mark_plain_injectable();
        }
    }
}

/// How a report type earns its promotion.
enum Rule {
    /// Only counted, never promotes.
    CountOnly,
    /// Promotes on every counted frame.
    Always(Promotion),
    /// Promotes past the threshold or on a valid checksum.
    Hysteresis(Promotion),
}

fn rule_for(report_type: ReportType) -> Rule {
    match report_type {
        ReportType::EncryptedKeyboard => Rule::Hysteresis(Promotion {
            caps: DeviceCaps::UNIFYING_COMPATIBLE | DeviceCaps::LINK_ENCRYPTION,
            report_types: ReportTypes::KEYBOARD,
            plain_injectable: false,
            logitech: true,
        }),
        ReportType::HidppLong => Rule::Hysteresis(Promotion {
            caps: DeviceCaps::UNIFYING_COMPATIBLE,
            report_types: ReportTypes::LONG_HIDPP,
            plain_injectable: false,
            logitech: true,
        }),
        ReportType::HidppShort => Rule::Hysteresis(Promotion {
            caps: DeviceCaps::UNIFYING_COMPATIBLE,
            report_types: ReportTypes::SHORT_HIDPP,
            plain_injectable: false,
            logitech: true,
        }),
        ReportType::PlainKeyboard => Rule::Hysteresis(Promotion {
            caps: 0,
            report_types: ReportTypes::KEYBOARD,
            plain_injectable: true,
            logitech: true,
        }),
        ReportType::PlainMouse => Rule::Hysteresis(Promotion {
            caps: 0,
            report_types: ReportTypes::MOUSE,
            plain_injectable: false,
            logitech: true,
        }),
        ReportType::Led => Rule::Always(Promotion {
            report_types: ReportTypes::KEYBOARD_LED | ReportTypes::KEYBOARD,
            ..Promotion::NONE
        }),
        ReportType::PlainMultimedia => Rule::Always(Promotion {
            report_types: ReportTypes::MULTIMEDIA,
            ..Promotion::NONE
        }),
        ReportType::PlainSystemControl => Rule::Always(Promotion {
            report_types: ReportTypes::POWER_KEYS,
            ..Promotion::NONE
        }),
        ReportType::Pairing | ReportType::SetKeepAlive | ReportType::Invalid => Rule::CountOnly,
    }
}

impl DeviceRecord {
    /// Feeds one frame received on the endpoint at `prefix_index`.
    ///
    /// Steps, in order:
    ///
    /// 1. Empty frames are ignored.
    /// 2. `overall` is incremented; a valid checksum marks the device as
    ///    Logitech and bumps the checksum counter.
    /// 3. A bare keep-alive marks the device as Logitech and stops.
    /// 4. A frame whose type enforces a length and does not match it is
    ///    reported as [`Observation::Malformed`]; its type counter and the
    ///    capabilities stay untouched.
    /// 5. The type's counter is incremented and its promotion rule applied.
    pub fn observe(&mut self, prefix_index: usize, frame: &Frame) -> Observation {
        if frame.is_empty() {
            return Observation::Ignored;
        }
        let base = self.base();

        let payload = frame.as_bytes();
        let class = classify(payload);
        let keep_alive = class.is_keep_alive_frame();
        let checksum_valid = validate_checksum(payload);
        let mut logitech = checksum_valid || keep_alive;

        let Some(endpoint) = self.endpoint_mut(prefix_index) else {
            return Observation::Ignored;
        };
        let prefix = endpoint.prefix;
        let before = endpoint.capabilities;

        endpoint.counters.record_frame();
        if checksum_valid {
            endpoint.counters.record_checksum_hit();
        }

        let wrong_len = class
            .report_type
            .required_len()
            .filter(|&expected| expected != class.len);

        let observation = if keep_alive {
            Observation::KeepAlive
        } else if let Some(expected) = wrong_len {
            debug!(
                %base,
                prefix = format_args!("{prefix:02X}"),
                report_type = %class.report_type,
                expected,
                actual = class.len,
                "wrong length, report type not counted"
            );
            Observation::Malformed {
                report_type: class.report_type,
                expected,
                actual: class.len,
            }
        } else {
            let count = endpoint.counters.record_typed(class.report_type);
            match rule_for(class.report_type) {
                Rule::CountOnly => {}
                Rule::Always(promotion) => promotion.apply(&mut endpoint.capabilities),
                Rule::Hysteresis(promotion) => {
                    if count > HYSTERESIS_THRESHOLD || checksum_valid {
                        promotion.apply(&mut endpoint.capabilities);
                        logitech |= promotion.logitech;
                    }
                }
            }
            Observation::Counted(class.report_type)
        };

        let after = endpoint.capabilities;
        if after != before {
            info!(
                %base,
                prefix = format_args!("{prefix:02X}"),
                report_types = %after.report_types(),
                caps = %after.caps(),
                plain_injection = after.vuln_plain_injection(),
                "capabilities promoted"
            );
        }
        if logitech && !self.is_logitech() {
            self.mark_logitech();
            info!(%base, "device identified as Logitech");
        }

        debug!(
            %base,
            prefix = format_args!("{prefix:02X}"),
            report_type = %class.report_type,
            checksum_valid,
            ?observation,
            "frame observed"
        );
        observation
    }
}
