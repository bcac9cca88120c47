//! USB HID keyboard usages and the boot-protocol keyboard report.
//!
//! Reference: USB HID Usage Tables 1.3, Section 10 (Keyboard/Keypad page 0x07).
//!
//! # What is a HID keyboard report? (for beginners)
//!
//! A USB keyboard does not send characters.  It sends an 8-byte *report*
//! describing which keys are held down right now:
//!
//! ```text
//! [modifiers] [reserved] [key0] [key1] [key2] [key3] [key4] [key5]
//! ```
//!
//! The modifier byte is a bit mask (Ctrl, Shift, Alt, GUI for each side),
//! and up to six other keys are listed by their *Usage ID*.  Usage IDs are
//! physical key positions: 0x04 is the key labelled "A" on a US keyboard,
//! whatever character the host's layout maps it to.  Releasing every key is
//! a report with all zeroes.
//!
//! Unifying keyboards carry the same modifier byte and six key bytes inside
//! their radio frames, which is why a forged frame can be built from a
//! [`HidKeyboardReport`] directly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of simultaneously pressed non-modifier keys in a report.
pub const MAX_REPORT_KEYS: usize = 6;

/// USB HID Usage ID for keyboard keys (page 0x07).
///
/// Modifier keys are not listed here; they travel in [`HidModifiers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HidKeyCode {
    // Letters (HID 0x04–0x1D)
    KeyA = 0x04,
    KeyB = 0x05,
    KeyC = 0x06,
    KeyD = 0x07,
    KeyE = 0x08,
    KeyF = 0x09,
    KeyG = 0x0A,
    KeyH = 0x0B,
    KeyI = 0x0C,
    KeyJ = 0x0D,
    KeyK = 0x0E,
    KeyL = 0x0F,
    KeyM = 0x10,
    KeyN = 0x11,
    KeyO = 0x12,
    KeyP = 0x13,
    KeyQ = 0x14,
    KeyR = 0x15,
    KeyS = 0x16,
    KeyT = 0x17,
    KeyU = 0x18,
    KeyV = 0x19,
    KeyW = 0x1A,
    KeyX = 0x1B,
    KeyY = 0x1C,
    KeyZ = 0x1D,

    // Digits (HID 0x1E–0x27)
    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,

    // Whitespace and punctuation (HID 0x28–0x38)
    Enter = 0x28,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    BracketLeft = 0x2F,
    BracketRight = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Backquote = 0x35,
    Comma = 0x36,
    Period = 0x37,
    Slash = 0x38,
}

impl HidKeyCode {
    /// Returns the raw USB HID Usage ID value for this key code.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Modifier byte of a HID keyboard report, in USB bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HidModifiers(pub u8);

impl HidModifiers {
    pub const LEFT_CTRL: u8 = 1 << 0;
    pub const LEFT_SHIFT: u8 = 1 << 1;
    pub const LEFT_ALT: u8 = 1 << 2;
    pub const LEFT_GUI: u8 = 1 << 3;
    pub const RIGHT_CTRL: u8 = 1 << 4;
    pub const RIGHT_SHIFT: u8 = 1 << 5;
    pub const RIGHT_ALT: u8 = 1 << 6;
    pub const RIGHT_GUI: u8 = 1 << 7;

    /// No modifier held.
    pub const NONE: HidModifiers = HidModifiers(0);
}

/// Errors building a [`HidKeyboardReport`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("a keyboard report holds at most {MAX_REPORT_KEYS} keys, got {0}")]
    TooManyKeys(usize),
}

/// Snapshot of the keys held down, as a boot-protocol keyboard sends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HidKeyboardReport {
    pub modifiers: HidModifiers,
    /// Usage IDs of held keys; unused positions are zero.
    pub keys: [u8; MAX_REPORT_KEYS],
}

impl HidKeyboardReport {
    /// The all-keys-released report.
    pub fn release() -> Self {
        Self::default()
    }

    /// Report with `modifiers` and a single key held.
    pub fn single(modifiers: HidModifiers, key: HidKeyCode) -> Self {
        let mut keys = [0u8; MAX_REPORT_KEYS];
        keys[0] = key.as_u8();
        Self { modifiers, keys }
    }

    /// Report with `modifiers` and the given keys held, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::TooManyKeys`] if more than six keys are given.
    pub fn from_keys(modifiers: HidModifiers, pressed: &[HidKeyCode]) -> Result<Self, ReportError> {
        if pressed.len() > MAX_REPORT_KEYS {
            return Err(ReportError::TooManyKeys(pressed.len()));
        }
        let mut keys = [0u8; MAX_REPORT_KEYS];
        for (slot, key) in keys.iter_mut().zip(pressed) {
            *slot = key.as_u8();
        }
        Ok(Self { modifiers, keys })
    }

    /// Returns `true` if no key and no modifier is held.
    pub fn is_release(&self) -> bool {
        *self == Self::release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes_match_usage_table() {
        assert_eq!(HidKeyCode::KeyA.as_u8(), 0x04);
        assert_eq!(HidKeyCode::KeyZ.as_u8(), 0x1D);
        assert_eq!(HidKeyCode::Digit0.as_u8(), 0x27);
        assert_eq!(HidKeyCode::Enter.as_u8(), 0x28);
        assert_eq!(HidKeyCode::Slash.as_u8(), 0x38);
        assert_eq!(HidKeyCode::Tab.as_u8(), 0x2B);
    }

    #[test]
    fn test_from_keys_fills_in_order() {
        // Arrange
        let pressed = [HidKeyCode::KeyH, HidKeyCode::KeyI];

        // Act
        let report = HidKeyboardReport::from_keys(HidModifiers::NONE, &pressed).unwrap();

        // Assert
        assert_eq!(report.keys, [0x0B, 0x0C, 0, 0, 0, 0]);
        assert!(!report.is_release());
    }

    #[test]
    fn test_from_keys_rejects_seven_keys() {
        let pressed = [HidKeyCode::KeyA; 7];
        assert_eq!(
            HidKeyboardReport::from_keys(HidModifiers::NONE, &pressed),
            Err(ReportError::TooManyKeys(7))
        );
    }

    #[test]
    fn test_release_report_is_all_zero() {
        let report = HidKeyboardReport::release();
        assert_eq!(report.modifiers, HidModifiers::NONE);
        assert_eq!(report.keys, [0; MAX_REPORT_KEYS]);
        assert!(report.is_release());
    }
}
