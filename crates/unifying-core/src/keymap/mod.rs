//! Keyboard report model and the text-to-keystroke table used for injection.
//!
//! The canonical representation is USB HID Usage IDs (page 0x07, Keyboard/Keypad),
//! which is what Unifying keyboards put on the air.

pub mod hid;
pub mod us_layout;

pub use hid::{HidKeyCode, HidKeyboardReport, HidModifiers, ReportError, MAX_REPORT_KEYS};
pub use us_layout::{char_to_key, report_for_char};
