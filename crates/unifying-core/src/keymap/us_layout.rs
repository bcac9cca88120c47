//! US keyboard layout: which key (and whether Shift) produces a character.
//!
//! Used to turn text into a sequence of keyboard reports for injection.
//! Only printable ASCII, newline and tab are mapped.

use crate::keymap::hid::{HidKeyCode, HidKeyboardReport, HidModifiers};

/// Returns the key producing `c` on a US layout and whether Shift is needed.
pub fn char_to_key(c: char) -> Option<(HidKeyCode, bool)> {
    use HidKeyCode::*;

    if c.is_ascii_lowercase() {
        return letter_key(c).map(|k| (k, false));
    }
    if c.is_ascii_uppercase() {
        return letter_key(c.to_ascii_lowercase()).map(|k| (k, true));
    }

    let mapped = match c {
        '1' => (Digit1, false),
        '2' => (Digit2, false),
        '3' => (Digit3, false),
        '4' => (Digit4, false),
        '5' => (Digit5, false),
        '6' => (Digit6, false),
        '7' => (Digit7, false),
        '8' => (Digit8, false),
        '9' => (Digit9, false),
        '0' => (Digit0, false),
        '!' => (Digit1, true),
        '@' => (Digit2, true),
        '#' => (Digit3, true),
        '$' => (Digit4, true),
        '%' => (Digit5, true),
        '^' => (Digit6, true),
        '&' => (Digit7, true),
        '*' => (Digit8, true),
        '(' => (Digit9, true),
        ')' => (Digit0, true),
        '\n' => (Enter, false),
        '\t' => (Tab, false),
        ' ' => (Space, false),
        '-' => (Minus, false),
        '_' => (Minus, true),
        '=' => (Equal, false),
        '+' => (Equal, true),
        '[' => (BracketLeft, false),
        '{' => (BracketLeft, true),
        ']' => (BracketRight, false),
        '}' => (BracketRight, true),
        '\\' => (Backslash, false),
        '|' => (Backslash, true),
        ';' => (Semicolon, false),
        ':' => (Semicolon, true),
        '\'' => (Quote, false),
        '"' => (Quote, true),
        '`' => (Backquote, false),
        '~' => (Backquote, true),
        ',' => (Comma, false),
        '<' => (Comma, true),
        '.' => (Period, false),
        '>' => (Period, true),
        '/' => (Slash, false),
        '?' => (Slash, true),
        _ => return None,
    };
    Some(mapped)
}

/// Key-press report typing `c`, or `None` if the character has no mapping.
pub fn report_for_char(c: char) -> Option<HidKeyboardReport> {
    char_to_key(c).map(|(key, shift)| {
        let modifiers = if shift {
            HidModifiers(HidModifiers::LEFT_SHIFT)
        } else {
            HidModifiers::NONE
        };
        HidKeyboardReport::single(modifiers, key)
    })
}

fn letter_key(c: char) -> Option<HidKeyCode> {
    use HidKeyCode::*;
    const LETTERS: [HidKeyCode; 26] = [
        KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM, KeyN,
        KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
    ];
    let offset = (c as u32).checked_sub('a' as u32)?;
    LETTERS.get(offset as usize).copied()
}
