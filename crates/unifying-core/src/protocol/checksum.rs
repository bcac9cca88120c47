//! Unifying payload checksum.
//!
//! The last byte of every Unifying payload is the two's complement of the
//! sum of all preceding bytes, so a genuine frame sums to zero modulo 256:
//!
//! ```text
//! 00 C1 00 04 00 00 00 00 00 3B
//! 0x00 + 0xC1 + 0x04 + 0x3B = 0x100 -> 0x00
//! ```
//!
//! Random radio noise passes this check with probability 1/256, which is why
//! the inference engine treats a valid checksum as strong but not absolute
//! evidence.

/// Computes the checksum byte for `bytes`.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b))
        .wrapping_neg()
}

/// Returns `true` if the last byte of `payload` is the checksum of the bytes
/// before it.
///
/// Payloads shorter than two bytes never validate.
pub fn validate_checksum(payload: &[u8]) -> bool {
    match payload.split_last() {
        Some((&last, body)) if !body.is_empty() => checksum(body) == last,
        _ => false,
    }
}

/// Overwrites the last byte of `buf` with the checksum of the preceding bytes.
///
/// Does nothing on an empty buffer.
pub fn update_checksum(buf: &mut [u8]) {
    if let Some((last, body)) = buf.split_last_mut() {
        *last = checksum(body);
    }
}
