//! Fixed-capacity radio frame buffer.
//!
//! Enhanced ShockBurst payloads are at most 32 bytes, so a frame is stored
//! inline as a 32-byte array plus a length.  Frames can be copied freely and
//! never allocate.

use thiserror::Error;

/// Maximum payload length of a single Enhanced ShockBurst frame.
pub const MAX_PAYLOAD_LEN: usize = 32;

/// Errors raised when building a [`Frame`] from raw bytes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The payload does not fit into a single radio frame.
    #[error("payload of {len} bytes exceeds the {max}-byte frame limit")]
    TooLong { len: usize, max: usize },

    /// The textual payload is not valid hexadecimal.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// A single radio payload (received or about to be transmitted).
///
/// A zero-length frame is a link-layer acknowledgement.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    data: [u8; MAX_PAYLOAD_LEN],
    len: u8,
}

impl Frame {
    /// Returns an empty frame (acknowledgement).
    pub const fn empty() -> Self {
        Self {
            data: [0u8; MAX_PAYLOAD_LEN],
            len: 0,
        }
    }

    /// Returns a zero-filled frame of `len` bytes.
    ///
    /// `len` is clamped to [`MAX_PAYLOAD_LEN`].
    pub fn zeroed(len: usize) -> Self {
        Self {
            data: [0u8; MAX_PAYLOAD_LEN],
            len: len.min(MAX_PAYLOAD_LEN) as u8,
        }
    }

    /// Copies `payload` into a new frame.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::TooLong`] if `payload` exceeds [`MAX_PAYLOAD_LEN`].
    pub fn new(payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(FrameError::TooLong {
                len: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }
        let mut data = [0u8; MAX_PAYLOAD_LEN];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            data,
            len: payload.len() as u8,
        })
    }

    /// Parses a frame from a hex string such as `"00C10004000000000000003B"`.
    ///
    /// Whitespace and `:` separators are ignored.  An empty string yields an
    /// empty frame.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Malformed`] for odd digit counts or non-hex
    /// characters and [`FrameError::TooLong`] for oversize payloads.
    pub fn from_hex(text: &str) -> Result<Self, FrameError> {
        let digits: Vec<u8> = text
            .bytes()
            .filter(|b| !b.is_ascii_whitespace() && *b != b':')
            .collect();
        if digits.len() % 2 != 0 {
            return Err(FrameError::Malformed(format!(
                "odd number of hex digits ({})",
                digits.len()
            )));
        }
        let byte_len = digits.len() / 2;
        if byte_len > MAX_PAYLOAD_LEN {
            return Err(FrameError::TooLong {
                len: byte_len,
                max: MAX_PAYLOAD_LEN,
            });
        }

        let mut data = [0u8; MAX_PAYLOAD_LEN];
        for (slot, pair) in data.iter_mut().zip(digits.chunks_exact(2)) {
            *slot = (hex_value(pair[0])? << 4) | hex_value(pair[1])?;
        }
        Ok(Self {
            data,
            len: byte_len as u8,
        })
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Returns `true` for acknowledgement frames.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    /// Mutable view of the payload bytes.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let len = self.len();
        &mut self.data[..len]
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({self})")
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, b) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

fn hex_value(digit: u8) -> Result<u8, FrameError> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        other => Err(FrameError::Malformed(format!(
            "invalid hex digit {:?}",
            char::from(other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_copies_payload() {
        let frame = Frame::new(&[0x00, 0x40, 0x04, 0xB0, 0x0C]).unwrap();
        assert_eq!(frame.len(), 5);
        assert_eq!(frame.as_bytes(), &[0x00, 0x40, 0x04, 0xB0, 0x0C]);
    }

    #[test]
    fn test_new_rejects_oversize_payload() {
        let result = Frame::new(&[0u8; MAX_PAYLOAD_LEN + 1]);
        assert_eq!(
            result,
            Err(FrameError::TooLong {
                len: 33,
                max: MAX_PAYLOAD_LEN
            })
        );
    }

    #[test]
    fn test_new_accepts_max_payload() {
        let frame = Frame::new(&[0xAA; MAX_PAYLOAD_LEN]).unwrap();
        assert_eq!(frame.len(), MAX_PAYLOAD_LEN);
    }

    #[test]
    fn test_empty_frame_is_empty() {
        assert!(Frame::empty().is_empty());
        assert!(Frame::default().as_bytes().is_empty());
    }

    #[test]
    fn test_from_hex_parses_with_separators() {
        let frame = Frame::from_hex("00:40 04:b0 0C").unwrap();
        assert_eq!(frame.as_bytes(), &[0x00, 0x40, 0x04, 0xB0, 0x0C]);
    }

    #[test]
    fn test_from_hex_empty_string_is_ack() {
        assert!(Frame::from_hex("").unwrap().is_empty());
    }

    #[test]
    fn test_from_hex_rejects_odd_digit_count() {
        assert!(matches!(Frame::from_hex("0C1"), Err(FrameError::Malformed(_))));
    }

    #[test]
    fn test_from_hex_rejects_non_hex() {
        assert!(matches!(Frame::from_hex("zz"), Err(FrameError::Malformed(_))));
    }

    #[test]
    fn test_display_is_spaced_uppercase_hex() {
        let frame = Frame::new(&[0x00, 0xc1, 0x3b]).unwrap();
        assert_eq!(frame.to_string(), "00 C1 3B");
    }
}
