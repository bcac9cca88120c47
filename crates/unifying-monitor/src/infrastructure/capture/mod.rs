//! Capture files: sniffed traffic stored as text, one frame per line.
//!
//! ```text
//! # address          payload
//! DE:AD:BE:EF:07     00 C1 00 04 00 00 00 00 00 3B
//! DE:AD:BE:EF:07     -
//! DE:AD:BE:EF:08     00400 4B00C          # separators inside the payload are ignored
//! ```
//!
//! - `#` starts a comment; blank lines are skipped.
//! - The payload is hex, with optional whitespace or `:` separators.
//! - `-` or a missing payload stands for an empty frame (acknowledgement).
//!
//! Malformed lines are skipped with a warning so a single corrupted line
//! does not throw away a long capture.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;
use unifying_core::{Frame, RadioAddress};

use crate::infrastructure::radio::RadioFrame;

pub mod replay;

/// Error type for capture file operations.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("I/O error reading capture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// A loaded capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capture {
    pub frames: Vec<RadioFrame>,
    /// Number of lines that could not be parsed.
    pub skipped_lines: usize,
}

/// Parses one capture line.  `line_no` is 1-based and only used in errors.
///
/// Returns `Ok(None)` for blank and comment lines.
///
/// # Errors
///
/// Returns [`CaptureError::Parse`] if the address or payload is malformed.
pub fn parse_capture_line(line_no: usize, line: &str) -> Result<Option<RadioFrame>, CaptureError> {
    let content = line.split_once('#').map_or(line, |(before, _)| before).trim();
    if content.is_empty() {
        return Ok(None);
    }

    let (address_text, payload_text) = content
        .split_once(char::is_whitespace)
        .map_or((content, ""), |(a, p)| (a, p.trim()));

    let address: RadioAddress = address_text.parse().map_err(|e| CaptureError::Parse {
        line: line_no,
        reason: format!("bad address {address_text:?}: {e}"),
    })?;

    let payload = if payload_text == "-" {
        Frame::empty()
    } else {
        Frame::from_hex(payload_text).map_err(|e| CaptureError::Parse {
            line: line_no,
            reason: e.to_string(),
        })?
    };

    Ok(Some(RadioFrame::new(address, payload)))
}

/// Parses a whole capture, skipping malformed lines.
pub fn parse_capture(text: &str) -> Capture {
    let mut capture = Capture::default();
    for (index, line) in text.lines().enumerate() {
        match parse_capture_line(index + 1, line) {
            Ok(Some(frame)) => capture.frames.push(frame),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "skipping malformed capture line");
                capture.skipped_lines += 1;
            }
        }
    }
    capture
}

/// Reads and parses the capture file at `path`.
///
/// # Errors
///
/// Returns [`CaptureError::Io`] if the file cannot be read.
pub fn load_capture(path: &Path) -> Result<Capture, CaptureError> {
    let text = std::fs::read_to_string(path).map_err(|source| CaptureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_capture(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: RadioAddress = RadioAddress([0xDE, 0xAD, 0xBE, 0xEF, 0x07]);

    #[test]
    fn test_parse_frame_line() {
        // Arrange / Act
        let frame = parse_capture_line(1, "DE:AD:BE:EF:07 00 C1 00 04 00 00 00 00 00 3B")
            .unwrap()
            .unwrap();

        // Assert
        assert_eq!(frame.address, ADDR);
        assert_eq!(frame.payload.len(), 10);
        assert_eq!(frame.payload.as_bytes()[1], 0xC1);
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        assert_eq!(parse_capture_line(1, "").unwrap(), None);
        assert_eq!(parse_capture_line(2, "   ").unwrap(), None);
        assert_eq!(parse_capture_line(3, "# header").unwrap(), None);
    }

    #[test]
    fn test_dash_and_missing_payload_are_empty_frames() {
        let dash = parse_capture_line(1, "DE:AD:BE:EF:07 -").unwrap().unwrap();
        let bare = parse_capture_line(2, "DE:AD:BE:EF:07").unwrap().unwrap();
        assert!(dash.payload.is_empty());
        assert!(bare.payload.is_empty());
    }

    #[test]
    fn test_trailing_comment_is_ignored() {
        let frame = parse_capture_line(1, "DE:AD:BE:EF:07 0040:04B0:0C # keep-alive")
            .unwrap()
            .unwrap();
        assert_eq!(frame.payload.as_bytes(), &[0x00, 0x40, 0x04, 0xB0, 0x0C]);
    }

    #[test]
    fn test_bad_address_reports_line_number() {
        let err = parse_capture_line(7, "DE:AD:BE 00 40").unwrap_err();
        assert!(matches!(err, CaptureError::Parse { line: 7, .. }));
    }

    #[test]
    fn test_bad_payload_is_parse_error() {
        assert!(parse_capture_line(1, "DE:AD:BE:EF:07 0G").is_err());
        assert!(parse_capture_line(1, "DE:AD:BE:EF:07 004").is_err());
    }

    #[test]
    fn test_parse_capture_skips_bad_lines() {
        // Arrange
        let text = "# capture\nDE:AD:BE:EF:07 00 40 04 B0 0C\nnot a frame\n\nDE:AD:BE:EF:07 -\n";

        // Act
        let capture = parse_capture(text);

        // Assert
        assert_eq!(capture.frames.len(), 2);
        assert_eq!(capture.skipped_lines, 1);
    }

    #[test]
    fn test_load_capture_missing_file_is_io_error() {
        let result = load_capture(Path::new("/nonexistent/capture.txt"));
        assert!(matches!(result, Err(CaptureError::Io { .. })));
    }
}
