//! Capture replay: plays a loaded capture through the [`FrameSource`] interface.
//!
//! Frames are sent from a dedicated thread, the same way a sniffer driver
//! would deliver them, so the rest of the pipeline cannot tell a replay from
//! live traffic.

use std::path::Path;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc, Arc,
};

use tracing::debug;

use super::{load_capture, CaptureError};
use crate::infrastructure::radio::{FrameSource, RadioError, RadioFrame};

/// A [`FrameSource`] that replays a fixed list of frames once.
pub struct ReplayFrameSource {
    frames: Arc<Vec<RadioFrame>>,
    started: AtomicBool,
    stopped: Arc<AtomicBool>,
}

impl ReplayFrameSource {
    /// Creates a source replaying `frames` in order.
    pub fn new(frames: Vec<RadioFrame>) -> Self {
        Self {
            frames: Arc::new(frames),
            started: AtomicBool::new(false),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Loads a capture file and creates a source replaying it.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Io`] if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self, CaptureError> {
        let capture = load_capture(path)?;
        Ok(Self::new(capture.frames))
    }

    /// Number of frames this source will replay.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if the capture holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for ReplayFrameSource {
    fn start(&self) -> Result<mpsc::Receiver<RadioFrame>, RadioError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(RadioError::AlreadyStarted);
        }

        let (tx, rx) = mpsc::channel();
        let frames = Arc::clone(&self.frames);
        let stopped = Arc::clone(&self.stopped);
        std::thread::Builder::new()
            .name("capture-replay".to_string())
            .spawn(move || {
                for frame in frames.iter() {
                    if stopped.load(Ordering::Relaxed) || tx.send(*frame).is_err() {
                        break;
                    }
                }
                debug!("capture replay finished");
            })
            .map_err(|e| RadioError::Unavailable(e.to_string()))?;
        Ok(rx)
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unifying_core::{Frame, RadioAddress};

    fn frames(n: u8) -> Vec<RadioFrame> {
        (0..n)
            .map(|i| RadioFrame::new(RadioAddress([1, 2, 3, 4, i]), Frame::empty()))
            .collect()
    }

    #[test]
    fn test_replay_delivers_frames_in_order_then_closes() {
        // Arrange
        let source = ReplayFrameSource::new(frames(3));

        // Act
        let rx = source.start().unwrap();
        let received: Vec<u8> = rx.iter().map(|f| f.address.prefix()).collect();

        // Assert
        assert_eq!(received, vec![0, 1, 2]);
    }

    #[test]
    fn test_replay_can_only_start_once() {
        let source = ReplayFrameSource::new(frames(1));
        let _rx = source.start().unwrap();
        assert!(matches!(source.start(), Err(RadioError::AlreadyStarted)));
    }

    #[test]
    fn test_from_path_loads_capture() {
        // Arrange
        let path = std::env::temp_dir().join(format!("unifying_replay_{}.txt", std::process::id()));
        std::fs::write(&path, "DE:AD:BE:EF:07 00 40 04 B0 0C\nDE:AD:BE:EF:07 -\n").unwrap();

        // Act
        let source = ReplayFrameSource::from_path(&path).unwrap();

        // Assert
        assert_eq!(source.len(), 2);
        std::fs::remove_file(&path).ok();
    }
}
