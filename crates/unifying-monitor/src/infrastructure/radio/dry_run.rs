//! Dry-run transmitter: logs forged frames instead of putting them on the air.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::info;
use unifying_core::{Frame, RadioAddress};

use super::RadioError;
use crate::application::inject_keystrokes::FrameTransmitter;

/// A [`FrameTransmitter`] that only logs.
#[derive(Debug, Default)]
pub struct DryRunTransmitter {
    sent: AtomicUsize,
}

impl DryRunTransmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames "transmitted" so far.
    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl FrameTransmitter for DryRunTransmitter {
    async fn transmit(&self, address: RadioAddress, frame: Frame) -> Result<(), RadioError> {
        let n = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        info!(%address, %frame, n, "dry run: frame not transmitted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_counts_frames() {
        // Arrange
        let tx = DryRunTransmitter::new();
        let address = RadioAddress([1, 2, 3, 4, 5]);

        // Act
        tx.transmit(address, Frame::empty()).await.unwrap();
        tx.transmit(address, Frame::empty()).await.unwrap();

        // Assert
        assert_eq!(tx.sent(), 2);
    }
}
