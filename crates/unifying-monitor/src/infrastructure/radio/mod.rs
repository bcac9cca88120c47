//! Radio infrastructure: where frames come from and where forged frames go.
//!
//! The monitor does not drive a transceiver itself.  A [`FrameSource`]
//! delivers sniffed frames through a channel; the production adapter is a
//! capture-file replayer ([`crate::infrastructure::capture::replay`]).
//! Frames handed back for transmission go through
//! [`FrameTransmitter`](crate::application::inject_keystrokes::FrameTransmitter);
//! [`dry_run::DryRunTransmitter`] logs them instead of sending.
//!
//! # Threading
//!
//! A real sniffer delivers frames from a driver thread.  Sources therefore
//! hand out a `std::sync::mpsc` receiver, and [`pump::pump_frames`] bridges
//! it into the Tokio runtime.

use std::sync::mpsc;

use unifying_core::{Frame, RadioAddress};

pub mod dry_run;
pub mod pump;

/// One frame as received from (or sent to) the air.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioFrame {
    /// Address of the pipe the frame was received on.
    pub address: RadioAddress,
    /// Payload; empty for link-layer acknowledgements.
    pub payload: Frame,
}

impl RadioFrame {
    pub fn new(address: RadioAddress, payload: Frame) -> Self {
        Self { address, payload }
    }
}

/// Error type for radio operations.
#[derive(Debug, thiserror::Error)]
pub enum RadioError {
    #[error("frame source has already been started")]
    AlreadyStarted,
    #[error("frame source is not available: {0}")]
    Unavailable(String),
    #[error("failed to transmit to {address}: {reason}")]
    TransmitFailed {
        address: RadioAddress,
        reason: String,
    },
}

/// Trait abstracting frame production.
///
/// Production implementations replay captures; tests mock it with `mockall`.
pub trait FrameSource: Send + Sync {
    /// Starts the source and returns a receiver for captured frames.  The
    /// channel closes when the source runs dry or is stopped.
    fn start(&self) -> Result<mpsc::Receiver<RadioFrame>, RadioError>;
    /// Stops the source and releases its resources.
    fn stop(&self);
}
