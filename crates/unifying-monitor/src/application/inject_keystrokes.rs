//! InjectKeystrokesUseCase: types text into a target device.
//!
//! This is the transmit path of the monitor.  It turns keyboard reports (or
//! text, via the US layout table) into forged frames using the strategy the
//! target's inferred capabilities allow, and hands them to a
//! [`FrameTransmitter`].
//!
//! # Architecture
//!
//! The use case depends only on the `FrameTransmitter` trait.  The binary
//! injects a dry-run transmitter; tests inject a recorder.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};
use unifying_core::keymap::report_for_char;
use unifying_core::{
    generate_keyboard_frame, select_strategy, Capabilities, Frame, HidKeyboardReport,
    InjectionError, RadioAddress,
};

use crate::infrastructure::radio::RadioError;
use crate::infrastructure::storage::config::InjectionSection;

/// Error type for the inject-keystrokes use case.
#[derive(Debug, Error)]
pub enum InjectError {
    /// No frame can be built for the target's capabilities.
    #[error(transparent)]
    Synthesis(#[from] InjectionError),
    /// The radio refused the frame.
    #[error(transparent)]
    Radio(#[from] RadioError),
}

/// Trait for handing synthesized frames to the radio.
///
/// Infrastructure implementations drive a transceiver (or log the frame);
/// test implementations record calls.
#[async_trait]
pub trait FrameTransmitter: Send + Sync {
    /// Transmits `frame` on the pipe addressed by `address`.
    async fn transmit(&self, address: RadioAddress, frame: Frame) -> Result<(), RadioError>;
}

/// Timing of injected keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionSettings {
    /// Pause after every transmitted frame.
    pub keystroke_delay: Duration,
    /// Send an all-keys-released report after every key press.
    pub release_keys: bool,
}

impl From<&InjectionSection> for InjectionSettings {
    fn from(section: &InjectionSection) -> Self {
        Self {
            keystroke_delay: Duration::from_millis(section.keystroke_delay_ms),
            release_keys: section.release_keys,
        }
    }
}

/// Result of typing a string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionSummary {
    /// Frames handed to the transmitter.
    pub frames_sent: usize,
    /// Characters with no key on the US layout, in input order.
    pub skipped: Vec<char>,
}

/// The Inject Keystrokes use case.
pub struct InjectKeystrokesUseCase {
    transmitter: Arc<dyn FrameTransmitter>,
    settings: InjectionSettings,
}

impl InjectKeystrokesUseCase {
    /// Creates a new use case instance.
    pub fn new(transmitter: Arc<dyn FrameTransmitter>, settings: InjectionSettings) -> Self {
        Self {
            transmitter,
            settings,
        }
    }

    /// Builds and transmits the frame for a single report.
    ///
    /// `caps` are the target's inferred capabilities, or `None` when the
    /// target has never been observed.
    ///
    /// # Errors
    ///
    /// Returns [`InjectError::Synthesis`] if the capabilities call for an
    /// unsupported strategy and [`InjectError::Radio`] if transmission fails.
    pub async fn inject_report(
        &self,
        address: RadioAddress,
        caps: Option<&Capabilities>,
        report: &HidKeyboardReport,
    ) -> Result<(), InjectError> {
        let frame = generate_keyboard_frame(caps, report)?;
        debug!(%address, %frame, "transmitting injection frame");
        self.transmitter.transmit(address, frame).await?;
        Ok(())
    }

    /// Types `text` into the target, one key press per character.
    ///
    /// Characters without a US-layout key are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Same as [`inject_report`](Self::inject_report).  An unsupported
    /// strategy is detected before the first frame is sent.
    pub async fn inject_text(
        &self,
        address: RadioAddress,
        caps: Option<&Capabilities>,
        text: &str,
    ) -> Result<InjectionSummary, InjectError> {
        let choice = select_strategy(caps);
        // Building the release frame up front surfaces an unsupported
        // strategy before anything is transmitted.
        let release = HidKeyboardReport::release();
        generate_keyboard_frame(caps, &release)?;
        info!(%address, strategy = %choice.strategy, degraded = choice.degraded, chars = text.chars().count(), "injecting keystrokes");

        let mut summary = InjectionSummary::default();
        for c in text.chars() {
            let Some(report) = report_for_char(c) else {
                warn!(character = ?c, "no key for character, skipping");
                summary.skipped.push(c);
                continue;
            };

            self.inject_report(address, caps, &report).await?;
            summary.frames_sent += 1;
            self.pause().await;

            if self.settings.release_keys {
                self.inject_report(address, caps, &release).await?;
                summary.frames_sent += 1;
                self.pause().await;
            }
        }
        Ok(summary)
    }

    async fn pause(&self) {
        if !self.settings.keystroke_delay.is_zero() {
            tokio::time::sleep(self.settings.keystroke_delay).await;
        }
    }
}
