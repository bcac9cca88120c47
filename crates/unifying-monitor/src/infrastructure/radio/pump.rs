//! Frame pump: moves frames from a source's driver thread into the processor.
//!
//! # How the bridge works (for beginners)
//!
//! A [`FrameSource`] hands out a `std::sync::mpsc::Receiver`.  Calling
//! `recv()` on it blocks the thread, which must never happen on a Tokio
//! worker.  The pump therefore parks the blocking receive on Tokio's
//! blocking pool (`spawn_blocking`) and forwards every frame into a bounded
//! `tokio::sync::mpsc` channel that async code can `.await` on.
//!
//! ```text
//!  driver thread ──std mpsc──▶ blocking task ──tokio mpsc──▶ pump loop ──▶ FrameProcessor
//! ```

use std::sync::{mpsc, Arc};

use tracing::{debug, info};

use super::{FrameSource, RadioError, RadioFrame};
use crate::infrastructure::state::AppState;

/// Capacity of the bridge channel between the driver thread and the pump.
pub const FRAME_QUEUE_DEPTH: usize = 256;

/// Feeds every frame from `rx` into the shared processor until the channel
/// closes.  Returns the number of frames processed.
pub async fn pump_frames(rx: mpsc::Receiver<RadioFrame>, state: Arc<AppState>) -> u64 {
    let (tx, mut queue) = tokio::sync::mpsc::channel(FRAME_QUEUE_DEPTH);

    let bridge = tokio::task::spawn_blocking(move || {
        while let Ok(frame) = rx.recv() {
            if tx.blocking_send(frame).is_err() {
                break;
            }
        }
    });

    let mut processed = 0u64;
    while let Some(frame) = queue.recv().await {
        let outcome = state.processor.lock().await.handle_frame(&frame);
        debug!(address = %frame.address, ?outcome, "frame processed");
        processed += 1;
    }

    if let Err(e) = bridge.await {
        debug!(error = %e, "frame bridge task ended abnormally");
    }
    processed
}

/// Starts `source`, pumps it dry and stops it.
///
/// # Errors
///
/// Returns the source's error if it cannot be started.
pub async fn run_source(source: &dyn FrameSource, state: Arc<AppState>) -> Result<u64, RadioError> {
    let rx = source.start()?;
    info!("frame source started");
    let processed = pump_frames(rx, state).await;
    source.stop();
    info!(processed, "frame source drained");
    Ok(processed)
}
