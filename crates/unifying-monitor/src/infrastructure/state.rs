//! Shared application state.
//!
//! The frame pump and the command handlers in `main` all reach the registry
//! through [`AppState`], which is wrapped in an `Arc` and handed to every
//! task that needs it.
//!
//! The processor sits behind a single `tokio::sync::Mutex` so that a frame is
//! always observed as a whole: no reader can see a device whose counters
//! have been bumped but whose capabilities have not yet been promoted.

use std::sync::Arc;

use tokio::sync::Mutex;
use unifying_core::{Capabilities, DeviceRegistry, RadioAddress};

use crate::application::list_devices::{list_devices, DeviceSummary};
use crate::application::process_frames::{FrameProcessor, PipelineStats};
use crate::infrastructure::storage::config::MonitorConfig;

/// State shared between the frame pump and command handlers.
pub struct AppState {
    /// The receive pipeline and the registry it owns.
    pub processor: Mutex<FrameProcessor>,
    /// Configuration loaded at startup.  Read-only while running.
    pub config: MonitorConfig,
}

impl AppState {
    /// Builds the registry from the configured limits.
    pub fn new(config: MonitorConfig) -> Arc<Self> {
        let registry = DeviceRegistry::new(config.registry.limits());
        let processor = FrameProcessor::new(registry, config.monitor.auto_register);
        Arc::new(Self {
            processor: Mutex::new(processor),
            config,
        })
    }

    /// Copy of the inferred capabilities for `address`, if it is registered.
    pub async fn capabilities_of(&self, address: &RadioAddress) -> Option<Capabilities> {
        self.processor
            .lock()
            .await
            .registry()
            .capabilities(address)
            .ok()
            .copied()
    }

    pub async fn device_table(&self) -> Vec<DeviceSummary> {
        list_devices(self.processor.lock().await.registry())
    }

    pub async fn stats(&self) -> PipelineStats {
        self.processor.lock().await.stats()
    }

    /// Forgets every device.
    pub async fn flush(&self) {
        self.processor.lock().await.flush();
    }
}
