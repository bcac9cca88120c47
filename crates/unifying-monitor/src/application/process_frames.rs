//! FrameProcessor: feeds sniffed frames into the device registry.
//!
//! This is the receive path of the monitor.  For every frame it resolves the
//! sending endpoint (registering it when auto-registration is on), runs the
//! inference engine and keeps running totals in [`PipelineStats`].
//!
//! Registry exhaustion is not fatal: the frame is dropped, counted and
//! logged, and processing continues.  Flushing the registry frees the slots
//! again.
//!
//! The processor owns the registry outright.  Sharing it between the frame
//! pump and command handlers goes through the single lock in
//! [`AppState`](crate::infrastructure::state::AppState).

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use unifying_core::{DeviceHandle, DeviceRegistry, Observation, RadioAddress, RegistryError};

use crate::infrastructure::radio::RadioFrame;

/// Error type for explicit registry operations requested by the operator.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Running totals of the receive pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    /// Every frame handed to the processor.
    pub frames: u64,
    /// Link-layer acknowledgements.
    pub empty: u64,
    pub keep_alives: u64,
    /// Frames counted under a report type.
    pub counted: u64,
    /// Frames dropped by a report type's length check.
    pub malformed: u64,
    /// Frames from addresses that are not registered (auto-registration off).
    pub unknown_devices: u64,
    pub storage_full_drops: u64,
    pub prefix_limit_drops: u64,
}

/// What happened to one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The inference engine processed the frame.
    Observed(Observation),
    /// The address is not registered and auto-registration is off.
    UnknownDevice,
    /// A new base address arrived while every registry slot was in use.
    StorageFull,
    /// A new prefix arrived for a device that tracks the maximum already.
    PrefixLimit,
}

/// The receive pipeline.
pub struct FrameProcessor {
    registry: DeviceRegistry,
    auto_register: bool,
    stats: PipelineStats,
    storage_full_reported: bool,
}

impl FrameProcessor {
    /// Creates a processor owning `registry`.
    pub fn new(registry: DeviceRegistry, auto_register: bool) -> Self {
        Self {
            registry,
            auto_register,
            stats: PipelineStats::default(),
            storage_full_reported: false,
        }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Mutable access for collaborators that record cryptanalysis results.
    pub fn registry_mut(&mut self) -> &mut DeviceRegistry {
        &mut self.registry
    }

    /// Totals since the processor was created.
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Processes one received frame.
    pub fn handle_frame(&mut self, frame: &RadioFrame) -> FrameOutcome {
        self.stats.frames += 1;

        if frame.payload.is_empty() {
            self.stats.empty += 1;
            debug!(address = %frame.address, "acknowledgement");
            return FrameOutcome::Observed(Observation::Ignored);
        }

        let handle = match self.resolve(&frame.address) {
            Ok(handle) => handle,
            Err(outcome) => return outcome,
        };

        let observation = match self.registry.observe(handle, &frame.payload) {
            Ok(observation) => observation,
            Err(e) => {
                // Handles are resolved just above, so this means the registry
                // was flushed underneath us.
                debug!(address = %frame.address, error = %e, "stale device handle");
                self.stats.unknown_devices += 1;
                return FrameOutcome::UnknownDevice;
            }
        };

        match observation {
            Observation::Ignored => {}
            Observation::KeepAlive => self.stats.keep_alives += 1,
            Observation::Counted(_) => self.stats.counted += 1,
            Observation::Malformed { .. } => self.stats.malformed += 1,
        }
        FrameOutcome::Observed(observation)
    }

    /// Registers `address` explicitly, whether or not auto-registration is on.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Registry`] if the registry or the device's
    /// prefix list is full.
    pub fn provision(&mut self, address: &RadioAddress) -> Result<DeviceHandle, ProcessError> {
        Ok(self.registry.add_address(address)?)
    }

    /// Forgets every device.  Pipeline totals are kept.
    pub fn flush(&mut self) {
        self.registry.flush();
        self.storage_full_reported = false;
    }

    fn resolve(&mut self, address: &RadioAddress) -> Result<DeviceHandle, FrameOutcome> {
        if !self.auto_register {
            return self.registry.lookup_by_address(address).ok_or_else(|| {
                debug!(%address, "frame from unprovisioned address");
                self.stats.unknown_devices += 1;
                FrameOutcome::UnknownDevice
            });
        }

        match self.registry.add_address(address) {
            Ok(handle) => Ok(handle),
            Err(RegistryError::StorageFull { capacity }) => {
                self.stats.storage_full_drops += 1;
                if !self.storage_full_reported {
                    warn!(%address, capacity, "device registry full, dropping frames from new devices until flushed");
                    self.storage_full_reported = true;
                }
                Err(FrameOutcome::StorageFull)
            }
            Err(RegistryError::PrefixLimitReached { base, limit }) => {
                self.stats.prefix_limit_drops += 1;
                warn!(%address, %base, limit, "prefix limit reached, dropping frame");
                Err(FrameOutcome::PrefixLimit)
            }
            Err(RegistryError::NotFound(what)) => {
                debug!(%address, what = %what, "device vanished during registration");
                self.stats.unknown_devices += 1;
                Err(FrameOutcome::UnknownDevice)
            }
        }
    }
}
