//! Bounded device registry.
//!
//! The registry is a fixed number of slots allocated once at construction.
//! Each used slot holds one [`DeviceRecord`] keyed by base address.  When
//! every slot is in use a new base address is rejected with
//! [`RegistryError::StorageFull`]; nothing is evicted behind the caller's
//! back.  The only way to free slots is [`DeviceRegistry::flush`], which
//! releases all of them at once.
//!
//! # Handles
//!
//! Lookups return a [`DeviceHandle`]: a slot index, a prefix index and the
//! flush generation it was issued in.  Handles are plain `Copy` values and
//! never borrow the registry, so the caller can hold one across frames and
//! resolve it again later.  After a flush every older handle resolves to
//! nothing, even if its slot has been reused by another device.
//!
//! # Concurrency
//!
//! The registry is an ordinary owned value with `&mut self` mutators.  Code
//! that receives frames on one task and issues commands from another must
//! serialise access behind a single lock.

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::address::{BaseAddress, RadioAddress};
use crate::domain::device::{Capabilities, DeviceRecord, FrameCounters};
use crate::domain::inference::Observation;
use crate::protocol::frame::Frame;

/// Default number of device slots.
pub const DEFAULT_MAX_DEVICES: usize = 40;

/// Default number of prefixes tracked per base address.
pub const DEFAULT_MAX_PREFIXES: usize = 8;

/// Errors returned by registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Every device slot is in use and a new base address arrived.
    #[error("device storage full: all {capacity} slots in use")]
    StorageFull { capacity: usize },

    /// The device already tracks the maximum number of prefixes.
    #[error("device {base} already tracks {limit} prefixes")]
    PrefixLimitReached { base: BaseAddress, limit: usize },

    /// No device matches the given address or handle.
    #[error("no device known for {0}")]
    NotFound(String),
}

/// Capacity limits of a [`DeviceRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryLimits {
    /// Number of distinct base addresses that can be tracked.
    pub max_devices: usize,
    /// Number of prefixes tracked per base address.
    pub max_prefixes: usize,
}

impl Default for RegistryLimits {
    fn default() -> Self {
        Self {
            max_devices: DEFAULT_MAX_DEVICES,
            max_prefixes: DEFAULT_MAX_PREFIXES,
        }
    }
}

/// Reference to one endpoint of a device stored in a [`DeviceRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle {
    slot: usize,
    prefix_index: usize,
    generation: u32,
}

impl DeviceHandle {
    /// Registry slot holding the device.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Index of the endpoint's prefix within the device's prefix list.
    pub fn prefix_index(&self) -> usize {
        self.prefix_index
    }

    /// Returns `true` if both handles refer to the same device record.
    pub fn same_device(&self, other: &DeviceHandle) -> bool {
        self.slot == other.slot && self.generation == other.generation
    }
}

/// Fixed-capacity store of every device seen on the air.
#[derive(Debug)]
pub struct DeviceRegistry {
    slots: Vec<Option<DeviceRecord>>,
    limits: RegistryLimits,
    generation: u32,
}

impl DeviceRegistry {
    /// Creates an empty registry with the given limits.
    pub fn new(limits: RegistryLimits) -> Self {
        let mut slots = Vec::with_capacity(limits.max_devices);
        slots.resize_with(limits.max_devices, || None);
        Self {
            slots,
            limits,
            generation: 0,
        }
    }

    /// The limits this registry was created with.
    pub fn limits(&self) -> RegistryLimits {
        self.limits
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of used slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Returns `true` if no device is stored.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Resolves the device owning `base`/`prefix`, creating the device and
    /// the prefix entry as needed.
    ///
    /// Calling this again for a known `(base, prefix)` returns the same
    /// handle and changes nothing.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::StorageFull`] if `base` is new and every slot is used.
    /// - [`RegistryError::PrefixLimitReached`] if `prefix` is new and the
    ///   device already tracks the maximum number of prefixes.
    pub fn add_or_get(
        &mut self,
        base: BaseAddress,
        prefix: u8,
    ) -> Result<DeviceHandle, RegistryError> {
        let slot = match self.find_slot_by_base(base) {
            Some(slot) => slot,
            None => {
                let slot = self.find_free_slot().ok_or(RegistryError::StorageFull {
                    capacity: self.capacity(),
                })?;
                self.slots[slot] = Some(DeviceRecord::new(base, self.limits.max_prefixes));
                info!(slot, %base, "new device registered");
                slot
            }
        };

        let record = self.slots[slot]
            .as_mut()
            .ok_or_else(|| RegistryError::NotFound(base.to_string()))?;
        let known_before = record.prefix_count();
        let prefix_index = record.add_prefix(prefix)?;
        if record.prefix_count() > known_before {
            debug!(%base, prefix = format_args!("{prefix:02X}"), prefix_index, "prefix added");
        }

        Ok(DeviceHandle {
            slot,
            prefix_index,
            generation: self.generation,
        })
    }

    /// Convenience wrapper around [`add_or_get`](Self::add_or_get) taking a
    /// full radio address.
    ///
    /// # Errors
    ///
    /// Same as [`add_or_get`](Self::add_or_get).
    pub fn add_address(&mut self, address: &RadioAddress) -> Result<DeviceHandle, RegistryError> {
        let (base, prefix) = address.split();
        self.add_or_get(base, prefix)
    }

    /// Finds the endpoint for a full radio address.
    ///
    /// Both the base and the prefix must be known; a known base with an
    /// unknown prefix yields `None`.
    pub fn lookup_by_address(&self, address: &RadioAddress) -> Option<DeviceHandle> {
        let (base, prefix) = address.split();
        let slot = self.find_slot_by_base(base)?;
        let prefix_index = self.slots[slot].as_ref()?.prefix_index(prefix)?;
        Some(DeviceHandle {
            slot,
            prefix_index,
            generation: self.generation,
        })
    }

    /// Handle to the first endpoint of the device in slot `index`, or `None`
    /// for unused or out-of-range slots.
    ///
    /// Positional enumeration for listings: walk `0..capacity()` and resolve
    /// each handle with [`device`](Self::device).
    pub fn lookup_by_index(&self, index: usize) -> Option<DeviceHandle> {
        self.slots.get(index)?.as_ref()?;
        Some(DeviceHandle {
            slot: index,
            prefix_index: 0,
            generation: self.generation,
        })
    }

    /// Resolves a handle to its device record.
    pub fn device(&self, handle: DeviceHandle) -> Option<&DeviceRecord> {
        if handle.generation != self.generation {
            return None;
        }
        self.slots.get(handle.slot)?.as_ref()
    }

    fn device_mut(&mut self, handle: DeviceHandle) -> Option<&mut DeviceRecord> {
        if handle.generation != self.generation {
            return None;
        }
        self.slots.get_mut(handle.slot)?.as_mut()
    }

    /// Iterates over `(slot, device)` for every used slot.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &DeviceRecord)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|d| (i, d)))
    }

    /// Releases every slot.  Handles issued before the flush stop resolving.
    pub fn flush(&mut self) {
        let released = self.len();
        self.slots.iter_mut().for_each(|s| *s = None);
        self.generation = self.generation.wrapping_add(1);
        info!(released, "device registry flushed");
    }

    /// Capabilities of the endpoint at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if base or prefix is unknown.
    pub fn capabilities(&self, address: &RadioAddress) -> Result<&Capabilities, RegistryError> {
        self.endpoint_parts(address).map(|(caps, _)| caps)
    }

    /// Mutable capabilities of the endpoint at `address`, for recording
    /// cryptanalysis results.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if base or prefix is unknown.
    pub fn capabilities_mut(
        &mut self,
        address: &RadioAddress,
    ) -> Result<&mut Capabilities, RegistryError> {
        let handle = self
            .lookup_by_address(address)
            .ok_or_else(|| RegistryError::NotFound(address.to_string()))?;
        self.device_mut(handle)
            .and_then(|d| d.endpoint_mut(handle.prefix_index))
            .map(|e| &mut e.capabilities)
            .ok_or_else(|| RegistryError::NotFound(address.to_string()))
    }

    /// Frame counters of the endpoint at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if base or prefix is unknown.
    pub fn counters(&self, address: &RadioAddress) -> Result<&FrameCounters, RegistryError> {
        self.endpoint_parts(address).map(|(_, counters)| counters)
    }

    /// Feeds one frame to the inference engine for the endpoint behind `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the handle is stale.
    pub fn observe(
        &mut self,
        handle: DeviceHandle,
        frame: &Frame,
    ) -> Result<Observation, RegistryError> {
        let device = self
            .device_mut(handle)
            .ok_or_else(|| RegistryError::NotFound(format!("slot {}", handle.slot)))?;
        if handle.prefix_index >= device.prefix_count() {
            return Err(RegistryError::NotFound(format!(
                "prefix index {} of {}",
                handle.prefix_index,
                device.base()
            )));
        }
        Ok(device.observe(handle.prefix_index, frame))
    }

    /// Looks up `address` and feeds `frame` to its endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if base or prefix is unknown.
    pub fn observe_frame(
        &mut self,
        address: &RadioAddress,
        frame: &Frame,
    ) -> Result<Observation, RegistryError> {
        let handle = self
            .lookup_by_address(address)
            .ok_or_else(|| RegistryError::NotFound(address.to_string()))?;
        self.observe(handle, frame)
    }

    fn endpoint_parts(
        &self,
        address: &RadioAddress,
    ) -> Result<(&Capabilities, &FrameCounters), RegistryError> {
        self.lookup_by_address(address)
            .and_then(|h| self.device(h)?.endpoint(h.prefix_index))
            .map(|e| (&e.capabilities, &e.counters))
            .ok_or_else(|| RegistryError::NotFound(address.to_string()))
    }

    fn find_slot_by_base(&self, base: BaseAddress) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|d| d.base() == base))
    }

    fn find_free_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new(RegistryLimits::default())
    }
}
