//! Device records, inferred capabilities and frame counters.
//!
//! One [`DeviceRecord`] exists per base address.  Each prefix seen on that
//! base gets its own [`Endpoint`] holding the capabilities inferred for it
//! and the counters the inference engine works from.
//!
//! Inferred capability bits only ever accumulate: there is no API to clear
//! them, because they record evidence seen on the air rather than the
//! device's current state.

use serde::{Deserialize, Serialize};

use crate::domain::address::{BaseAddress, RadioAddress};
use crate::domain::registry::RegistryError;
use crate::protocol::report::ReportType;

/// Set of HID report categories observed for an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportTypes(pub u8);

impl ReportTypes {
    pub const KEYBOARD: u8 = 1 << 0;
    pub const MOUSE: u8 = 1 << 1;
    pub const MULTIMEDIA: u8 = 1 << 2;
    pub const POWER_KEYS: u8 = 1 << 3;
    pub const KEYBOARD_LED: u8 = 1 << 4;
    pub const SHORT_HIDPP: u8 = 1 << 5;
    pub const LONG_HIDPP: u8 = 1 << 6;

    const NAMES: [(u8, &'static str); 7] = [
        (Self::KEYBOARD, "keyboard"),
        (Self::MOUSE, "mouse"),
        (Self::MULTIMEDIA, "multimedia"),
        (Self::POWER_KEYS, "power-keys"),
        (Self::KEYBOARD_LED, "keyboard-led"),
        (Self::SHORT_HIDPP, "short-hid++"),
        (Self::LONG_HIDPP, "long-hid++"),
    ];

    /// Returns `true` if every bit in `bits` is set.
    pub fn contains(&self, bits: u8) -> bool {
        self.0 & bits == bits
    }

    /// Returns `true` if no report type has been observed.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub(crate) fn insert(&mut self, bits: u8) {
        self.0 |= bits;
    }

    /// Names of the set bits, in a fixed order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        Self::NAMES
            .iter()
            .filter(move |(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
    }
}

impl std::fmt::Display for ReportTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_names(f, self.names())
    }
}

/// Set of protocol features observed for an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceCaps(pub u8);

impl DeviceCaps {
    pub const UNIFYING_COMPATIBLE: u8 = 1 << 0;
    pub const LINK_ENCRYPTION: u8 = 1 << 1;

    const NAMES: [(u8, &'static str); 2] = [
        (Self::UNIFYING_COMPATIBLE, "unifying"),
        (Self::LINK_ENCRYPTION, "link-encryption"),
    ];

    /// Returns `true` if every bit in `bits` is set.
    pub fn contains(&self, bits: u8) -> bool {
        self.0 & bits == bits
    }

    pub(crate) fn insert(&mut self, bits: u8) {
        self.0 |= bits;
    }

    /// Names of the set bits, in a fixed order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        Self::NAMES
            .iter()
            .filter(move |(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
    }
}

impl std::fmt::Display for DeviceCaps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_names(f, self.names())
    }
}

fn write_names<'a>(
    f: &mut std::fmt::Formatter<'_>,
    names: impl Iterator<Item = &'a str>,
) -> std::fmt::Result {
    let mut first = true;
    for name in names {
        if !first {
            f.write_str(",")?;
        }
        f.write_str(name)?;
        first = false;
    }
    if first {
        f.write_str("-")?;
    }
    Ok(())
}

/// Security and feature profile inferred for one endpoint.
///
/// `report_types`, `caps` and `vuln_plain_injection` are maintained by the
/// inference engine.  The remaining flags are written by whatever performs
/// cryptanalysis on captured traffic and are read by the injection
/// synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    report_types: ReportTypes,
    caps: DeviceCaps,
    vuln_plain_injection: bool,
    /// The link is known to carry encrypted keystrokes.
    pub is_encrypted: bool,
    /// The link encryption key has been recovered.
    pub key_known: bool,
    /// At least one whitened keystroke report has been captured.
    pub has_single_whitened_report: bool,
    /// Enough whitened reports have been captured for keystream recovery.
    pub has_enough_whitened_reports: bool,
}

impl Capabilities {
    /// HID report categories seen so far.
    pub fn report_types(&self) -> ReportTypes {
        self.report_types
    }

    /// Protocol features seen so far.
    pub fn caps(&self) -> DeviceCaps {
        self.caps
    }

    /// `true` once plaintext keystroke injection is known to be accepted.
    pub fn vuln_plain_injection(&self) -> bool {
        self.vuln_plain_injection
    }

    pub(crate) fn add_report_types(&mut self, bits: u8) {
        self.report_types.insert(bits);
    }

    pub(crate) fn add_caps(&mut self, bits: u8) {
        self.caps.insert(bits);
    }

    pub(crate) fn mark_plain_injectable(&mut self) {
        self.vuln_plain_injection = true;
    }
}

/// Frame statistics for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameCounters {
    overall: u32,
    logitech_checksum_hits: u32,
    typed: [u32; ReportType::COUNT],
}

impl FrameCounters {
    /// Non-empty frames accepted for this endpoint.
    pub fn overall(&self) -> u32 {
        self.overall
    }

    /// Frames that carried a valid Unifying checksum.
    pub fn logitech_checksum_hits(&self) -> u32 {
        self.logitech_checksum_hits
    }

    /// Frames counted for `report_type`.
    pub fn typed(&self, report_type: ReportType) -> u32 {
        self.typed[report_type.counter_index()]
    }

    pub(crate) fn record_frame(&mut self) {
        self.overall = self.overall.saturating_add(1);
    }

    pub(crate) fn record_checksum_hit(&mut self) {
        self.logitech_checksum_hits = self.logitech_checksum_hits.saturating_add(1);
    }

    /// Increments the bucket for `report_type` and returns the new count.
    pub(crate) fn record_typed(&mut self, report_type: ReportType) -> u32 {
        let bucket = &mut self.typed[report_type.counter_index()];
        *bucket = bucket.saturating_add(1);
        *bucket
    }
}

/// One logical device (prefix) behind a base address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Prefix byte distinguishing this endpoint on its base.
    pub prefix: u8,
    /// Inferred capabilities.
    pub capabilities: Capabilities,
    /// Frame statistics.
    pub counters: FrameCounters,
}

impl Endpoint {
    fn new(prefix: u8) -> Self {
        Self {
            prefix,
            capabilities: Capabilities::default(),
            counters: FrameCounters::default(),
        }
    }
}

/// Everything known about one base address.
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    base: BaseAddress,
    is_logitech: bool,
    endpoints: Vec<Endpoint>,
    max_prefixes: usize,
}

impl DeviceRecord {
    pub(crate) fn new(base: BaseAddress, max_prefixes: usize) -> Self {
        Self {
            base,
            is_logitech: false,
            endpoints: Vec::with_capacity(max_prefixes),
            max_prefixes,
        }
    }

    /// The base address this record is keyed by.
    pub fn base(&self) -> BaseAddress {
        self.base
    }

    /// `true` once any frame has proven the device speaks the Unifying protocol.
    pub fn is_logitech(&self) -> bool {
        self.is_logitech
    }

    pub(crate) fn mark_logitech(&mut self) {
        self.is_logitech = true;
    }

    /// Prefixes in the order they were first seen.
    pub fn prefixes(&self) -> impl Iterator<Item = u8> + '_ {
        self.endpoints.iter().map(|e| e.prefix)
    }

    /// Number of known prefixes.
    pub fn prefix_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Position of `prefix` in the prefix list.
    pub fn prefix_index(&self, prefix: u8) -> Option<usize> {
        self.endpoints.iter().position(|e| e.prefix == prefix)
    }

    /// All endpoints in prefix order.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// The endpoint at `prefix_index`.
    pub fn endpoint(&self, prefix_index: usize) -> Option<&Endpoint> {
        self.endpoints.get(prefix_index)
    }

    pub(crate) fn endpoint_mut(&mut self, prefix_index: usize) -> Option<&mut Endpoint> {
        self.endpoints.get_mut(prefix_index)
    }

    /// Full radio address of the endpoint at `prefix_index`.
    pub fn address(&self, prefix_index: usize) -> Option<RadioAddress> {
        self.endpoint(prefix_index)
            .map(|e| RadioAddress::from_parts(self.base, e.prefix))
    }

    /// Adds `prefix` if it is new and returns its index.
    pub(crate) fn add_prefix(&mut self, prefix: u8) -> Result<usize, RegistryError> {
        if let Some(idx) = self.prefix_index(prefix) {
            return Ok(idx);
        }
        if self.endpoints.len() >= self.max_prefixes {
            return Err(RegistryError::PrefixLimitReached {
                base: self.base,
                limit: self.max_prefixes,
            });
        }
        self.endpoints.push(Endpoint::new(prefix));
        Ok(self.endpoints.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: BaseAddress = BaseAddress([0xAA, 0xBB, 0xCC, 0xDD]);

    #[test]
    fn test_add_prefix_preserves_insertion_order() {
        // Arrange
        let mut record = DeviceRecord::new(BASE, 8);

        // Act
        record.add_prefix(0x07).unwrap();
        record.add_prefix(0x08).unwrap();
        record.add_prefix(0x05).unwrap();

        // Assert
        assert_eq!(record.prefixes().collect::<Vec<_>>(), vec![0x07, 0x08, 0x05]);
    }

    #[test]
    fn test_add_prefix_is_idempotent() {
        let mut record = DeviceRecord::new(BASE, 8);
        let first = record.add_prefix(0x07).unwrap();
        let second = record.add_prefix(0x07).unwrap();
        assert_eq!(first, second);
        assert_eq!(record.prefix_count(), 1);
    }

    #[test]
    fn test_add_prefix_fails_at_limit() {
        // Arrange
        let mut record = DeviceRecord::new(BASE, 2);
        record.add_prefix(0x01).unwrap();
        record.add_prefix(0x02).unwrap();

        // Act
        let result = record.add_prefix(0x03);

        // Assert
        assert_eq!(
            result,
            Err(RegistryError::PrefixLimitReached { base: BASE, limit: 2 })
        );
        // An already known prefix is still accepted at the limit.
        assert_eq!(record.add_prefix(0x02), Ok(1));
    }

    #[test]
    fn test_address_recombines_base_and_prefix() {
        let mut record = DeviceRecord::new(BASE, 8);
        let idx = record.add_prefix(0x09).unwrap();
        assert_eq!(
            record.address(idx),
            Some(RadioAddress([0xAA, 0xBB, 0xCC, 0xDD, 0x09]))
        );
        assert_eq!(record.address(idx + 1), None);
    }

    #[test]
    fn test_report_types_display_lists_names() {
        let types = ReportTypes(ReportTypes::KEYBOARD | ReportTypes::KEYBOARD_LED);
        assert_eq!(types.to_string(), "keyboard,keyboard-led");
        assert_eq!(ReportTypes::default().to_string(), "-");
    }

    #[test]
    fn test_device_caps_contains() {
        let caps = DeviceCaps(DeviceCaps::UNIFYING_COMPATIBLE);
        assert!(caps.contains(DeviceCaps::UNIFYING_COMPATIBLE));
        assert!(!caps.contains(DeviceCaps::LINK_ENCRYPTION));
        assert!(!caps.contains(DeviceCaps::UNIFYING_COMPATIBLE | DeviceCaps::LINK_ENCRYPTION));
    }

    #[test]
    fn test_counters_record_typed_returns_new_count() {
        let mut counters = FrameCounters::default();
        assert_eq!(counters.record_typed(ReportType::PlainMouse), 1);
        assert_eq!(counters.record_typed(ReportType::PlainMouse), 2);
        assert_eq!(counters.typed(ReportType::PlainMouse), 2);
        assert_eq!(counters.typed(ReportType::PlainKeyboard), 0);
    }
}
