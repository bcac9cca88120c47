//! Registry listing: one row per known endpoint.
//!
//! [`DeviceSummary`] is a flat, serialisable view of a registry endpoint.
//! It carries only display-ready values so the binary (or any other
//! front-end) never has to reach into registry internals.

use serde::Serialize;
use unifying_core::{select_strategy, DeviceRegistry};

/// Flat view of one endpoint in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSummary {
    /// Registry slot of the owning device.
    pub slot: usize,
    /// Full radio address, colon-separated hex.
    pub address: String,
    pub is_logitech: bool,
    /// Comma-separated report types, `-` if none.
    pub report_types: String,
    /// Comma-separated protocol features, `-` if none.
    pub caps: String,
    pub vuln_plain_injection: bool,
    pub is_encrypted: bool,
    pub frames: u32,
    pub checksum_hits: u32,
    /// Strategy injection would use right now.
    pub strategy: String,
}

/// Lists every endpoint, ordered by slot and then by prefix insertion order.
pub fn list_devices(registry: &DeviceRegistry) -> Vec<DeviceSummary> {
    let mut rows = Vec::new();
    for (slot, device) in registry.iter() {
        for (index, endpoint) in device.endpoints().iter().enumerate() {
            let Some(address) = device.address(index) else {
                continue;
            };
            let caps = &endpoint.capabilities;
            let choice = select_strategy(Some(caps));
            let strategy = if choice.degraded {
                format!("{} (degraded)", choice.strategy)
            } else {
                choice.strategy.to_string()
            };
            rows.push(DeviceSummary {
                slot,
                address: address.to_string(),
                is_logitech: device.is_logitech(),
                report_types: caps.report_types().to_string(),
                caps: caps.caps().to_string(),
                vuln_plain_injection: caps.vuln_plain_injection(),
                is_encrypted: caps.is_encrypted,
                frames: endpoint.counters.overall(),
                checksum_hits: endpoint.counters.logitech_checksum_hits(),
                strategy,
            });
        }
    }
    rows
}

/// Renders rows as a fixed-width text table.
pub fn render_table(rows: &[DeviceSummary]) -> String {
    const HEADERS: [&str; 9] = [
        "SLOT", "ADDRESS", "LOGITECH", "REPORTS", "CAPS", "PLAIN-INJ", "FRAMES", "CKSUM", "STRATEGY",
    ];

    let cells: Vec<[String; 9]> = rows
        .iter()
        .map(|r| {
            [
                r.slot.to_string(),
                r.address.clone(),
                yes_no(r.is_logitech).to_string(),
                r.report_types.clone(),
                r.caps.clone(),
                yes_no(r.vuln_plain_injection).to_string(),
                r.frames.to_string(),
                r.checksum_hits.to_string(),
                r.strategy.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    push_row(&mut out, HEADERS.iter().copied(), &widths);
    for row in &cells {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    if rows.is_empty() {
        out.push_str("(no devices)\n");
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unifying_core::{Frame, RadioAddress, RegistryLimits};

    const KEYBOARD: RadioAddress = RadioAddress([0xDE, 0xAD, 0xBE, 0xEF, 0x07]);
    const MOUSE: RadioAddress = RadioAddress([0xDE, 0xAD, 0xBE, 0xEF, 0x08]);

    fn populated_registry() -> DeviceRegistry {
        let mut registry = DeviceRegistry::new(RegistryLimits::default());
        registry.add_address(&KEYBOARD).unwrap();
        registry.add_address(&MOUSE).unwrap();
        let frame = Frame::from_hex("00 C1 00 04 00 00 00 00 00 3B").unwrap();
        registry.observe_frame(&KEYBOARD, &frame).unwrap();
        registry
    }

    #[test]
    fn test_list_devices_has_one_row_per_prefix() {
        // Arrange
        let registry = populated_registry();

        // Act
        let rows = list_devices(&registry);

        // Assert
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].address, "DE:AD:BE:EF:07");
        assert_eq!(rows[1].address, "DE:AD:BE:EF:08");
        assert_eq!(rows[0].slot, rows[1].slot);
        assert!(rows[0].vuln_plain_injection);
        assert_eq!(rows[0].report_types, "keyboard");
        assert_eq!(rows[0].frames, 1);
        assert_eq!(rows[0].checksum_hits, 1);
        assert_eq!(rows[1].report_types, "-");
        assert_eq!(rows[1].strategy, "plain");
    }

    #[test]
    fn test_degraded_strategy_is_marked() {
        let mut registry = populated_registry();
        registry.capabilities_mut(&KEYBOARD).unwrap().is_encrypted = true;
        let rows = list_devices(&registry);
        assert_eq!(rows[0].strategy, "plain (degraded)");
    }

    #[test]
    fn test_render_table_aligns_columns() {
        // Arrange
        let rows = list_devices(&populated_registry());

        // Act
        let table = render_table(&rows);

        // Assert
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("SLOT"));
        let address_col = lines[0].find("ADDRESS").unwrap();
        assert_eq!(lines[1].find("DE:AD:BE:EF:07"), Some(address_col));
        assert_eq!(lines[2].find("DE:AD:BE:EF:08"), Some(address_col));
    }

    #[test]
    fn test_render_empty_table() {
        let table = render_table(&[]);
        assert!(table.contains("(no devices)"));
    }
}
