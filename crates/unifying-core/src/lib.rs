//! # unifying-core
//!
//! Protocol engine for Logitech Unifying wireless keyboards and mice: frame
//! classification, per-device capability inference and keystroke injection
//! frame synthesis.
//!
//! This crate has zero dependencies on radios, files, sockets or async
//! runtimes.  The application crate (`unifying-monitor`) feeds it frames
//! and transmits what it produces.
//!
//! # Architecture overview (for beginners)
//!
//! A Unifying receiver talks to its paired devices over a 2.4 GHz link.
//! Anyone with a suitable radio can listen to that traffic, and a device
//! that accepts unencrypted keyboard reports can be made to type whatever
//! an attacker sends it.  This crate models what can be learned from
//! listening and what can be sent back:
//!
//! - **`protocol`** – The frame buffer, the Unifying checksum and the
//!   stateless classifier that decides which report type a frame carries.
//!
//! - **`domain`** – The radio address codec, the bounded device registry
//!   and the inference engine that accumulates evidence about each device.
//!
//! - **`keymap`** – HID keyboard reports and the US-layout table used to
//!   turn text into keystrokes.
//!
//! - **`injection`** – Chooses how to reach a device given what is known
//!   about it and builds the frame to transmit.
//!
//! Receive path: registry lookup, classification, inference.  Transmit path:
//! capabilities from the registry, strategy selection, frame synthesis.

pub mod domain;
pub mod injection;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `unifying_core::DeviceRegistry` instead of the full module path.
pub use domain::address::{AddressParseError, BaseAddress, RadioAddress};
pub use domain::device::{Capabilities, DeviceCaps, DeviceRecord, Endpoint, FrameCounters, ReportTypes};
pub use domain::inference::{Observation, HYSTERESIS_THRESHOLD};
pub use domain::registry::{DeviceHandle, DeviceRegistry, RegistryError, RegistryLimits};
pub use injection::{
    generate_keyboard_frame, select_strategy, InjectionError, InjectionStrategy, StrategyChoice,
};
pub use keymap::hid::{HidKeyCode, HidKeyboardReport, HidModifiers};
pub use protocol::frame::{Frame, FrameError};
pub use protocol::report::ReportType;
