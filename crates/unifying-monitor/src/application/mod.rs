//! Application layer use cases for the monitor.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure protocol rules in `unifying-core`) and the infrastructure (radio,
//! files, configuration).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil an operator goal (e.g., "learn
//!   what every device on the air can do").
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so a capture replayer and a live radio are interchangeable.
//!
//! # Sub-modules
//!
//! - **`process_frames`** – The receive path: registers senders, runs the
//!   inference engine and keeps pipeline totals.  Runs on every frame.
//!
//! - **`inject_keystrokes`** – The transmit path: turns text into forged
//!   keyboard frames for a target device.
//!
//! - **`list_devices`** – Flattens the registry into printable rows.

pub mod inject_keystrokes;
pub mod list_devices;
pub mod process_frames;
