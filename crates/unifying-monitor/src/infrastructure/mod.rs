//! Infrastructure layer for the monitor.
//!
//! Contains the adapters that touch the outside world: capture files, the
//! radio interface, configuration storage and the shared state handed to
//! every task.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `unifying_core`, but the domain layer never imports it.

pub mod capture;
pub mod radio;
pub mod state;
pub mod storage;
