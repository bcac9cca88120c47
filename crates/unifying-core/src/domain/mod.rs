//! Domain entities for the Unifying monitor.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What lives here? (for beginners)
//!
//! - [`address`]: the 5-byte radio address and its base/prefix split.
//! - [`device`]: what is known about one device: inferred capabilities and
//!   frame counters per prefix.
//! - [`registry`]: the bounded store of every device seen on the air.
//! - [`inference`]: the rules that turn observed frames into capabilities.
//!
//! None of these types touch a radio, a file or a clock.  Frames go in,
//! knowledge comes out, and everything can be unit-tested in isolation.

pub mod address;
pub mod device;
pub mod inference;
pub mod registry;
