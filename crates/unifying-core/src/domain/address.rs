//! Radio address codec.
//!
//! A Unifying receiver listens on a 5-byte address.  The first four bytes
//! form the *base* shared by every device paired to that receiver, the last
//! byte is the *prefix* that tells the paired devices apart (keyboard,
//! mouse, ...).  The registry keys devices by base and then by prefix.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of an over-the-air radio address.
pub const ADDRESS_LEN: usize = 5;

/// Length of the base part of an address.
pub const BASE_LEN: usize = 4;

/// Errors produced when parsing a textual radio address.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressParseError {
    /// The address does not have exactly five colon-separated parts.
    #[error("expected {ADDRESS_LEN} colon-separated bytes, got {0}")]
    WrongLength(usize),

    /// One part is not a two-digit hex byte.
    #[error("invalid address byte {0:?}")]
    InvalidByte(String),
}

/// The 4-byte base of a radio address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaseAddress(pub [u8; BASE_LEN]);

/// A full 5-byte radio address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RadioAddress(pub [u8; ADDRESS_LEN]);

impl RadioAddress {
    /// Joins a base and a prefix into a full address.
    pub fn from_parts(base: BaseAddress, prefix: u8) -> Self {
        let [b0, b1, b2, b3] = base.0;
        Self([b0, b1, b2, b3, prefix])
    }

    /// Splits the address into its base and prefix.
    pub fn split(&self) -> (BaseAddress, u8) {
        let [b0, b1, b2, b3, prefix] = self.0;
        (BaseAddress([b0, b1, b2, b3]), prefix)
    }

    /// The base part of the address.
    pub fn base(&self) -> BaseAddress {
        self.split().0
    }

    /// The prefix byte of the address.
    pub fn prefix(&self) -> u8 {
        self.0[ADDRESS_LEN - 1]
    }
}

impl FromStr for RadioAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != ADDRESS_LEN {
            return Err(AddressParseError::WrongLength(parts.len()));
        }
        let mut bytes = [0u8; ADDRESS_LEN];
        for (slot, part) in bytes.iter_mut().zip(&parts) {
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(AddressParseError::InvalidByte(part.to_string()));
            }
            *slot = u8::from_str_radix(part, 16)
                .map_err(|_| AddressParseError::InvalidByte(part.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl std::fmt::Display for RadioAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, e] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}")
    }
}

impl std::fmt::Display for BaseAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}")
    }
}
