//! Interface layer between the serial driver core and its register access.
//!
//! The driver core (`muon-usart`) is written against the [`SerialRegisters`]
//! trait rather than a concrete peripheral, so the same core drives the
//! memory-mapped USART block on hardware and the simulated register file
//! (`muon-sim`) in host tests.

#![cfg_attr(not(test), no_std)]

pub mod error;
pub mod serial;

pub use error::{ConfigError, TxStalledError};
pub use serial::{SerialRegisters, baud_divisor};
