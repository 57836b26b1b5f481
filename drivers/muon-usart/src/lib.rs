//! Interrupt-driven USART driver.
//!
//! Receive is asynchronous: the hardware raises an interrupt per received
//! byte, and the handler pushes it into a fixed-capacity circular buffer
//! that foreground code polls and drains at its leisure. Transmit is
//! synchronous, busy-waiting on the transmit-ready flag byte by byte.
//!
//! Modules:
//!
//! - [`serial`] — the driver core: [`SerialPort`] over any
//!   [`muon_driver_api::SerialRegisters`] implementation.
//! - [`regs`] — the memory-mapped ATmega328P USART0 register block.
//! - [`progmem`] — byte strings kept in read-only program memory.
//! - `usart0` — the process-wide USART0 instance and its receive vector
//!   binding (AVR targets only).

#![cfg_attr(not(test), no_std)]
#![cfg_attr(
    target_arch = "avr",
    feature(asm_experimental_arch, abi_avr_interrupt)
)]

pub mod progmem;
pub mod regs;
pub mod serial;
#[cfg(target_arch = "avr")]
pub mod usart0;

pub use serial::{RX_BUFFER_SIZE, SerialPort, SerialWriter};
