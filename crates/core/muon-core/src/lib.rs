//! Core support for the muon serial firmware: interrupt control,
//! synchronization, and logging.
//!
//! Everything here is host-testable. The AVR-specific pieces (SREG
//! save/restore, `sei`) are compiled only for the AVR target and fall back to
//! no-ops elsewhere, so the crate can be exercised with `cargo test` and
//! threads on a development machine.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]

pub mod interrupts;
pub mod log;
pub mod static_assert;
pub mod sync;
