//! Synchronization primitives.
//!
//! The firmware has exactly one sharing pattern: state touched by both an
//! interrupt handler and foreground code. [`IrqSpinLock`] is the primitive
//! for it.

mod irq_spinlock;

pub use irq_spinlock::{IrqSpinLock, IrqSpinLockGuard};
