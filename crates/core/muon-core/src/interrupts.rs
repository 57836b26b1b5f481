//! Global interrupt control.
//!
//! On AVR this drives the `I` bit in the status register. Other targets have
//! no interrupt flag to speak of: the functions become no-ops there, which is
//! exactly what host tests want (exclusion is provided by the lock layer on
//! top, see [`crate::sync::IrqSpinLock`]).

/// Enables global interrupt delivery (`sei` on AVR).
///
/// # Safety
///
/// Once enabled, every registered interrupt handler may preempt the current
/// context at any instruction boundary. The caller must ensure all handlers,
/// and the state they touch, are fully initialized.
#[inline]
pub unsafe fn enable() {
    #[cfg(target_arch = "avr")]
    // SAFETY: `sei` only sets the interrupt-enable bit.
    unsafe {
        core::arch::asm!("sei", options(nomem, nostack));
    }
}

/// Saves the current interrupt state and disables interrupts.
///
/// Returns the saved state for [`restore`]. On non-AVR targets there is no
/// state to save and the return value is zero.
#[inline]
#[must_use]
pub fn save_and_disable() -> u8 {
    #[cfg(target_arch = "avr")]
    {
        let sreg: u8;
        // SAFETY: Reading SREG and clearing the interrupt-enable bit has no
        // other effect on machine state.
        unsafe {
            core::arch::asm!(
                "in {sreg}, 0x3F",
                "cli",
                sreg = out(reg) sreg,
                options(nomem, nostack),
            );
        }
        sreg
    }
    #[cfg(not(target_arch = "avr"))]
    {
        0
    }
}

/// Restores interrupt state previously saved by [`save_and_disable`].
#[inline]
pub fn restore(saved: u8) {
    #[cfg(target_arch = "avr")]
    // SAFETY: Writing back the saved SREG restores exactly the state captured
    // by `save_and_disable`, interrupt-enable bit included.
    unsafe {
        core::arch::asm!(
            "out 0x3F, {sreg}",
            sreg = in(reg) saved,
            options(nomem, nostack),
        );
    }
    #[cfg(not(target_arch = "avr"))]
    {
        let _ = saved;
    }
}
