//! Process-wide USART0 port and its receive vector binding.
//!
//! There is exactly one [`SerialPort`] per physical peripheral, alive for
//! the whole process. The `USART_RX` vector stub below is the only caller of
//! the port's receive entry point, which makes the interrupt handler the
//! ring's single producer by construction; everything else goes through the
//! foreground methods on [`port`].

use core::fmt::Write;

use muon_core::log::Level;
use muon_driver_api::ConfigError;

use crate::regs::{USART0_BASE, Usart};
use crate::serial::{RX_BUFFER_SIZE, SerialPort, SerialWriter};

/// Board input clock in Hz.
pub const F_CPU: u32 = 16_000_000;

static PORT: SerialPort<Usart, RX_BUFFER_SIZE> =
    SerialPort::new(Usart::new(USART0_BASE, F_CPU));

/// The USART0 port, for foreground use. The receive path is owned by the
/// vector stub and must not be called from here.
#[must_use]
pub fn port() -> &'static SerialPort<Usart, RX_BUFFER_SIZE> {
    &PORT
}

/// One-time USART0 setup at `baud`; enables global interrupt delivery.
///
/// # Errors
///
/// Returns [`ConfigError`] if `baud` is outside the divisor range.
///
/// # Safety
///
/// Forwards [`SerialPort::configure`]'s contract: call exactly once, before
/// any other use of the port.
pub unsafe fn configure(baud: u32) -> Result<(), ConfigError> {
    // SAFETY: Contract forwarded to the caller.
    unsafe { PORT.configure(baud) }
}

/// Routes [`muon_core::log`] output to USART0.
///
/// Call after [`configure`]; records emitted before that would have gone to
/// an unconfigured line.
pub fn install_log_sink() {
    // SAFETY: The sink only uses the port's blocking write path, which is
    // callable from any context that tolerates busy-waiting.
    unsafe { muon_core::log::set_sink(usart0_sink) };
}

fn usart0_sink(level: Option<Level>, args: core::fmt::Arguments<'_>) {
    let mut writer = SerialWriter(&PORT);
    if let Some(level) = level {
        let _ = write!(writer, "[{}] ", level.name());
    }
    let _ = writer.write_fmt(args);
}

/// USART receive-complete vector (vector 18 on the ATmega328P). One byte has
/// been fully received; hand it to the port's ring.
#[unsafe(no_mangle)]
extern "avr-interrupt" fn __vector_18() {
    PORT.handle_rx_interrupt();
}
