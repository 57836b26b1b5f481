//! Serial port driver: interrupt-fed receive ring and foreground API.
//!
//! [`SerialPort`] owns the register interface and a fixed-capacity receive
//! ring. The receive interrupt handler is the ring's only producer and the
//! foreground methods are its only consumer; the ring sits behind an
//! [`IrqSpinLock`] so every head/tail/count mutation is indivisible with
//! respect to the handler. On the uniprocessor AVR target foreground code
//! only ever holds the lock with interrupts masked, so the handler can never
//! observe it held and never spins.
//!
//! Transmit is synchronous: [`write_byte`](SerialPort::write_byte)
//! busy-waits on the transmit-ready flag without bound,
//! [`write_byte_bounded`](SerialPort::write_byte_bounded) with an explicit
//! spin budget.

use core::fmt;

use muon_core::interrupts;
use muon_core::static_assert;
use muon_core::sync::IrqSpinLock;
use muon_driver_api::{ConfigError, SerialRegisters, TxStalledError};
use muon_noalloc::ringbuf::RingBuf;

use crate::progmem::ProgMemBytes;

/// Default receive ring size in bytes.
pub const RX_BUFFER_SIZE: usize = 64;

static_assert!(RX_BUFFER_SIZE.is_power_of_two());

/// An asynchronous serial port: register interface plus interrupt-fed
/// receive ring.
///
/// One instance exists per physical peripheral for the life of the process
/// (the `usart0` module holds the USART0 singleton). Producer/consumer
/// discipline is structural: exactly one place — the receive vector stub —
/// calls [`handle_rx_interrupt`](Self::handle_rx_interrupt), and only the
/// foreground methods pop.
pub struct SerialPort<R, const N: usize = RX_BUFFER_SIZE> {
    regs: R,
    rx: IrqSpinLock<RingBuf<u8, N>>,
}

impl<R: SerialRegisters, const N: usize> SerialPort<R, N> {
    /// Creates a port over `regs` with an empty receive ring.
    pub const fn new(regs: R) -> Self {
        Self {
            regs,
            rx: IrqSpinLock::new(RingBuf::new()),
        }
    }

    /// One-time setup: programs the peripheral (8N1 framing, divisor for
    /// `baud`, receiver/transmitter/receive-interrupt enabled), then turns
    /// on global interrupt delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `baud` is outside the divisor range; the
    /// peripheral is left untouched and interrupts stay off.
    ///
    /// # Safety
    ///
    /// Must be called exactly once, before any other method and before the
    /// receive interrupt can fire.
    pub unsafe fn configure(&self, baud: u32) -> Result<(), ConfigError> {
        // SAFETY: Both one-time/no-concurrency contracts are forwarded to
        // this method's caller.
        unsafe {
            self.regs.configure(baud)?;
            interrupts::enable();
        }
        Ok(())
    }

    /// Receive interrupt entry point. Interrupt context only; must stay the
    /// sole producer for this port's ring.
    ///
    /// The data register is read unconditionally: the read is what clears
    /// the peripheral's receive-complete condition, so it happens even with
    /// nowhere to store the byte. A full ring accepts the byte anyway under
    /// the ring's overwrite policy — the oldest unread byte is destroyed and
    /// the occupancy count stays pinned at capacity. O(1), never blocks.
    pub fn handle_rx_interrupt(&self) {
        let byte = self.regs.read_data();
        self.rx.lock().push_overwrite(byte);
    }

    /// Number of buffered unread bytes. Non-blocking.
    #[must_use]
    pub fn available(&self) -> usize {
        self.rx.lock().len()
    }

    /// Pops the oldest buffered byte, or `None` when the ring is empty.
    /// Non-blocking; between this call and a preceding
    /// [`available`](Self::available) check the count can only have grown.
    pub fn try_read_byte(&self) -> Option<u8> {
        self.rx.lock().pop()
    }

    /// Drains buffered bytes into `buf` until the ring is observed empty,
    /// then appends a NUL terminator. Returns the number of data bytes
    /// written.
    ///
    /// Occupancy is re-checked per byte with the lock released in between,
    /// so bytes arriving mid-drain extend the loop: the result is whatever
    /// had accumulated by the moment an empty ring was observed, not a
    /// framed message. Stops early when `buf` has room for no more data
    /// (the terminator always fits; undrained bytes stay buffered).
    ///
    /// # Panics
    ///
    /// Panics if `buf` is empty — there must be room for the terminator.
    pub fn drain(&self, buf: &mut [u8]) -> usize {
        assert!(!buf.is_empty(), "drain target cannot hold the terminator");
        let mut len = 0;
        while len < buf.len() - 1 {
            match self.try_read_byte() {
                Some(byte) => {
                    buf[len] = byte;
                    len += 1;
                }
                None => break,
            }
        }
        buf[len] = 0;
        len
    }

    /// Writes one byte, busy-waiting for transmit-ready without bound.
    ///
    /// Livelocks if the flag never asserts (hardware fault) — that is the
    /// transmit path's contract. Use
    /// [`write_byte_bounded`](Self::write_byte_bounded) where giving up must
    /// be possible.
    pub fn write_byte(&self, byte: u8) {
        while !self.regs.tx_ready() {
            core::hint::spin_loop();
        }
        self.regs.write_data(byte);
    }

    /// Writes one byte, polling transmit-ready at most `max_spins` times.
    ///
    /// # Errors
    ///
    /// Returns [`TxStalledError`] when the budget runs out; nothing has been
    /// written to the data register in that case.
    pub fn write_byte_bounded(&self, byte: u8, max_spins: u32) -> Result<(), TxStalledError> {
        for _ in 0..max_spins {
            if self.regs.tx_ready() {
                self.regs.write_data(byte);
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(TxStalledError)
    }

    /// Writes every byte of `bytes` in order, blocking per byte.
    pub fn write_bytes(&self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte);
        }
    }

    /// Writes the UTF-8 bytes of `text`, blocking per byte.
    ///
    /// Slices carry their length, so no terminator ever reaches the wire.
    pub fn write_str(&self, text: &str) {
        self.write_bytes(text.as_bytes());
    }

    /// Writes a byte string held in read-only program memory, blocking per
    /// byte. Source bytes are fetched through the program-memory accessor,
    /// so the text never has to occupy RAM.
    pub fn write_progmem<const LEN: usize>(&self, text: &ProgMemBytes<LEN>) {
        for index in 0..text.len() {
            self.write_byte(text.read_byte(index));
        }
    }
}

/// [`fmt::Write`] adapter so a port can carry formatted output (e.g., as the
/// [`muon_core::log`] sink).
///
/// Line endings pass through untouched — CR/LF is the application's
/// convention, not the driver's.
pub struct SerialWriter<'a, R, const N: usize>(pub &'a SerialPort<R, N>);

impl<R: SerialRegisters, const N: usize> fmt::Write for SerialWriter<'_, R, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s);
        Ok(())
    }
}
