//! Simulated USART register file.
//!
//! [`SimUsart`] implements [`SerialRegisters`] over plain memory so driver
//! behavior can be exercised on the host: tests inject received bytes,
//! capture everything written to the transmit register, inspect the recorded
//! line configuration, and stall the transmit-ready flag to provoke the
//! bounded-wait paths.
//!
//! Handles are cheap clones over shared state, so a test keeps one handle as
//! its view of the wire after moving another into the driver. There is no
//! interrupt controller here: after injecting a byte, the test plays that
//! role by invoking the driver's receive entry point itself.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use muon_driver_api::{ConfigError, SerialRegisters, baud_divisor};

/// Line configuration recorded by a [`SerialRegisters::configure`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineConfig {
    /// Requested baud rate.
    pub baud: u32,
    /// Divisor programmed for that rate.
    pub divisor: u16,
}

/// A simulated USART. Clones share the same underlying register file.
#[derive(Clone)]
pub struct SimUsart {
    inner: Arc<Inner>,
}

struct Inner {
    clock_hz: u32,
    config: Mutex<Option<LineConfig>>,
    rx_fifo: Mutex<VecDeque<u8>>,
    tx_log: Mutex<Vec<u8>>,
    tx_ready: AtomicBool,
}

impl SimUsart {
    /// Creates a simulated USART clocked at `clock_hz`, transmit-ready.
    #[must_use]
    pub fn new(clock_hz: u32) -> Self {
        Self {
            inner: Arc::new(Inner {
                clock_hz,
                config: Mutex::new(None),
                rx_fifo: Mutex::new(VecDeque::new()),
                tx_log: Mutex::new(Vec::new()),
                tx_ready: AtomicBool::new(true),
            }),
        }
    }

    /// Makes `byte` the next value readable from the receive data register.
    pub fn inject(&self, byte: u8) {
        self.inner.rx_fifo.lock().unwrap().push_back(byte);
    }

    /// Sets the transmit-ready flag; `false` simulates a stalled transmitter.
    pub fn set_tx_ready(&self, ready: bool) {
        self.inner.tx_ready.store(ready, Ordering::Release);
    }

    /// Everything written to the transmit data register so far.
    #[must_use]
    pub fn transmitted(&self) -> Vec<u8> {
        self.inner.tx_log.lock().unwrap().clone()
    }

    /// Returns and clears the transmit capture.
    pub fn take_transmitted(&self) -> Vec<u8> {
        std::mem::take(&mut *self.inner.tx_log.lock().unwrap())
    }

    /// The configuration recorded by `configure`, if it has run.
    #[must_use]
    pub fn line_config(&self) -> Option<LineConfig> {
        *self.inner.config.lock().unwrap()
    }
}

impl SerialRegisters for SimUsart {
    unsafe fn configure(&self, baud: u32) -> Result<(), ConfigError> {
        let divisor = baud_divisor(self.inner.clock_hz, baud)?;
        *self.inner.config.lock().unwrap() = Some(LineConfig { baud, divisor });
        Ok(())
    }

    fn tx_ready(&self) -> bool {
        self.inner.tx_ready.load(Ordering::Acquire)
    }

    fn write_data(&self, byte: u8) {
        self.inner.tx_log.lock().unwrap().push(byte);
    }

    fn read_data(&self) -> u8 {
        // Real hardware hands back whatever the data register holds; an
        // empty FIFO reads as zero rather than blocking.
        self.inner.rx_fifo.lock().unwrap().pop_front().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injected_bytes_read_in_order() {
        let sim = SimUsart::new(16_000_000);
        sim.inject(b'a');
        sim.inject(b'b');
        assert_eq!(sim.read_data(), b'a');
        assert_eq!(sim.read_data(), b'b');
        // Drained register file reads as zero.
        assert_eq!(sim.read_data(), 0);
    }

    #[test]
    fn writes_are_captured() {
        let sim = SimUsart::new(16_000_000);
        sim.write_data(b'x');
        sim.write_data(b'y');
        assert_eq!(sim.transmitted(), b"xy");
        assert_eq!(sim.take_transmitted(), b"xy");
        assert!(sim.transmitted().is_empty());
    }

    #[test]
    fn configure_records_divisor() {
        let sim = SimUsart::new(16_000_000);
        assert_eq!(sim.line_config(), None);
        // SAFETY: No concurrent access; nothing here is hardware.
        unsafe { sim.configure(9_600).unwrap() };
        assert_eq!(
            sim.line_config(),
            Some(LineConfig {
                baud: 9_600,
                divisor: 103
            })
        );
    }

    #[test]
    fn clones_share_the_register_file() {
        let sim = SimUsart::new(16_000_000);
        let wire = sim.clone();
        sim.write_data(b'!');
        assert_eq!(wire.transmitted(), b"!");
    }

    #[test]
    fn tx_ready_can_stall() {
        let sim = SimUsart::new(16_000_000);
        assert!(sim.tx_ready());
        sim.set_tx_ready(false);
        assert!(!sim.tx_ready());
    }
}
