//! ATmega328P USART0 memory-mapped register block.
//!
//! Register map per the ATmega328P datasheet; the block starts at 0xC0 in
//! data space. The base address is a constructor parameter so the
//! register-level logic can be pointed at plain memory in host tests.

use core::ptr;

use bitflags::bitflags;
use muon_driver_api::{ConfigError, SerialRegisters, baud_divisor};

/// Register offsets from the USART base address.
mod reg {
    /// Control and Status Register A (flags).
    pub const UCSRA: usize = 0;
    /// Control and Status Register B (interrupt and enable bits).
    pub const UCSRB: usize = 1;
    /// Control and Status Register C (framing).
    pub const UCSRC: usize = 2;
    /// Baud Rate Register, low byte. (Offset 3 is reserved.)
    pub const UBRRL: usize = 4;
    /// Baud Rate Register, high byte.
    pub const UBRRH: usize = 5;
    /// Data register, shared by receive and transmit.
    pub const UDR: usize = 6;
}

bitflags! {
    /// Control and Status Register A bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UcsrA: u8 {
        /// Receive complete: unread data in the receive buffer.
        const RXC       = 1 << 7;
        /// Transmit complete: shift register drained.
        const TXC       = 1 << 6;
        /// Data register empty: the transmit buffer can accept a byte.
        const UDRE      = 1 << 5;
        /// Frame error on the byte in the receive buffer.
        const FE        = 1 << 4;
        /// Data overrun in the receive shift register.
        const DOR       = 1 << 3;
        /// Parity error on the byte in the receive buffer.
        const UPE       = 1 << 2;
        /// Double-speed asynchronous mode.
        const U2X       = 1 << 1;
        /// Multi-processor communication mode.
        const MPCM      = 1 << 0;
    }
}

bitflags! {
    /// Control and Status Register B bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UcsrB: u8 {
        /// Receive-complete interrupt enable.
        const RXCIE     = 1 << 7;
        /// Transmit-complete interrupt enable.
        const TXCIE     = 1 << 6;
        /// Data-register-empty interrupt enable.
        const UDRIE     = 1 << 5;
        /// Receiver enable.
        const RXEN      = 1 << 4;
        /// Transmitter enable.
        const TXEN      = 1 << 3;
        /// Character size bit 2 (9-bit frames).
        const UCSZ2     = 1 << 2;
        /// Ninth receive data bit.
        const RXB8      = 1 << 1;
        /// Ninth transmit data bit.
        const TXB8      = 1 << 0;
    }
}

bitflags! {
    /// Control and Status Register C bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UcsrC: u8 {
        /// Mode select bit 1 (synchronous / SPI modes).
        const UMSEL1    = 1 << 7;
        /// Mode select bit 0.
        const UMSEL0    = 1 << 6;
        /// Parity mode bit 1.
        const UPM1      = 1 << 5;
        /// Parity mode bit 0.
        const UPM0      = 1 << 4;
        /// Two stop bits when set.
        const USBS      = 1 << 3;
        /// Character size bit 1.
        const UCSZ1     = 1 << 2;
        /// Character size bit 0.
        const UCSZ0     = 1 << 1;
        /// Clock polarity (synchronous mode only).
        const UCPOL     = 1 << 0;

        /// Asynchronous mode, 8 data bits, no parity, one stop bit.
        const EIGHT_N_ONE = Self::UCSZ1.bits() | Self::UCSZ0.bits();
    }
}

/// USART0 base address in ATmega328P data space.
pub const USART0_BASE: usize = 0xC0;

/// A memory-mapped AVR USART identified by its base address and input clock.
///
/// `Copy` and stateless beyond the two parameters, so handles can live in
/// `static` items or be rebuilt on the stack at no cost. Does not touch
/// hardware until a method is called.
#[derive(Debug, Clone, Copy)]
pub struct Usart {
    base: usize,
    clock_hz: u32,
}

impl Usart {
    /// Creates a handle over the register block at `base`, clocked at
    /// `clock_hz`. Does **not** touch hardware.
    #[must_use]
    pub const fn new(base: usize, clock_hz: u32) -> Self {
        Self { base, clock_hz }
    }

    #[inline]
    fn read_reg(&self, offset: usize) -> u8 {
        // SAFETY: `base` points at a USART register block (or a
        // test-provided stand-in) valid for volatile byte access at offsets
        // 0..=6.
        unsafe { ptr::read_volatile((self.base + offset) as *const u8) }
    }

    #[inline]
    fn write_reg(&self, offset: usize, value: u8) {
        // SAFETY: Same addressing contract as `read_reg`.
        unsafe { ptr::write_volatile((self.base + offset) as *mut u8, value) }
    }

    /// Current status flags (UCSRnA).
    #[must_use]
    pub fn status(&self) -> UcsrA {
        UcsrA::from_bits_truncate(self.read_reg(reg::UCSRA))
    }
}

impl SerialRegisters for Usart {
    unsafe fn configure(&self, baud: u32) -> Result<(), ConfigError> {
        let divisor = baud_divisor(self.clock_hz, baud)?;

        // 1. Normal speed, no multi-processor mode, flags cleared.
        self.write_reg(reg::UCSRA, UcsrA::empty().bits());

        // 2. Divisor, high byte first: the low-byte write latches the pair.
        self.write_reg(reg::UBRRH, (divisor >> 8) as u8);
        self.write_reg(reg::UBRRL, (divisor & 0xFF) as u8);

        // 3. Asynchronous mode, 8 data bits, no parity, one stop bit.
        self.write_reg(reg::UCSRC, UcsrC::EIGHT_N_ONE.bits());

        // 4. Receiver, transmitter, and receive-complete interrupt on.
        self.write_reg(reg::UCSRB, (UcsrB::RXCIE | UcsrB::RXEN | UcsrB::TXEN).bits());

        Ok(())
    }

    fn tx_ready(&self) -> bool {
        self.status().contains(UcsrA::UDRE)
    }

    fn write_data(&self, byte: u8) {
        self.write_reg(reg::UDR, byte);
    }

    fn read_data(&self) -> u8 {
        self.read_reg(reg::UDR)
    }
}
