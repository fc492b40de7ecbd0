//! GPIO register block driver (BCM2835 family).
//!
//! Register map, as word offsets into the mapped block:
//!
//! | Word    | Register | Purpose                                   |
//! |---------|----------|-------------------------------------------|
//! | 0..=5   | GPFSELn  | function select, 10 pins × 3 bits per word |
//! | 7, 8    | GPSETn   | set output high — write-1-to-set only      |
//! | 10, 11  | GPCLRn   | set output low — write-1-to-clear only     |
//! | 13, 14  | GPLEVn   | pin level readback                         |
//!
//! Set/clear use dedicated write-1 registers rather than read-modify-write,
//! so operations on different pins never race at the register level.
//! Function select is the sole read-modify-write path and is only touched
//! during bring-up.
//!
//! The bank is generic over [`Registers`] so tests drive it against a
//! RAM-backed fake instead of a live mapping.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::error::Error;
use crate::mmio::{Peripheral, Registers};

/// Physical base of the BCM2708 peripheral window.
pub const PERIPHERAL_BASE: u64 = 0x2000_0000;

/// Physical base of the GPIO register block.
pub const GPIO_BASE: u64 = PERIPHERAL_BASE + 0x20_0000;

/// Highest valid BCM pin number, exclusive.
pub const PIN_COUNT: u8 = 54;

const GPFSEL0: usize = 0;
const GPSET0: usize = 7;
const GPCLR0: usize = 10;
const GPLEV0: usize = 13;

/// Pins per function-select register.
const FSEL_PINS_PER_REG: usize = 10;
/// Width of one function-select field.
const FSEL_FIELD_MASK: u32 = 0b111;
/// Function-select encoding: output.
const FSEL_OUTPUT: u32 = 0b001;

fn fsel_slot(pin: u8) -> (usize, u32) {
    let reg = GPFSEL0 + pin as usize / FSEL_PINS_PER_REG;
    let shift = (pin as usize % FSEL_PINS_PER_REG * 3) as u32;
    (reg, shift)
}

fn level_slot(base: usize, pin: u8) -> (usize, u32) {
    (base + pin as usize / 32, 1 << (pin as u32 % 32))
}

/// The GPIO register bank.
pub struct GpioBank<R: Registers = Peripheral> {
    regs: R,
}

impl GpioBank<Peripheral> {
    /// Map the GPIO block at [`GPIO_BASE`] through `/dev/mem`.
    pub fn map() -> Result<Self, Error> {
        Ok(Self {
            regs: Peripheral::map(GPIO_BASE)?,
        })
    }
}

impl<R: Registers> GpioBank<R> {
    /// Wrap an already-acquired register region (used by tests).
    pub fn with_registers(regs: R) -> Self {
        Self { regs }
    }

    /// Configure `pin` as an input: clear its 3-bit function-select field.
    pub fn configure_input(&self, pin: u8) {
        debug_assert!(pin < PIN_COUNT);
        let (reg, shift) = fsel_slot(pin);
        let v = self.regs.read(reg);
        self.regs.write(reg, v & !(FSEL_FIELD_MASK << shift));
    }

    /// Configure `pin` as an output: clear the field, then set the output
    /// encoding. Idempotent.
    pub fn configure_output(&self, pin: u8) {
        debug_assert!(pin < PIN_COUNT);
        let (reg, shift) = fsel_slot(pin);
        let v = self.regs.read(reg);
        self.regs.write(reg, v & !(FSEL_FIELD_MASK << shift));
        let v = self.regs.read(reg);
        self.regs.write(reg, v | (FSEL_OUTPUT << shift));
    }

    /// Drive `pin` high via the write-1-to-set register.
    pub fn set_high(&self, pin: u8) {
        debug_assert!(pin < PIN_COUNT);
        let (reg, bit) = level_slot(GPSET0, pin);
        self.regs.write(reg, bit);
    }

    /// Drive `pin` low via the write-1-to-clear register.
    pub fn set_low(&self, pin: u8) {
        debug_assert!(pin < PIN_COUNT);
        let (reg, bit) = level_slot(GPCLR0, pin);
        self.regs.write(reg, bit);
    }

    /// Read the current level of `pin`.
    pub fn read_level(&self, pin: u8) -> bool {
        debug_assert!(pin < PIN_COUNT);
        let (reg, bit) = level_slot(GPLEV0, pin);
        self.regs.read(reg) & bit != 0
    }

    /// Borrow the underlying register region.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// A per-pin handle borrowing this bank.
    pub fn pin(&self, index: u8) -> Pin<'_, R> {
        debug_assert!(index < PIN_COUNT);
        Pin { bank: self, index }
    }
}

/// A single pin of a [`GpioBank`].
///
/// Implements the `embedded-hal` digital traits so adapters and mocks meet
/// drivers at the standard contract. Level operations cannot fail once the
/// block is mapped, hence `Error = Infallible`.
pub struct Pin<'a, R: Registers> {
    bank: &'a GpioBank<R>,
    index: u8,
}

impl<R: Registers> ErrorType for Pin<'_, R> {
    type Error = Infallible;
}

impl<R: Registers> OutputPin for Pin<'_, R> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.bank.set_low(self.index);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.bank.set_high(self.index);
        Ok(())
    }
}

impl<R: Registers> InputPin for Pin<'_, R> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.bank.read_level(self.index))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.bank.read_level(self.index))
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
