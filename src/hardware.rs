//! Hardware adapter — binds mapped GPIO pins to the domain port traits.
//!
//! The only module in the system that touches live registers. Owns one
//! [`Pin`] per configured role, configured for direction at construction,
//! and exposes them through [`GpioPort`]. Pin handles meet the adapter at
//! the `embedded-hal` digital traits, which is also how the mock adapters
//! in the integration tests are shaped.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::SystemConfig;
use crate::gpio::{GpioBank, Pin};
use crate::mmio::Registers;
use crate::ports::GpioPort;

/// Concrete adapter over a mapped GPIO bank.
pub struct HardwareAdapter<'a, R: Registers> {
    exit: Pin<'a, R>,
    ping_in: Pin<'a, R>,
    ping_out: Pin<'a, R>,
    pumps: Vec<Pin<'a, R>>,
}

impl<'a, R: Registers> HardwareAdapter<'a, R> {
    /// Configure pin directions per `config` and take per-pin handles.
    /// All outputs start deasserted.
    pub fn new(bank: &'a GpioBank<R>, config: &SystemConfig) -> Self {
        bank.configure_input(config.pins.exit);
        bank.configure_input(config.pins.ping_in);
        bank.configure_output(config.pins.ping_out);

        let mut ping_out = bank.pin(config.pins.ping_out);
        let _ = ping_out.set_low();

        let mut pumps = Vec::with_capacity(config.pumps.len());
        for spec in &config.pumps {
            bank.configure_output(spec.pin);
            let mut pin = bank.pin(spec.pin);
            let _ = pin.set_low();
            pumps.push(pin);
        }

        Self {
            exit: bank.pin(config.pins.exit),
            ping_in: bank.pin(config.pins.ping_in),
            ping_out,
            pumps,
        }
    }
}

impl<R: Registers> GpioPort for HardwareAdapter<'_, R> {
    fn set_pump(&mut self, pump: usize, on: bool) {
        if let Some(pin) = self.pumps.get_mut(pump) {
            if on {
                let _ = pin.set_high();
            } else {
                let _ = pin.set_low();
            }
        }
    }

    fn exit_requested(&mut self) -> bool {
        self.exit.is_high().unwrap_or(false)
    }

    fn mirror_ping(&mut self) {
        if self.ping_in.is_high().unwrap_or(false) {
            let _ = self.ping_out.set_high();
        } else {
            let _ = self.ping_out.set_low();
        }
    }

    fn all_off(&mut self) {
        let _ = self.ping_out.set_low();
        for pin in &mut self.pumps {
            let _ = pin.set_low();
        }
    }
}
