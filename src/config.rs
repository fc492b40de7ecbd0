//! System configuration.
//!
//! The schedule table, pin roles, and poll cadence live here rather than
//! as literal constants, keeping board topology out of the scheduler and
//! pin layers. The built-in [`Default`] is the production watering table;
//! an optional JSON file can override it.

use heapless::Vec as BoundedVec;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::clock::TimeOfDay;
use crate::error::Error;
use crate::gpio::PIN_COUNT;

/// Maximum trigger times per pump (fixed capacity, no heap per pump).
pub const TRIGGER_TIMES_MAX: usize = 16;

/// Fixed pin roles shared by the whole controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinRoles {
    /// Input: when sampled high, the control loop stops and shuts down.
    pub exit: u8,
    /// Input: heartbeat ping source.
    pub ping_in: u8,
    /// Output: mirrors `ping_in` every poll cycle.
    pub ping_out: u8,
}

/// Static description of one pump. Set once at startup, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PumpSpec {
    /// BCM output pin driving the pump relay.
    pub pin: u8,
    /// Times of day at which the pump starts. Checked in this order;
    /// the first match wins.
    pub triggers: BoundedVec<TimeOfDay, TRIGGER_TIMES_MAX>,
    /// Run duration per activation, milliseconds.
    pub duration_ms: u32,
}

/// Trigger matching policy. See `scheduler` for semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMatching {
    /// Match only when a boundary sample lands exactly on the trigger
    /// second (the historical behavior, kept as the default).
    #[default]
    EdgeHit,
    /// Match when the trigger second falls anywhere inside the sampled
    /// window. Opt-in variant; never enabled silently.
    Interval,
}

/// Core system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub pins: PinRoles,
    pub pumps: Vec<PumpSpec>,
    /// Control loop period, milliseconds.
    pub poll_interval_ms: u32,
    #[serde(default)]
    pub trigger_matching: TriggerMatching,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut garden = BoundedVec::new();
        let _ = garden.push(TimeOfDay::new(9, 0, 0));
        let _ = garden.push(TimeOfDay::new(21, 0, 0));

        let mut greenhouse = BoundedVec::new();
        let _ = greenhouse.push(TimeOfDay::new(19, 6, 0));
        let _ = greenhouse.push(TimeOfDay::new(19, 6, 10));
        let _ = greenhouse.push(TimeOfDay::new(19, 6, 20));

        Self {
            pins: PinRoles {
                exit: 8,
                ping_in: 25,
                ping_out: 7,
            },
            pumps: vec![
                PumpSpec {
                    pin: 22,
                    triggers: garden,
                    duration_ms: 10 * 1000,
                },
                PumpSpec {
                    pin: 27,
                    triggers: greenhouse,
                    duration_ms: 5 * 1000,
                },
            ],
            poll_interval_ms: 500,
            trigger_matching: TriggerMatching::EdgeHit,
        }
    }
}

impl SystemConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the hardware or scheduler cannot honour.
    /// Invalid values are refused, not clamped.
    pub fn validate(&self) -> Result<(), Error> {
        let mut used = [false; PIN_COUNT as usize];
        let mut claim = |pin: u8, what: &'static str| -> Result<(), Error> {
            if pin >= PIN_COUNT {
                return Err(Error::Config(what));
            }
            if std::mem::replace(&mut used[pin as usize], true) {
                return Err(Error::Config("pin assigned to more than one role"));
            }
            Ok(())
        };

        claim(self.pins.exit, "exit pin out of range")?;
        claim(self.pins.ping_in, "ping input pin out of range")?;
        claim(self.pins.ping_out, "ping output pin out of range")?;

        for pump in &self.pumps {
            claim(pump.pin, "pump pin out of range")?;
            if pump.duration_ms == 0 {
                return Err(Error::Config("pump duration must be non-zero"));
            }
            if pump.triggers.iter().any(|t| !t.is_valid()) {
                return Err(Error::Config("trigger time out of range"));
            }
        }

        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll interval must be non-zero"));
        }
        Ok(())
    }
}
