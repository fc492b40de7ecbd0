//! Per-pump scheduling state machine.
//!
//! Each pump is a two-state machine, stepped once per poll cycle:
//!
//! ```text
//!            trigger time matched
//!   INACTIVE ────────────────────▶ ACTIVE
//!      ▲                             │
//!      └─────────────────────────────┘
//!        elapsed_ms >= duration_ms
//! ```
//!
//! At most one transition per pump per poll: an active pump only checks
//! its duration, an inactive pump only checks its triggers. The elapsed
//! counter resets to 0 on every activation, grows by the poll cycle's
//! monotonic delta while active, and is meaningless while inactive.
//!
//! ## Trigger matching
//!
//! The default policy is *edge hit*: a trigger fires only when the current
//! or the previous wall-clock sample equals it exactly. This covers both
//! boundaries of a poll step but not the interior — if two consecutive
//! samples straddle the trigger second without landing on it, the trigger
//! is missed. That is a deliberate, known approximation carried over from
//! the original controller; the interval-containment policy is available
//! as an explicit opt-in, never as a silent change.

use log::debug;

use crate::clock::{ClockDelta, TimeOfDay};
use crate::config::{PumpSpec, TriggerMatching};
use crate::ports::{EventSink, GpioPort};
use crate::events::PumpEvent;

impl TriggerMatching {
    /// Does `trigger` fire for the poll window `prev ..= now`?
    ///
    /// `prev` is `None` on the very first poll cycle, which then matches
    /// on the current sample alone under either policy.
    pub fn matches(self, trigger: TimeOfDay, prev: Option<TimeOfDay>, now: TimeOfDay) -> bool {
        match self {
            Self::EdgeHit => now == trigger || prev == Some(trigger),
            Self::Interval => {
                let Some(prev) = prev else {
                    return now == trigger;
                };
                let (t, p, n) = (
                    trigger.seconds_of_day(),
                    prev.seconds_of_day(),
                    now.seconds_of_day(),
                );
                if p <= n {
                    p <= t && t <= n
                } else {
                    // Window wraps midnight.
                    t >= p || t <= n
                }
            }
        }
    }
}

/// Mutable per-pump state, exclusively owned by the scheduler.
#[derive(Debug)]
struct PumpUnit {
    spec: PumpSpec,
    active: bool,
    elapsed_ms: u32,
}

/// Drives every pump's state machine from the control loop's clock samples.
pub struct PumpScheduler {
    units: Vec<PumpUnit>,
    matching: TriggerMatching,
}

impl PumpScheduler {
    pub fn new(pumps: &[PumpSpec], matching: TriggerMatching) -> Self {
        Self {
            units: pumps
                .iter()
                .map(|spec| PumpUnit {
                    spec: spec.clone(),
                    active: false,
                    elapsed_ms: 0,
                })
                .collect(),
            matching,
        }
    }

    /// Number of pumps currently active.
    pub fn active_count(&self) -> usize {
        self.units.iter().filter(|u| u.active).count()
    }

    /// Step every pump once for the current poll cycle.
    ///
    /// # Parameters
    ///
    /// * `prev` — the previous poll's wall-clock sample (`None` on the
    ///   first cycle).
    /// * `now` — the current wall-clock sample.
    /// * `delta` — monotonic time elapsed since the previous cycle (zero
    ///   on the first cycle).
    /// * `gpio` — receives pin commands.
    /// * `sink` — receives activation/deactivation events.
    pub fn step(
        &mut self,
        prev: Option<TimeOfDay>,
        now: TimeOfDay,
        delta: ClockDelta,
        gpio: &mut dyn GpioPort,
        sink: &mut dyn EventSink,
    ) {
        let delta_ms = delta.millis();

        for (i, unit) in self.units.iter_mut().enumerate() {
            if unit.active {
                unit.elapsed_ms = unit.elapsed_ms.saturating_add(delta_ms);
                if unit.elapsed_ms >= unit.spec.duration_ms {
                    unit.active = false;
                    gpio.set_pump(i, false);
                    sink.emit(&PumpEvent::Deactivated {
                        pump: i,
                        at: now,
                        ran_ms: unit.elapsed_ms,
                    });
                }
            } else {
                // First matching trigger wins; the rest are not evaluated
                // this cycle.
                for &trigger in &unit.spec.triggers {
                    if self.matching.matches(trigger, prev, now) {
                        debug!("pump {i}: trigger {trigger} matched");
                        unit.active = true;
                        unit.elapsed_ms = 0;
                        gpio.set_pump(i, true);
                        sink.emit(&PumpEvent::Activated { pump: i, at: now });
                        break;
                    }
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
