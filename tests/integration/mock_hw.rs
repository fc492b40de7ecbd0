//! Mock adapters for integration tests.
//!
//! `MockGpio` keeps its pin state behind an `Rc` so tests can poke inputs
//! and observe outputs while the control loop owns the adapter. `SimClock`
//! replays a wall/monotonic timeline in fixed steps.

use std::cell::RefCell;
use std::rc::Rc;

use pumphouse::clock::{MonotonicStamp, TimeOfDay};
use pumphouse::events::PumpEvent;
use pumphouse::ports::{ClockPort, EventSink, GpioPort};

// ── Mock GPIO ─────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct GpioState {
    pub pumps: Vec<bool>,
    pub ping_in: bool,
    pub ping_out: bool,
    pub exit: bool,
    /// Assert the exit pin after this many `exit_requested` samples.
    pub exit_after: Option<usize>,
    pub exit_samples: usize,
    /// Full pump command history, in order.
    pub history: Vec<(usize, bool)>,
}

pub struct MockGpio {
    state: Rc<RefCell<GpioState>>,
}

impl MockGpio {
    /// A mock bank with `pumps` pump outputs, all low, plus a shared
    /// handle for the test to drive inputs and read outputs.
    pub fn new(pumps: usize) -> (Self, Rc<RefCell<GpioState>>) {
        let state = Rc::new(RefCell::new(GpioState {
            pumps: vec![false; pumps],
            ..GpioState::default()
        }));
        (
            Self {
                state: Rc::clone(&state),
            },
            state,
        )
    }
}

impl GpioPort for MockGpio {
    fn set_pump(&mut self, pump: usize, on: bool) {
        let mut s = self.state.borrow_mut();
        s.history.push((pump, on));
        if let Some(level) = s.pumps.get_mut(pump) {
            *level = on;
        }
    }

    fn exit_requested(&mut self) -> bool {
        let mut s = self.state.borrow_mut();
        s.exit_samples += 1;
        if let Some(after) = s.exit_after {
            if s.exit_samples > after {
                s.exit = true;
            }
        }
        s.exit
    }

    fn mirror_ping(&mut self) {
        let mut s = self.state.borrow_mut();
        s.ping_out = s.ping_in;
    }

    fn all_off(&mut self) {
        let mut s = self.state.borrow_mut();
        s.ping_out = false;
        for level in &mut s.pumps {
            *level = false;
        }
    }
}

// ── Simulated clock ───────────────────────────────────────────

/// Wall clock starting at `start` and monotonic clock starting at an
/// arbitrary offset, both advancing `step_ms` per poll cycle.
pub struct SimClock {
    start_secs: u32,
    mono_offset_ms: u64,
    elapsed_ms: u64,
    step_ms: u64,
}

impl SimClock {
    pub fn new(start: TimeOfDay, step_ms: u64) -> Self {
        Self {
            start_secs: start.seconds_of_day(),
            // Non-zero so a loop that forgot the first-cycle rule would
            // see a huge bogus delta.
            mono_offset_ms: 86_400_000,
            elapsed_ms: 0,
            step_ms,
        }
    }

    fn time_of_day(secs: u32) -> TimeOfDay {
        let s = secs % 86_400;
        TimeOfDay::new((s / 3600) as u8, (s / 60 % 60) as u8, (s % 60) as u8)
    }
}

impl ClockPort for SimClock {
    fn wall(&mut self) -> TimeOfDay {
        Self::time_of_day(self.start_secs + (self.elapsed_ms / 1000) as u32)
    }

    fn monotonic(&mut self) -> MonotonicStamp {
        let total = self.mono_offset_ms + self.elapsed_ms;
        // The monotonic sample closes the poll cycle; advance afterwards so
        // wall and monotonic stay consistent within one cycle.
        self.elapsed_ms += self.step_ms;
        MonotonicStamp {
            secs: (total / 1000) as i64,
            nanos: (total % 1000) as i64 * 1_000_000,
        }
    }
}

// ── Recording event sink ──────────────────────────────────────

pub struct RecordingSink {
    events: Rc<RefCell<Vec<PumpEvent>>>,
}

impl RecordingSink {
    pub fn new() -> (Self, Rc<RefCell<Vec<PumpEvent>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                events: Rc::clone(&events),
            },
            events,
        )
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &PumpEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
