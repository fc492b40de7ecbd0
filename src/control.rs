//! Control loop — polling cadence, exit signal, ping pass-through.
//!
//! One iteration, at a fixed period (default 500 ms):
//!
//! 1. sample the exit-request pin; if asserted, stop and shut down;
//! 2. mirror the ping input level onto the ping output;
//! 3. sample wall + monotonic clocks, compute the monotonic delta from the
//!    previous iteration (the first iteration contributes zero);
//! 4. step the pump scheduler with both wall samples and the delta;
//! 5. sleep for the period.
//!
//! Single-threaded and cooperative: the sleep is the only suspension
//! point and is not interruptible, so an exit request is observed at the
//! next iteration's check. The sleep applies no drift correction —
//! cumulative error from loop overhead is accepted.

use std::thread;
use std::time::Duration;

use crate::clock::{ClockDelta, MonotonicStamp, TimeOfDay};
use crate::events::PumpEvent;
use crate::ports::{ClockPort, EventSink, GpioPort};
use crate::scheduler::PumpScheduler;

/// Outcome of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Exit,
}

/// Orchestrates polling; exclusively owns the adapter, the clocks, and
/// every pump's state for the process lifetime.
pub struct ControlLoop<G: GpioPort, C: ClockPort, S: EventSink> {
    gpio: G,
    clock: C,
    sink: S,
    scheduler: PumpScheduler,
    prev_wall: Option<TimeOfDay>,
    prev_mono: Option<MonotonicStamp>,
}

impl<G: GpioPort, C: ClockPort, S: EventSink> ControlLoop<G, C, S> {
    pub fn new(gpio: G, clock: C, sink: S, scheduler: PumpScheduler) -> Self {
        Self {
            gpio,
            clock,
            sink,
            scheduler,
            prev_wall: None,
            prev_mono: None,
        }
    }

    /// Run one poll cycle. Public so tests can drive the loop without
    /// real sleeps.
    pub fn step(&mut self) -> Tick {
        if self.gpio.exit_requested() {
            self.sink.emit(&PumpEvent::ExitSignal);
            return Tick::Exit;
        }

        self.gpio.mirror_ping();

        let now_wall = self.clock.wall();
        let now_mono = self.clock.monotonic();
        let delta = match self.prev_mono {
            Some(prev) => ClockDelta::between(now_mono, prev),
            None => ClockDelta::default(),
        };

        self.scheduler.step(
            self.prev_wall,
            now_wall,
            delta,
            &mut self.gpio,
            &mut self.sink,
        );

        self.prev_wall = Some(now_wall);
        self.prev_mono = Some(now_mono);
        Tick::Continue
    }

    /// Poll until the exit pin is asserted, then shut down.
    pub fn run(&mut self, period: Duration) {
        while self.step() == Tick::Continue {
            thread::sleep(period);
        }
        self.shutdown();
    }

    /// Deassert the ping output and every pump output, regardless of each
    /// pump's state. Pin state persists after process exit, so this is the
    /// only place outputs are guaranteed safe.
    pub fn shutdown(&mut self) {
        self.gpio.all_off();
    }
}
