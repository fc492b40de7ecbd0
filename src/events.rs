//! Domain events and the console sink.

use log::info;

use crate::clock::TimeOfDay;
use crate::ports::EventSink;

/// Everything the controller reports to the outside world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpEvent {
    /// A pump transitioned INACTIVE → ACTIVE.
    Activated { pump: usize, at: TimeOfDay },
    /// A pump transitioned ACTIVE → INACTIVE after its run duration.
    /// `ran_ms` is the final elapsed counter, unclamped — it may exceed the
    /// configured duration by up to one poll interval.
    Deactivated {
        pump: usize,
        at: TimeOfDay,
        ran_ms: u32,
    },
    /// The exit-request pin was sampled high.
    ExitSignal,
}

/// Sink that prints one console line per event.
///
/// There is no machine-parseable output contract; these lines are for a
/// human tailing the log.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &PumpEvent) {
        match event {
            PumpEvent::Activated { pump, at } => {
                info!("Pump {pump} turned ON at {at}");
            }
            PumpEvent::Deactivated { pump, at, ran_ms } => {
                info!("Pump {pump} turned OFF at {at} (ran for {ran_ms} ms)");
            }
            PumpEvent::ExitSignal => {
                info!("Exit signal");
            }
        }
    }
}
