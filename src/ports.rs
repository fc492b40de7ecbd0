//! Port traits — the boundary between scheduling logic and the outside
//! world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Scheduler / ControlLoop (domain)
//! ```
//!
//! The hardware adapter, the OS clocks, and the console log implement these
//! traits; the scheduler and control loop consume them via generics, so the
//! domain core never touches a register and is fully testable on the host.

use crate::clock::{MonotonicStamp, TimeOfDay};
use crate::events::PumpEvent;

// ───────────────────────────────────────────────────────────────
// GPIO port (driven adapter: domain → pins)
// ───────────────────────────────────────────────────────────────

/// Pin-level commands issued by the scheduler and control loop.
pub trait GpioPort {
    /// Drive pump `pump`'s output pin high (`on`) or low.
    fn set_pump(&mut self, pump: usize, on: bool);

    /// Sample the exit-request input pin.
    fn exit_requested(&mut self) -> bool;

    /// Mirror the ping input level onto the ping output (heartbeat
    /// pass-through, independent of pump logic).
    fn mirror_ping(&mut self);

    /// Deassert the ping output and every pump output — safe shutdown.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: OS time → domain)
// ───────────────────────────────────────────────────────────────

/// Time sampling. `&mut self` so simulated clocks can advance per sample.
pub trait ClockPort {
    /// Local calendar time of day, whole seconds.
    fn wall(&mut self) -> TimeOfDay;

    /// Monotonic timestamp, unaffected by wall-clock adjustments. Used
    /// only for duration accounting, never for trigger matching.
    fn monotonic(&mut self) -> MonotonicStamp;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → console / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`PumpEvent`]s through this port; adapters
/// decide where they go (console log, test recorder, ...).
pub trait EventSink {
    fn emit(&mut self, event: &PumpEvent);
}
