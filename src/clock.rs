//! Wall-clock and monotonic time sources.
//!
//! Two clocks with strictly separated jobs:
//!
//! - the **wall clock** ([`TimeOfDay`]) is only ever compared against
//!   trigger times; it may step under NTP or DST and that is fine, because
//!   the schedule repeats daily and only whole seconds matter;
//! - the **monotonic clock** ([`MonotonicStamp`]) is only ever differenced
//!   ([`ClockDelta`]) for run-duration accounting, so pump durations are
//!   immune to wall-clock adjustments.

use std::fmt;
use std::mem;
use std::ptr;

use serde::{Deserialize, Serialize};

use crate::ports::ClockPort;

/// A time of day with whole-second resolution. No date component: the
/// schedule repeats daily.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    /// Hour, 0–23.
    pub hour: u8,
    /// Minute, 0–59.
    pub min: u8,
    /// Second, 0–59.
    pub sec: u8,
}

impl TimeOfDay {
    /// Construct from components. Out-of-range values are a caller bug;
    /// configuration input goes through `SystemConfig::validate` instead.
    pub fn new(hour: u8, min: u8, sec: u8) -> Self {
        debug_assert!(hour < 24 && min < 60 && sec < 60);
        Self { hour, min, sec }
    }

    /// Whether all three fields are in range.
    pub fn is_valid(self) -> bool {
        self.hour < 24 && self.min < 60 && self.sec < 60
    }

    /// Seconds since midnight, 0..86_400.
    pub fn seconds_of_day(self) -> u32 {
        u32::from(self.hour) * 3600 + u32::from(self.min) * 60 + u32::from(self.sec)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.min, self.sec)
    }
}

/// An opaque monotonic timestamp (`CLOCK_MONOTONIC` resolution).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonotonicStamp {
    /// Whole seconds.
    pub secs: i64,
    /// Nanosecond remainder, 0..1_000_000_000.
    pub nanos: i64,
}

/// The difference between two monotonic stamps, kept as separate seconds
/// and nanosecond components until the final truncating conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockDelta {
    pub secs: i64,
    pub nanos: i64,
}

impl ClockDelta {
    /// `now - prev`, normalised so both components are non-negative: a
    /// negative nanosecond remainder borrows one second and gains a full
    /// second's worth of nanoseconds.
    pub fn between(now: MonotonicStamp, prev: MonotonicStamp) -> Self {
        let mut secs = now.secs - prev.secs;
        let mut nanos = now.nanos - prev.nanos;
        if nanos < 0 {
            secs -= 1;
            nanos += 1_000_000_000;
        }
        Self { secs, nanos }
    }

    /// Millisecond equivalent: the seconds component (×1000) and the
    /// nanosecond remainder (÷1_000_000) are summed separately, so no
    /// precision is lost before this single truncation.
    pub fn millis(self) -> u32 {
        let ms = self.secs * 1000 + self.nanos / 1_000_000;
        u32::try_from(ms).unwrap_or(u32::MAX)
    }
}

/// The real OS clocks.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn wall(&mut self) -> TimeOfDay {
        // SAFETY: `localtime_r` fills the caller-supplied `tm`; a zeroed
        // `tm` is a valid out-parameter and `t` is a valid time_t.
        unsafe {
            let t = libc::time(ptr::null_mut());
            let mut tm: libc::tm = mem::zeroed();
            libc::localtime_r(&t, &mut tm);
            TimeOfDay {
                hour: tm.tm_hour as u8,
                min: tm.tm_min as u8,
                // tm_sec may be 60 on a leap second; clamp to keep the
                // 0–59 invariant.
                sec: (tm.tm_sec as u8).min(59),
            }
        }
    }

    fn monotonic(&mut self) -> MonotonicStamp {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // SAFETY: `ts` is a valid out-parameter; CLOCK_MONOTONIC is
        // always available on Linux.
        unsafe {
            libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts);
        }
        MonotonicStamp {
            secs: ts.tv_sec as i64,
            nanos: ts.tv_nsec as i64,
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
