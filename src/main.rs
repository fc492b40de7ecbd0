//! Irrigation controller — main entry point.
//!
//! Must be run as root: the GPIO register block is reached through
//! `/dev/mem`. No command-line arguments; the schedule comes from
//! `/etc/pumphouse.json` when present, else the built-in table.
//!
//! ```text
//!   ┌──────────────────────────────────────────────────┐
//!   │                 Adapters (outer ring)            │
//!   │                                                  │
//!   │  HardwareAdapter     SystemClock    LogEventSink │
//!   │  (GpioPort)          (ClockPort)    (EventSink)  │
//!   │                                                  │
//!   │  ─────────────── Port trait boundary ─────────── │
//!   │                                                  │
//!   │  ┌────────────────────────────────────────────┐  │
//!   │  │   ControlLoop · PumpScheduler (pure logic) │  │
//!   │  └────────────────────────────────────────────┘  │
//!   └──────────────────────────────────────────────────┘
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use log::{error, info, warn};

use pumphouse::clock::SystemClock;
use pumphouse::config::SystemConfig;
use pumphouse::control::ControlLoop;
use pumphouse::events::LogEventSink;
use pumphouse::gpio::GpioBank;
use pumphouse::hardware::HardwareAdapter;
use pumphouse::scheduler::PumpScheduler;

/// Optional schedule override. Absent or invalid → built-in defaults.
const CONFIG_PATH: &str = "/etc/pumphouse.json";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("pumphouse v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Schedule configuration ─────────────────────────────
    let config = match SystemConfig::load(Path::new(CONFIG_PATH)) {
        Ok(cfg) => {
            info!("Schedule loaded from {CONFIG_PATH}");
            cfg
        }
        Err(e) => {
            warn!("No usable schedule at {CONFIG_PATH} ({e}), using built-in table");
            SystemConfig::default()
        }
    };
    for (i, pump) in config.pumps.iter().enumerate() {
        info!(
            "Pump {i}: pin {}, {} trigger(s), {} ms per run",
            pump.pin,
            pump.triggers.len(),
            pump.duration_ms
        );
    }

    // ── 2. Map the GPIO register block ────────────────────────
    // The two startup failure kinds (device open, memory map) are fatal:
    // report and exit non-zero, no retry, no degraded mode.
    let bank = match GpioBank::map() {
        Ok(bank) => bank,
        Err(e) => {
            error!("{e}");
            return Err(e.into());
        }
    };

    // ── 3. Adapters + scheduler ───────────────────────────────
    let hw = HardwareAdapter::new(&bank, &config);
    let scheduler = PumpScheduler::new(&config.pumps, config.trigger_matching);
    let mut control = ControlLoop::new(hw, SystemClock::new(), LogEventSink::new(), scheduler);

    // ── 4. Poll until the exit pin is asserted ────────────────
    info!(
        "Entering control loop ({} ms period)",
        config.poll_interval_ms
    );
    control.run(Duration::from_millis(u64::from(config.poll_interval_ms)));

    // Outputs are deasserted by the loop's shutdown; dropping `bank`
    // unmaps the register block and closes /dev/mem.
    drop(control);
    drop(bank);
    info!("Shutdown complete");
    Ok(())
}
