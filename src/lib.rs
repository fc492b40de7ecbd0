//! Irrigation pump controller library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. Only [`mmio::Peripheral`] and [`clock::SystemClock`] touch
//! the operating system; everything else runs against the port traits.

#![deny(unused_must_use)]

pub mod clock;
pub mod config;
pub mod control;
pub mod events;
pub mod gpio;
pub mod hardware;
pub mod mmio;
pub mod ports;
pub mod scheduler;

mod error;

pub use error::{Error, Result};
