//! Unified error types for the pump controller.
//!
//! Only startup can fail: opening the raw-memory device, mapping the
//! register block, or rejecting an invalid schedule. Steady-state register
//! and clock operations are infallible, so the control loop carries no
//! error paths at all.

use std::fmt;
use std::io;

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug)]
pub enum Error {
    /// `/dev/mem` could not be opened (usually: not running as root).
    DeviceOpen(io::Error),
    /// The GPIO register block could not be memory-mapped.
    MemoryMap(io::Error),
    /// Schedule configuration failed validation.
    /// The `&'static str` describes which field and why.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceOpen(e) => write!(f, "failed to open /dev/mem: {e}"),
            Self::MemoryMap(e) => write!(f, "failed to map GPIO registers: {e}"),
            Self::Config(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DeviceOpen(e) | Self::MemoryMap(e) => Some(e),
            Self::Config(_) => None,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, Error>;
