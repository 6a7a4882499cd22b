//! Prelude module for common re-exports.
//!
//! ```rust
//! use stage_common::prelude::*;
//! ```

// ─── Errors ─────────────────────────────────────────────────────────
pub use crate::error::{MotionError, status_code};

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, ConfigSaver, LogLevel, SharedConfig};

// ─── Units ──────────────────────────────────────────────────────────
pub use crate::units::UnitConverter;

// ─── Driver ─────────────────────────────────────────────────────────
pub use crate::hal::config::{
    AxisConfig, AxisTable, DigitalIoConfig, HomeDirection, HomeMode, HomeParams, IoTable,
    MotionParams,
};
pub use crate::hal::driver::{DriverError, DriverResult, HalError, MotionDriver};
pub use crate::hal::types::{HwAxis, MotionIo, StatusBits};
