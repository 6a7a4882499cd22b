//! System-wide constants for the stage motion workspace.
//!
//! Single source of truth for numeric limits, fallbacks and default file names.

/// Pulses per millimetre used when an axis is configured with a scale <= 0.
pub const FALLBACK_PULSE_PER_MM: f64 = 1000.0;

/// Axis table file name inside the configuration directory.
pub const AXIS_FILE: &str = "axis.toml";

/// Digital IO table file name inside the configuration directory.
pub const IO_FILE: &str = "dio.toml";

/// Optional system settings file name inside the configuration directory.
pub const SYSTEM_FILE: &str = "motion.toml";

/// Extension of the per-card vendor device configuration (`0.cfg`, `1.cfg`, ...).
pub const CARD_CONFIG_EXT: &str = "cfg";

/// Axes addressable on one controller card (width of the axis mask).
pub const AXES_PER_CARD: u16 = 32;

/// Number of position-compare channels per controller.
pub const COMPARE_CHANNELS: u16 = 2;

/// Width of the digital IO registers.
pub const IO_REGISTER_BITS: u16 = 32;

/// Default polling interval of `Axis::motion_done` in milliseconds.
pub const DEFAULT_MOTION_POLL_MS: u64 = 5;

/// Default polling interval of homing in milliseconds.
pub const DEFAULT_HOME_POLL_MS: u64 = 100;

/// Default polling interval of interpolation completion in milliseconds.
pub const DEFAULT_LINE_POLL_MS: u64 = 10;

/// Default settle delay in milliseconds (after homing success, before batched waits).
pub const DEFAULT_SETTLE_MS: u64 = 100;

/// Default interpolation completion budget in seconds.
pub const DEFAULT_LINE_TIMEOUT_S: f64 = 20.0;
