//! Fixed driver-level constants.
//!
//! Values programmed into the controller that are not part of the persisted
//! axis configuration.

/// Home search range when no maximum search distance is configured (pulses).
pub const HOME_SEARCH_RANGE: i32 = i32::MAX / 2;

/// Trapezoidal profile smoothing time (ms).
pub const TRAP_SMOOTH_TIME: i16 = 10;

/// Compare output pulse width (µs).
pub const TRIGGER_PULSE_WIDTH_US: i16 = 100;

/// Compare position error tolerance (pulses).
pub const COMPARE_MAX_ERR: i32 = 300;

/// Compare threshold (pulses).
pub const COMPARE_THRESHOLD: i32 = 10;

/// Pulses emitted per compare hit.
pub const COMPARE_PULSE_COUNT: i16 = 1;

/// Spacing between pulses of one compare hit (µs).
pub const COMPARE_SPACE_TIME: i16 = 200;

/// Paired encoder id is `PAIRED_ENCODER_BASE - axis id`; it only has to differ
/// from the axis's own encoder.
pub const PAIRED_ENCODER_BASE: i16 = 5;

/// Compare output level at start.
pub const COMPARE_START_LEVEL: i16 = 1;

/// Coordinate system used for interpolation (1-based).
pub const COORD_SYSTEM: i16 = 1;

/// Command buffer (FIFO) used for interpolation.
pub const COMMAND_FIFO: i16 = 0;

/// Coordinate system even-time (ms).
pub const COORD_EVEN_TIME: i16 = 10;

/// Synchronised deceleration smoothing flag.
pub const COORD_DEC_SMOOTH: i16 = 1;

/// Synchronised abrupt-stop deceleration.
pub const COORD_DEC_ABRUPT: f64 = 500.0;

/// Synchronised acceleration cap for 2-axis interpolation.
pub const LINE_XY_ACC_MAX: f64 = 720.0;

/// Synchronised velocity cap for 2-axis interpolation.
pub const LINE_XY_VEL_MAX: f64 = 720.0;

/// Synchronised acceleration cap for 3-axis interpolation.
pub const LINE_XYZ_ACC_MAX: f64 = 500.0;

/// Synchronised velocity cap for 3-axis interpolation.
pub const LINE_XYZ_VEL_MAX: f64 = 10.0;

/// Input register group holding the general-purpose digital inputs.
pub const DI_GROUP_GENERAL: i16 = 4;
