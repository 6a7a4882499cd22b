//! Motion-controller driver trait and error types.
//!
//! This module defines:
//! - `MotionDriver` trait - Narrow capability interface over the vendor driver
//! - `DriverError` - Raw non-zero vendor status
//! - `HalError` enum - Errors of driver management (registry lookup)
//! - `DriverFactory` type alias - Factory function type

use crate::hal::types::{
    CompareMode, CompareParams, ComparePoint, CompareStatus, CoordConfig, CoordStatus, HomeCommand,
    HomeStatus, HwAxis, LinearCompare, LineSegment, PulseBurst, StatusBits, TrapProfile,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Non-zero status returned by a driver call, passed through uninterpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("driver status {0}")]
pub struct DriverError(pub i32);

impl DriverError {
    /// Map a raw vendor status (0 = success) into a result.
    #[inline]
    pub const fn check(status: i32) -> DriverResult<()> {
        if status == 0 { Ok(()) } else { Err(Self(status)) }
    }
}

/// Result of a driver call.
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors of driver management.
#[derive(Debug, Clone, Error)]
pub enum HalError {
    /// No driver registered under this name.
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// A driver is already registered under this name.
    #[error("Driver already registered: {0}")]
    AlreadyRegistered(String),
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn() -> Arc<dyn MotionDriver>;

/// Capability interface the motion core requires from a motion-controller driver.
///
/// One driver instance is shared by every axis, IO point and the coordinator
/// of a `MotionSystem`, hence `&self` methods and `Send + Sync`.
/// Implementations forward to the vendor library (or simulate it) and report
/// any non-zero vendor status as `DriverError`.
///
/// # Call groups
///
/// | Group      | Calls |
/// |------------|-------|
/// | Lifecycle  | `enumerate_cards`, `open`, `close`, `reset_controller`, `home_init`, `load_card_config` |
/// | Axis       | `enable`, `disable`, `read_*`, `home`, `home_status`, `zero_position`, `set_trap_profile`, `set_target_*`, `update`, `clear_status`, `axis_reset_edge` |
/// | Compare    | `compare_*` |
/// | Coordinate | `set_coord_params`, `coord_clear`, `coord_line`, `coord_start`, `coord_status` |
/// | IO         | `read_outputs`, `read_inputs`, `set_output_bit` |
pub trait MotionDriver: Send + Sync {
    /// Returns the driver's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    // ─── Lifecycle ──────────────────────────────────────────────────

    /// Number of controller cards present.
    fn enumerate_cards(&self) -> DriverResult<u16>;

    /// Open one card.
    fn open(&self, card: u16) -> DriverResult<()>;

    /// Close the driver handle (all cards).
    fn close(&self) -> DriverResult<()>;

    /// Reset the controller subsystem.
    fn reset_controller(&self) -> DriverResult<()>;

    /// Initialise the hardware homing engine.
    fn home_init(&self) -> DriverResult<()>;

    /// Load a vendor device configuration file for one card.
    fn load_card_config(&self, card: u16, path: &Path) -> DriverResult<()>;

    // ─── Axis ───────────────────────────────────────────────────────

    /// Energise the drive.
    fn enable(&self, axis: HwAxis) -> DriverResult<()>;

    /// De-energise the drive.
    fn disable(&self, axis: HwAxis) -> DriverResult<()>;

    /// Read the axis status register.
    fn read_status_bits(&self, axis: HwAxis) -> DriverResult<StatusBits>;

    /// Read the profile (command) position in pulses.
    fn read_command_pulses(&self, axis: HwAxis) -> DriverResult<f64>;

    /// Read the encoder (feedback) position in pulses.
    fn read_encoder_pulses(&self, axis: HwAxis) -> DriverResult<f64>;

    /// Start a hardware home search.
    fn home(&self, axis: HwAxis, command: &HomeCommand) -> DriverResult<()>;

    /// Read the home status register.
    fn home_status(&self, axis: HwAxis) -> DriverResult<HomeStatus>;

    /// Redefine the current position as zero.
    fn zero_position(&self, axis: HwAxis) -> DriverResult<()>;

    /// Switch the axis to trapezoidal mode with the given profile.
    fn set_trap_profile(&self, axis: HwAxis, profile: &TrapProfile) -> DriverResult<()>;

    /// Set the absolute target position (pulses).
    fn set_target_position(&self, axis: HwAxis, pulses: i32) -> DriverResult<()>;

    /// Set the target velocity (pulse/ms).
    fn set_target_velocity(&self, axis: HwAxis, vel: f64) -> DriverResult<()>;

    /// Start the pending moves of every axis in `mask` on `card`.
    fn update(&self, card: u16, mask: u32) -> DriverResult<()>;

    /// Clear latched fault status.
    fn clear_status(&self, axis: HwAxis) -> DriverResult<()>;

    /// Drive the axis reset line to `level`.
    fn axis_reset_edge(&self, axis: HwAxis, level: bool) -> DriverResult<()>;

    // ─── Compare ────────────────────────────────────────────────────

    /// Disarm a compare channel.
    fn compare_stop(&self, channel: u16) -> DriverResult<()>;

    /// Clear the compare data of a channel.
    fn compare_clear(&self, channel: u16) -> DriverResult<()>;

    /// Select the compare dimension.
    fn compare_mode(&self, channel: u16, mode: CompareMode) -> DriverResult<()>;

    /// Program compare parameters.
    fn compare_set_params(&self, channel: u16, params: &CompareParams) -> DriverResult<()>;

    /// Upload compare points.
    fn compare_upload(&self, channel: u16, points: &[ComparePoint]) -> DriverResult<()>;

    /// Read compare channel status.
    fn compare_status(&self, channel: u16) -> DriverResult<CompareStatus>;

    /// Arm a compare channel.
    fn compare_start(&self, channel: u16) -> DriverResult<()>;

    /// Program and arm an evenly spaced compare sequence in one call.
    fn compare_linear(&self, axis: HwAxis, program: &LinearCompare) -> DriverResult<()>;

    /// Fire an immediate pulse burst on a channel.
    fn compare_pulse(&self, channel: u16, burst: &PulseBurst) -> DriverResult<()>;

    // ─── Coordinate system ──────────────────────────────────────────

    /// Configure a coordinate system.
    fn set_coord_params(&self, coord: i16, config: &CoordConfig) -> DriverResult<()>;

    /// Clear a command buffer of a coordinate system.
    fn coord_clear(&self, coord: i16, fifo: i16) -> DriverResult<()>;

    /// Enqueue a 2- or 3-axis straight line (XY or XYZ by `segment.dimension`).
    fn coord_line(&self, coord: i16, fifo: i16, segment: &LineSegment) -> DriverResult<()>;

    /// Start the coordinate systems / buffers selected by the masks.
    fn coord_start(&self, coord_mask: u16, fifo_mask: u16) -> DriverResult<()>;

    /// Read coordinate system status.
    fn coord_status(&self, coord: i16, fifo: i16) -> DriverResult<CoordStatus>;

    // ─── Digital IO ─────────────────────────────────────────────────

    /// Read the general-purpose output register.
    fn read_outputs(&self) -> DriverResult<u32>;

    /// Read an input register group.
    fn read_inputs(&self, group: i16) -> DriverResult<u32>;

    /// Write one output bit.
    fn set_output_bit(&self, bit: u16, value: bool) -> DriverResult<()>;
}
