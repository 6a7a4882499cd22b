//! Device backends of axes and digital IO.
//!
//! An [`Axis`](crate::axis::Axis) or [`DigitalIo`](crate::io::DigitalIo)
//! holds one boxed backend chosen at system init and never asks which kind
//! it has:
//!
//! | Backend         | Reads                         | Writes                     |
//! |-----------------|-------------------------------|----------------------------|
//! | `LiveAxis`      | driver, refreshing the cache  | driver                     |
//! | `SimulatedAxis` | cache                         | cache                      |
//! | `LiveIo`        | driver, refreshing the mirror | driver (outputs only)      |
//! | `SimulatedIo`   | mirror                        | mirror                     |
//!
//! All positions crossing this seam are millimetres; pulse conversion
//! happens inside the live backends with the axis's [`UnitConverter`].

mod live;
mod simulated;

pub use live::{LiveAxis, LiveIo};
pub(crate) use live::{read_io, reset_axis};
pub use simulated::{SimulatedAxis, SimulatedIo};

use crate::poll::PollTiming;
use stage_common::error::MotionError;
use stage_common::hal::config::{DigitalIoConfig, HomeParams, MotionParams};
use stage_common::hal::types::{CompareStatus, MotionIo};
use stage_common::units::UnitConverter;

/// Last known state of one axis.
///
/// Authoritative offline; online every read overwrites it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisCache {
    /// Command position [mm].
    pub command: f64,
    /// Feedback position [mm].
    pub feedback: f64,
    /// Limit/enable/moving/alarm snapshot.
    pub io: MotionIo,
}

impl AxisCache {
    /// Zero both positions.
    #[inline]
    pub fn zero(&mut self) {
        self.command = 0.0;
        self.feedback = 0.0;
    }
}

/// Evenly spaced trigger program in physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerLinear {
    /// Compare channel.
    pub channel: u16,
    /// First position [mm].
    pub start: f64,
    /// Spacing [mm]; negative counts down.
    pub interval: f64,
    /// Number of positions.
    pub count: i32,
}

/// Operations an axis forwards to its device.
pub trait AxisBackend: Send {
    /// Energise or de-energise the drive.
    fn set_enabled(&mut self, cache: &mut AxisCache, on: bool) -> Result<(), MotionError>;

    /// Run homing for a configured (non-`None`) home mode.
    fn home(
        &mut self,
        cache: &mut AxisCache,
        params: &HomeParams,
        units: &UnitConverter,
        timing: &PollTiming,
    ) -> Result<(), MotionError>;

    /// Redefine the current position as zero.
    fn zero_position(&mut self, cache: &mut AxisCache) -> Result<(), MotionError>;

    /// Start a trapezoidal move to the absolute `target` [mm].
    fn move_to(
        &mut self,
        cache: &mut AxisCache,
        target: f64,
        params: &MotionParams,
        units: &UnitConverter,
    ) -> Result<(), MotionError>;

    /// Clear faults and pulse the axis reset line.
    fn reset(&mut self, cache: &mut AxisCache) -> Result<(), MotionError>;

    /// Clear the drive alarm.
    fn clear_alarm(&mut self, cache: &mut AxisCache) -> Result<(), MotionError>;

    /// Limit/enable/moving/alarm snapshot.
    fn motion_io(&mut self, cache: &mut AxisCache) -> Result<MotionIo, MotionError>;

    /// Command position [mm].
    fn command_position(
        &mut self,
        cache: &mut AxisCache,
        units: &UnitConverter,
    ) -> Result<f64, MotionError>;

    /// Feedback position [mm].
    fn feedback_position(
        &mut self,
        cache: &mut AxisCache,
        units: &UnitConverter,
    ) -> Result<f64, MotionError>;

    /// Program and arm a list compare on `channel`.
    fn configure_trigger_list(
        &mut self,
        channel: u16,
        positions: &[f64],
        units: &UnitConverter,
    ) -> Result<(), MotionError>;

    /// Program and arm an evenly spaced compare.
    fn configure_trigger_linear(
        &mut self,
        program: &TriggerLinear,
        units: &UnitConverter,
    ) -> Result<(), MotionError>;

    /// Disarm a compare channel.
    fn stop_trigger(&mut self, channel: u16) -> Result<(), MotionError>;

    /// Fire an immediate pulse burst.
    fn software_trigger(
        &mut self,
        channel: u16,
        pulse_count: i32,
        interval_us: i16,
    ) -> Result<(), MotionError>;

    /// Status of a compare channel.
    fn trigger_status(&mut self, channel: u16) -> Result<CompareStatus, MotionError>;
}

/// Operations a digital IO point forwards to its device.
pub trait IoBackend: Send {
    /// Read the bit, refreshing `mirror` where the device is authoritative.
    fn get(&mut self, config: &DigitalIoConfig, mirror: &mut bool) -> Result<bool, MotionError>;

    /// Write the bit.
    fn set(
        &mut self,
        config: &DigitalIoConfig,
        mirror: &mut bool,
        value: bool,
    ) -> Result<(), MotionError>;
}
