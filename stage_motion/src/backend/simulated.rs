//! Backends that only mutate local state.
//!
//! Used when the system runs offline. Moves land on their target at once,
//! homing zeroes the position and every trigger operation succeeds without
//! effect.

use super::{AxisBackend, AxisCache, IoBackend, TriggerLinear};
use crate::poll::PollTiming;
use stage_common::error::MotionError;
use stage_common::hal::config::{DigitalIoConfig, HomeParams, MotionParams};
use stage_common::hal::types::{CompareStatus, MotionIo};
use stage_common::units::UnitConverter;
use tracing::trace;

/// Axis without hardware; the cache is the axis.
#[derive(Debug, Default)]
pub struct SimulatedAxis;

impl AxisBackend for SimulatedAxis {
    fn set_enabled(&mut self, cache: &mut AxisCache, on: bool) -> Result<(), MotionError> {
        cache.io.enabled = on;
        Ok(())
    }

    fn home(
        &mut self,
        cache: &mut AxisCache,
        _params: &HomeParams,
        _units: &UnitConverter,
        _timing: &PollTiming,
    ) -> Result<(), MotionError> {
        cache.zero();
        Ok(())
    }

    fn zero_position(&mut self, cache: &mut AxisCache) -> Result<(), MotionError> {
        cache.zero();
        Ok(())
    }

    fn move_to(
        &mut self,
        cache: &mut AxisCache,
        target: f64,
        _params: &MotionParams,
        _units: &UnitConverter,
    ) -> Result<(), MotionError> {
        trace!("Simulated move to {} mm", target);
        cache.command = target;
        cache.feedback = target;
        Ok(())
    }

    fn reset(&mut self, _cache: &mut AxisCache) -> Result<(), MotionError> {
        Ok(())
    }

    fn clear_alarm(&mut self, cache: &mut AxisCache) -> Result<(), MotionError> {
        cache.io.alarm = false;
        Ok(())
    }

    fn motion_io(&mut self, cache: &mut AxisCache) -> Result<MotionIo, MotionError> {
        Ok(cache.io)
    }

    fn command_position(
        &mut self,
        cache: &mut AxisCache,
        _units: &UnitConverter,
    ) -> Result<f64, MotionError> {
        Ok(cache.command)
    }

    fn feedback_position(
        &mut self,
        cache: &mut AxisCache,
        _units: &UnitConverter,
    ) -> Result<f64, MotionError> {
        Ok(cache.feedback)
    }

    fn configure_trigger_list(
        &mut self,
        _channel: u16,
        _positions: &[f64],
        _units: &UnitConverter,
    ) -> Result<(), MotionError> {
        Ok(())
    }

    fn configure_trigger_linear(
        &mut self,
        _program: &TriggerLinear,
        _units: &UnitConverter,
    ) -> Result<(), MotionError> {
        Ok(())
    }

    fn stop_trigger(&mut self, _channel: u16) -> Result<(), MotionError> {
        Ok(())
    }

    fn software_trigger(
        &mut self,
        _channel: u16,
        _pulse_count: i32,
        _interval_us: i16,
    ) -> Result<(), MotionError> {
        Ok(())
    }

    fn trigger_status(&mut self, _channel: u16) -> Result<CompareStatus, MotionError> {
        Ok(CompareStatus::default())
    }
}

/// Digital IO point without hardware; the mirror is the signal.
#[derive(Debug, Default)]
pub struct SimulatedIo;

impl IoBackend for SimulatedIo {
    fn get(&mut self, _config: &DigitalIoConfig, mirror: &mut bool) -> Result<bool, MotionError> {
        Ok(*mirror)
    }

    fn set(
        &mut self,
        _config: &DigitalIoConfig,
        mirror: &mut bool,
        value: bool,
    ) -> Result<(), MotionError> {
        *mirror = value;
        Ok(())
    }
}
