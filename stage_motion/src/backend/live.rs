//! Backends forwarding to a motion-controller driver.

use super::{AxisBackend, AxisCache, IoBackend, TriggerLinear};
use crate::axis::{homing, trigger};
use crate::poll::PollTiming;
use stage_common::consts::{AXES_PER_CARD, IO_REGISTER_BITS};
use stage_common::error::MotionError;
use stage_common::hal::config::{DigitalIoConfig, HomeParams, MotionParams};
use stage_common::hal::consts::{DI_GROUP_GENERAL, TRAP_SMOOTH_TIME};
use stage_common::hal::driver::MotionDriver;
use stage_common::hal::types::{CompareStatus, HwAxis, MotionIo, TrapProfile};
use stage_common::units::UnitConverter;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read the status register and refresh the cached snapshot.
pub(crate) fn read_io(
    driver: &dyn MotionDriver,
    hw: HwAxis,
    cache: &mut AxisCache,
) -> Result<MotionIo, MotionError> {
    let io = MotionIo::from(driver.read_status_bits(hw)?);
    cache.io = io;
    Ok(io)
}

/// Clear faults, then drive the reset line high and low.
pub(crate) fn reset_axis(driver: &dyn MotionDriver, hw: HwAxis) -> Result<(), MotionError> {
    driver.clear_status(hw)?;
    driver.axis_reset_edge(hw, true)?;
    driver.axis_reset_edge(hw, false)?;
    Ok(())
}

/// Axis backed by a controller card.
pub struct LiveAxis {
    driver: Arc<dyn MotionDriver>,
    hw: HwAxis,
}

impl LiveAxis {
    /// Bind to the hardware axis `hw`.
    pub fn new(driver: Arc<dyn MotionDriver>, hw: HwAxis) -> Self {
        Self { driver, hw }
    }
}

impl AxisBackend for LiveAxis {
    fn set_enabled(&mut self, _cache: &mut AxisCache, on: bool) -> Result<(), MotionError> {
        if on {
            self.driver.enable(self.hw)?;
        } else {
            self.driver.disable(self.hw)?;
        }
        Ok(())
    }

    fn home(
        &mut self,
        cache: &mut AxisCache,
        params: &HomeParams,
        units: &UnitConverter,
        timing: &PollTiming,
    ) -> Result<(), MotionError> {
        homing::run(self.driver.as_ref(), self.hw, cache, params, units, timing)
    }

    fn zero_position(&mut self, _cache: &mut AxisCache) -> Result<(), MotionError> {
        self.driver.zero_position(self.hw)?;
        Ok(())
    }

    fn move_to(
        &mut self,
        _cache: &mut AxisCache,
        target: f64,
        params: &MotionParams,
        units: &UnitConverter,
    ) -> Result<(), MotionError> {
        let mask = self.hw.mask();
        if mask == 0 {
            return Err(MotionError::IdOutOfRange {
                id: usize::from(self.hw.id),
                count: usize::from(AXES_PER_CARD),
            });
        }
        let acc = units.acceleration_to_device(params.acc);
        let profile = TrapProfile {
            acc,
            dec: acc,
            vel_start: 0.0,
            smooth_time: TRAP_SMOOTH_TIME,
        };
        let pulses = units.mm_to_pulses(target);
        debug!("{} move to {} mm ({} pulses)", self.hw, target, pulses);

        self.driver.set_trap_profile(self.hw, &profile)?;
        self.driver.set_target_position(self.hw, pulses)?;
        self.driver
            .set_target_velocity(self.hw, units.velocity_to_device(params.max_vel))?;
        self.driver.update(self.hw.card, mask)?;
        Ok(())
    }

    fn reset(&mut self, _cache: &mut AxisCache) -> Result<(), MotionError> {
        reset_axis(self.driver.as_ref(), self.hw)
    }

    fn clear_alarm(&mut self, _cache: &mut AxisCache) -> Result<(), MotionError> {
        self.driver.clear_status(self.hw)?;
        Ok(())
    }

    fn motion_io(&mut self, cache: &mut AxisCache) -> Result<MotionIo, MotionError> {
        read_io(self.driver.as_ref(), self.hw, cache)
    }

    fn command_position(
        &mut self,
        cache: &mut AxisCache,
        units: &UnitConverter,
    ) -> Result<f64, MotionError> {
        cache.command = units.pulses_to_mm(self.driver.read_command_pulses(self.hw)?);
        Ok(cache.command)
    }

    fn feedback_position(
        &mut self,
        cache: &mut AxisCache,
        units: &UnitConverter,
    ) -> Result<f64, MotionError> {
        cache.feedback = units.pulses_to_mm(self.driver.read_encoder_pulses(self.hw)?);
        Ok(cache.feedback)
    }

    fn configure_trigger_list(
        &mut self,
        channel: u16,
        positions: &[f64],
        units: &UnitConverter,
    ) -> Result<(), MotionError> {
        trigger::program_list(self.driver.as_ref(), self.hw, channel, positions, units)
    }

    fn configure_trigger_linear(
        &mut self,
        program: &TriggerLinear,
        units: &UnitConverter,
    ) -> Result<(), MotionError> {
        trigger::program_linear(self.driver.as_ref(), self.hw, program, units)
    }

    fn stop_trigger(&mut self, channel: u16) -> Result<(), MotionError> {
        self.driver.compare_stop(channel)?;
        Ok(())
    }

    fn software_trigger(
        &mut self,
        channel: u16,
        pulse_count: i32,
        interval_us: i16,
    ) -> Result<(), MotionError> {
        trigger::fire(self.driver.as_ref(), channel, pulse_count, interval_us)
    }

    fn trigger_status(&mut self, channel: u16) -> Result<CompareStatus, MotionError> {
        Ok(self.driver.compare_status(channel)?)
    }
}

fn register_bit(config: &DigitalIoConfig) -> Result<u32, MotionError> {
    1u32.checked_shl(u32::from(config.bit_no))
        .ok_or(MotionError::IdOutOfRange {
            id: usize::from(config.bit_no),
            count: usize::from(IO_REGISTER_BITS),
        })
}

/// Digital IO point backed by the controller's IO registers.
pub struct LiveIo {
    driver: Arc<dyn MotionDriver>,
}

impl LiveIo {
    /// Bind to the driver's IO registers.
    pub fn new(driver: Arc<dyn MotionDriver>) -> Self {
        Self { driver }
    }
}

impl IoBackend for LiveIo {
    fn get(&mut self, config: &DigitalIoConfig, mirror: &mut bool) -> Result<bool, MotionError> {
        let bit = register_bit(config)?;
        let register = if config.output {
            self.driver.read_outputs()?
        } else {
            self.driver.read_inputs(DI_GROUP_GENERAL)?
        };
        *mirror = register & bit != 0;
        Ok(*mirror)
    }

    fn set(
        &mut self,
        config: &DigitalIoConfig,
        mirror: &mut bool,
        value: bool,
    ) -> Result<(), MotionError> {
        if !config.output {
            warn!("Ignoring write to input '{}'", config.name);
            return Ok(());
        }
        register_bit(config)?;
        self.driver.set_output_bit(config.bit_no, value)?;
        *mirror = value;
        Ok(())
    }
}
