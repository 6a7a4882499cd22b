//! Position-compare triggers of an axis.
//!
//! A compare channel fires an output pulse when the axis encoder crosses a
//! programmed position. Channels are numbered `0..COMPARE_CHANNELS`.
//!
//! # Programming a position list
//!
//! 1. stop and clear the channel
//! 2. select one-dimensional compare
//! 3. set parameters: encoder source, pulse output of `TRIGGER_PULSE_WIDTH_US`,
//!    error tolerance, threshold, one pulse per hit, spacing
//! 4. upload the positions
//! 5. read the channel status
//! 6. arm the channel
//!
//! The first failing step aborts the sequence and leaves the channel as the
//! previous steps left it.

use super::Axis;
use crate::backend::TriggerLinear;
use stage_common::consts::COMPARE_CHANNELS;
use stage_common::error::MotionError;
use stage_common::hal::consts::{
    COMPARE_MAX_ERR, COMPARE_PULSE_COUNT, COMPARE_SPACE_TIME, COMPARE_START_LEVEL,
    COMPARE_THRESHOLD, PAIRED_ENCODER_BASE, TRIGGER_PULSE_WIDTH_US,
};
use stage_common::hal::driver::MotionDriver;
use stage_common::hal::types::{
    CompareMode, CompareOutput, CompareParams, ComparePoint, CompareSource, CompareStatus, HwAxis,
    LinearCompare, PulseBurst,
};
use stage_common::units::UnitConverter;
use tracing::debug;

/// Default pulse count of [`Axis::software_trigger`].
pub const DEFAULT_SOFTWARE_PULSES: i32 = 1;

/// Default pulse interval of [`Axis::software_trigger`] [µs].
pub const DEFAULT_SOFTWARE_INTERVAL_US: i16 = 200;

/// Compare parameters for a list compare on the encoder of `hw`.
pub(crate) fn list_params(hw: HwAxis) -> CompareParams {
    let enc_x = hw.id as i16;
    CompareParams {
        enc_x,
        // Any encoder id other than enc_x; not a real second axis.
        enc_y: PAIRED_ENCODER_BASE - enc_x,
        source: CompareSource::Encoder,
        output: CompareOutput::Pulse,
        pulse_width: TRIGGER_PULSE_WIDTH_US,
        start_level: COMPARE_START_LEVEL,
        max_err: COMPARE_MAX_ERR,
        threshold: COMPARE_THRESHOLD,
        pulse_count: COMPARE_PULSE_COUNT,
        space_time: COMPARE_SPACE_TIME,
    }
}

pub(crate) fn program_list(
    driver: &dyn MotionDriver,
    hw: HwAxis,
    channel: u16,
    positions: &[f64],
    units: &UnitConverter,
) -> Result<(), MotionError> {
    let points: Vec<ComparePoint> = positions
        .iter()
        .map(|mm| ComparePoint {
            px: units.mm_to_pulses(*mm),
            py: 0,
        })
        .collect();
    debug!("{} compare channel {}: {} positions", hw, channel, points.len());

    driver.compare_stop(channel)?;
    driver.compare_clear(channel)?;
    driver.compare_mode(channel, CompareMode::OneDimensional)?;
    driver.compare_set_params(channel, &list_params(hw))?;
    driver.compare_upload(channel, &points)?;
    driver.compare_status(channel)?;
    driver.compare_start(channel)?;
    Ok(())
}

pub(crate) fn program_linear(
    driver: &dyn MotionDriver,
    hw: HwAxis,
    program: &TriggerLinear,
    units: &UnitConverter,
) -> Result<(), MotionError> {
    let linear = LinearCompare {
        channel: program.channel,
        start: units.mm_to_pulses(program.start),
        count: program.count,
        interval: units.mm_to_pulses(program.interval),
        pulse_width: TRIGGER_PULSE_WIDTH_US,
        start_level: COMPARE_START_LEVEL,
    };
    driver.compare_linear(hw, &linear)?;
    Ok(())
}

pub(crate) fn fire(
    driver: &dyn MotionDriver,
    channel: u16,
    pulse_count: i32,
    interval_us: i16,
) -> Result<(), MotionError> {
    driver.compare_stop(channel)?;
    driver.compare_status(channel)?;
    let burst = PulseBurst {
        level: COMPARE_START_LEVEL,
        output: CompareOutput::Pulse,
        pulse_width: TRIGGER_PULSE_WIDTH_US,
        count: pulse_count,
        interval_us,
    };
    driver.compare_pulse(channel, &burst)?;
    Ok(())
}

fn check_channel(channel: u16) -> Result<(), MotionError> {
    if channel >= COMPARE_CHANNELS {
        return Err(MotionError::IdOutOfRange {
            id: channel as usize,
            count: COMPARE_CHANNELS as usize,
        });
    }
    Ok(())
}

impl Axis {
    /// Arm `channel` to fire at each of `positions` [mm].
    pub fn configure_trigger_list(
        &mut self,
        channel: u16,
        positions: &[f64],
    ) -> Result<(), MotionError> {
        check_channel(channel)?;
        let units = self.units();
        self.backend
            .configure_trigger_list(channel, positions, &units)
    }

    /// Arm `channel` to fire `count` times every `interval` mm from the
    /// absolute position `start`. A negative interval counts down.
    pub fn configure_trigger_linear(
        &mut self,
        channel: u16,
        start: f64,
        interval: f64,
        count: i32,
    ) -> Result<(), MotionError> {
        check_channel(channel)?;
        let units = self.units();
        let program = TriggerLinear {
            channel,
            start,
            interval,
            count,
        };
        self.backend.configure_trigger_linear(&program, &units)
    }

    /// Disarm `channel`.
    pub fn stop_trigger(&mut self, channel: u16) -> Result<(), MotionError> {
        check_channel(channel)?;
        self.backend.stop_trigger(channel)
    }

    /// Disarm `channel` and fire `pulse_count` pulses `interval_us` apart.
    pub fn software_trigger(
        &mut self,
        channel: u16,
        pulse_count: i32,
        interval_us: i16,
    ) -> Result<(), MotionError> {
        check_channel(channel)?;
        self.backend
            .software_trigger(channel, pulse_count, interval_us)
    }

    /// Status of `channel`; disarmed offline.
    pub fn trigger_status(&mut self, channel: u16) -> Result<CompareStatus, MotionError> {
        check_channel(channel)?;
        self.backend.trigger_status(channel)
    }
}
