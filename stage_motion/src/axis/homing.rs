//! Hardware homing sequence.
//!
//! # Passes
//!
//! ```text
//!  home(dir) ──► poll moving ──► stopped, PEL clear ──────────────► Ok
//!                     │               │
//!                  timeout        PEL asserted
//!                     ▼               ▼
//!                 TimeOut      reset, home(-dir) ──► poll home status
//!                                                     │  searching: reset, poll again
//!                                                     │  success: settle, zero position
//!                                                     │  other: HomeFailed
//!                                                     ▼
//!                                             NEL ► NegativeLimit
//!                                             else  Ok
//! ```
//!
//! A first pass that stops on the positive limit may have run into the
//! switch instead of the reference, so the search is repeated from the
//! other side. Both passes get their own `max_seconds` budget.

use crate::backend::{AxisCache, read_io, reset_axis};
use crate::poll::{Deadline, PollTiming, pause};
use stage_common::error::MotionError;
use stage_common::hal::config::{HomeDirection, HomeParams};
use stage_common::hal::consts::HOME_SEARCH_RANGE;
use stage_common::hal::driver::MotionDriver;
use stage_common::hal::types::{HomeCommand, HomeStatus, HwAxis};
use stage_common::units::UnitConverter;
use tracing::{debug, info, trace, warn};

/// Device-unit home command searching in `direction`.
pub(crate) fn home_command(
    params: &HomeParams,
    units: &UnitConverter,
    direction: HomeDirection,
) -> HomeCommand {
    let distance = if params.max_search_distance > 0.0 {
        units.mm_to_pulses(params.max_search_distance)
    } else {
        HOME_SEARCH_RANGE
    };
    HomeCommand {
        search_pulses: direction.sign().saturating_mul(distance),
        vel: units.velocity_to_device(params.vel),
        acc: units.acceleration_to_device(params.acc),
        offset_pulses: units.mm_to_pulses(params.offset),
    }
}

fn timed_out(hw: HwAxis, pass: &str, params: &HomeParams) -> MotionError {
    warn!("{} homing {} pass timed out after {} s", hw, pass, params.max_seconds);
    MotionError::TimeOut {
        what: "home",
        seconds: params.max_seconds,
    }
}

/// Home one axis through `driver`.
pub(crate) fn run(
    driver: &dyn MotionDriver,
    hw: HwAxis,
    cache: &mut AxisCache,
    params: &HomeParams,
    units: &UnitConverter,
    timing: &PollTiming,
) -> Result<(), MotionError> {
    info!("{} homing ({:?}, {:?})", hw, params.mode, params.direction);

    let deadline = Deadline::after_seconds(params.max_seconds);
    driver.home(hw, &home_command(params, units, params.direction))?;
    loop {
        pause(timing.home_poll());
        if deadline.expired() {
            return Err(timed_out(hw, "first", params));
        }
        let io = read_io(driver, hw, cache)?;
        trace!("{} homing, moving={}", hw, io.moving);
        if !io.moving {
            break;
        }
    }

    if !cache.io.positive_limit {
        info!("{} homed", hw);
        return Ok(());
    }

    warn!("{} stopped on the positive limit, homing from the other side", hw);
    reset_axis(driver, hw)?;
    let deadline = Deadline::after_seconds(params.max_seconds);
    driver.home(hw, &home_command(params, units, params.direction.reversed()))?;
    loop {
        pause(timing.home_poll());
        if deadline.expired() {
            return Err(timed_out(hw, "reversed", params));
        }
        // TODO: confirm on hardware whether the reset is needed on every poll.
        reset_axis(driver, hw)?;
        match driver.home_status(hw)? {
            HomeStatus::Searching => continue,
            HomeStatus::Success => {
                pause(timing.settle());
                driver.zero_position(hw)?;
                debug!("{} position zeroed", hw);
                break;
            }
            HomeStatus::Failed(status) => {
                warn!("{} reversed homing failed with status {}", hw, status);
                return Err(MotionError::HomeFailed { status });
            }
        }
    }

    let io = read_io(driver, hw, cache)?;
    if io.negative_limit {
        warn!("{} negative limit asserted after homing", hw);
        return Err(MotionError::NegativeLimit);
    }
    info!("{} homed", hw);
    Ok(())
}
