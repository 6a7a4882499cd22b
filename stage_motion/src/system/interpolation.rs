//! Straight-line interpolation over two or three axes of one card.
//!
//! The coordinate system (`COORD_SYSTEM`) and its command buffer
//! (`COMMAND_FIFO`) are shared by the whole process. Each line reconfigures
//! the coordinate system for the participating axes, clears the buffer,
//! enqueues one segment and starts it. Targets, velocity and acceleration are
//! converted with the pulse scale of the first axis.

use super::{MotionSystem, OperatingMode};
use crate::point::{Point2, Point3};
use crate::poll::{Deadline, pause};
use stage_common::error::MotionError;
use stage_common::hal::consts::{
    COMMAND_FIFO, COORD_DEC_ABRUPT, COORD_DEC_SMOOTH, COORD_EVEN_TIME, COORD_SYSTEM,
    LINE_XY_ACC_MAX, LINE_XY_VEL_MAX, LINE_XYZ_ACC_MAX, LINE_XYZ_VEL_MAX,
};
use stage_common::hal::driver::MotionDriver;
use stage_common::hal::types::{CoordConfig, LineSegment};
use tracing::{debug, trace, warn};

/// Coordinate system parameters for the hardware axis ids in `profile_ids`.
pub(crate) fn coord_config(profile_ids: &[u16]) -> CoordConfig {
    let mut profile = [0i16; 8];
    for (slot, id) in profile.iter_mut().zip(profile_ids) {
        *slot = *id as i16;
    }
    let (syn_acc_max, syn_vel_max) = if profile_ids.len() == 3 {
        (LINE_XYZ_ACC_MAX, LINE_XYZ_VEL_MAX)
    } else {
        (LINE_XY_ACC_MAX, LINE_XY_VEL_MAX)
    };
    CoordConfig {
        dimension: profile_ids.len() as i16,
        profile,
        origin: [0; 8],
        set_origin: true,
        even_time: COORD_EVEN_TIME,
        syn_acc_max,
        syn_vel_max,
        dec_smooth: COORD_DEC_SMOOTH,
        dec_abrupt: COORD_DEC_ABRUPT,
    }
}

/// Bit of `index` (1-based) in a coordinate system or buffer mask.
fn select_mask(index: i16) -> u16 {
    1u16 << index.saturating_sub(1).max(0)
}

impl MotionSystem {
    /// Start a two-axis straight line to `target` [mm].
    ///
    /// `vel` [m/s] and `acc` [m/s²] are resultant values along the path.
    ///
    /// # Errors
    ///
    /// - `IdOutOfRange` / `AxesNotInOneCard` before any driver call
    /// - `Driver` for the first failing driver call
    pub fn line_xy(
        &mut self,
        x: usize,
        y: usize,
        target: Point2,
        vel: f64,
        acc: f64,
    ) -> Result<(), MotionError> {
        self.line(&[x, y], &[target.x, target.y], vel, acc)
    }

    /// Start a three-axis straight line to `target` [mm].
    pub fn line_xyz(
        &mut self,
        ids: [usize; 3],
        target: Point3,
        vel: f64,
        acc: f64,
    ) -> Result<(), MotionError> {
        self.line(&ids, &[target.x, target.y, target.z], vel, acc)
    }

    /// [`line_xy`](Self::line_xy), settle, then [`line_done`](Self::line_done).
    pub fn line_xy_over(
        &mut self,
        x: usize,
        y: usize,
        target: Point2,
        vel: f64,
        acc: f64,
        max_seconds: Option<f64>,
    ) -> Result<(), MotionError> {
        self.line_xy(x, y, target, vel, acc)?;
        pause(self.settings.timing.settle());
        self.line_done(max_seconds)
    }

    /// [`line_xyz`](Self::line_xyz), settle, then [`line_done`](Self::line_done).
    pub fn line_xyz_over(
        &mut self,
        ids: [usize; 3],
        target: Point3,
        vel: f64,
        acc: f64,
        max_seconds: Option<f64>,
    ) -> Result<(), MotionError> {
        self.line_xyz(ids, target, vel, acc)?;
        pause(self.settings.timing.settle());
        self.line_done(max_seconds)
    }

    /// Wait until the coordinate system stops running.
    ///
    /// `max_seconds` defaults to `timing.line_timeout_seconds`. Status read
    /// errors are skipped and polling continues. Returns at once offline.
    pub fn line_done(&mut self, max_seconds: Option<f64>) -> Result<(), MotionError> {
        let Some(driver) = self.mode.driver() else {
            return Ok(());
        };
        let timing = self.settings.timing;
        let seconds = max_seconds.unwrap_or(timing.line_timeout_seconds);
        let deadline = Deadline::after_seconds(seconds);
        loop {
            if deadline.expired() {
                warn!("Interpolation still running after {} s", seconds);
                return Err(MotionError::TimeOut {
                    what: "line_done",
                    seconds,
                });
            }
            pause(timing.line_poll());
            match driver.coord_status(COORD_SYSTEM, COMMAND_FIFO) {
                Ok(status) if status.is_running() => {
                    trace!("Interpolation running, {} segments done", status.command_count);
                }
                Ok(_) => return Ok(()),
                Err(e) => debug!("Coordinate status read failed: {}", e),
            }
        }
    }

    fn line(&mut self, ids: &[usize], target: &[f64], vel: f64, acc: f64) -> Result<(), MotionError> {
        self.check_one_card(ids)?;

        let driver = match &self.mode {
            OperatingMode::Offline => {
                for (&id, &position) in ids.iter().zip(target) {
                    self.axes[id].abs_move(position, 1.0)?;
                }
                return Ok(());
            }
            OperatingMode::Online(driver) => driver.clone(),
        };

        let units = self.axes[ids[0]].units();
        let hw_ids: Vec<u16> = ids.iter().map(|&id| self.axes[id].hw().id).collect();
        let mut segment = LineSegment {
            target: [0; 3],
            dimension: ids.len(),
            vel: units.velocity_to_device(vel),
            acc: units.acceleration_to_device(acc),
            end_vel: 0.0,
        };
        for (slot, mm) in segment.target.iter_mut().zip(target) {
            *slot = units.mm_to_pulses(*mm);
        }
        debug!("Line over axes {:?} to {:?} pulses", hw_ids, &segment.target[..ids.len()]);

        start_line(driver.as_ref(), &coord_config(&hw_ids), &segment)
    }
}

fn start_line(
    driver: &dyn MotionDriver,
    config: &CoordConfig,
    segment: &LineSegment,
) -> Result<(), MotionError> {
    driver.set_coord_params(COORD_SYSTEM, config)?;
    driver.coord_clear(COORD_SYSTEM, COMMAND_FIFO)?;
    driver.coord_line(COORD_SYSTEM, COMMAND_FIFO, segment)?;
    driver.coord_start(select_mask(COORD_SYSTEM), select_mask(COMMAND_FIFO))?;
    Ok(())
}
