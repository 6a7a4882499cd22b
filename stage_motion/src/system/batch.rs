//! Batched point-to-point moves and completion barriers.
//!
//! Moves are issued one axis at a time in list order. The first failing axis
//! aborts the batch; axes commanded before it keep moving. Completion is
//! likewise awaited axis by axis.

use super::MotionSystem;
use crate::point::{Point2, Point3};
use crate::poll::pause;
use stage_common::error::MotionError;
use tracing::debug;

impl MotionSystem {
    /// Start absolute moves of several axes at `speed_ratio` of their configured speed.
    ///
    /// `moves` pairs logical axis ids with targets [mm]. Ids are validated and
    /// batches of more than one axis must share a card before anything is
    /// sent to the driver.
    pub fn abs_move(&mut self, moves: &[(usize, f64)], speed_ratio: f64) -> Result<(), MotionError> {
        let ids: Vec<usize> = moves.iter().map(|(id, _)| *id).collect();
        self.check_one_card(&ids)?;
        for &(id, position) in moves {
            debug!("Batch move axis {} to {} mm", id, position);
            self.axes[id].abs_move(position, speed_ratio)?;
        }
        Ok(())
    }

    /// [`abs_move`](Self::abs_move), settle, then wait for every axis.
    pub fn abs_move_over(
        &mut self,
        moves: &[(usize, f64)],
        speed_ratio: f64,
    ) -> Result<(), MotionError> {
        self.abs_move(moves, speed_ratio)?;
        pause(self.settings.timing.settle());
        let ids: Vec<usize> = moves.iter().map(|(id, _)| *id).collect();
        self.motion_done(&ids)
    }

    /// Two-axis absolute move.
    pub fn abs_move_xy(
        &mut self,
        x: usize,
        y: usize,
        target: Point2,
        speed_ratio: f64,
    ) -> Result<(), MotionError> {
        self.abs_move(&[(x, target.x), (y, target.y)], speed_ratio)
    }

    /// Two-axis absolute move, waiting for completion.
    pub fn abs_move_xy_over(
        &mut self,
        x: usize,
        y: usize,
        target: Point2,
        speed_ratio: f64,
    ) -> Result<(), MotionError> {
        self.abs_move_over(&[(x, target.x), (y, target.y)], speed_ratio)
    }

    /// Three-axis absolute move.
    pub fn abs_move_xyz(
        &mut self,
        ids: [usize; 3],
        target: Point3,
        speed_ratio: f64,
    ) -> Result<(), MotionError> {
        let [x, y, z] = ids;
        self.abs_move(&[(x, target.x), (y, target.y), (z, target.z)], speed_ratio)
    }

    /// Three-axis absolute move, waiting for completion.
    pub fn abs_move_xyz_over(
        &mut self,
        ids: [usize; 3],
        target: Point3,
        speed_ratio: f64,
    ) -> Result<(), MotionError> {
        let [x, y, z] = ids;
        self.abs_move_over(&[(x, target.x), (y, target.y), (z, target.z)], speed_ratio)
    }

    /// Wait for each listed axis in turn; the first failure ends the wait.
    pub fn motion_done(&mut self, ids: &[usize]) -> Result<(), MotionError> {
        self.check_ids(ids)?;
        for &id in ids {
            self.axes[id].motion_done()?;
        }
        Ok(())
    }
}
