//! One physical axis.
//!
//! An [`Axis`] combines the persisted [`AxisConfig`] (identity, calibration,
//! home and motion parameters), the last known [`AxisCache`] and a device
//! backend. Callers work in millimetres and m/s; conversion to pulses
//! happens below this layer with the axis's [`UnitConverter`].
//!
//! # Operations
//!
//! | Operation | Blocking | Offline |
//! |-----------|----------|---------|
//! | `set_enabled` | no | cached flag |
//! | `home` | yes | zero cache |
//! | `zero_position` | no | zero cache |
//! | `move_to`, `abs_move`, `rel_move` | no | cache jumps to target |
//! | `abs_move_over`, `rel_move_over`, `motion_done` | yes | return at once |
//! | `reset` | no | no-op |
//! | `clear_alarm` | no | cached flag |
//! | `motion_io`, `command_position`, `feedback_position` | no | cache |
//! | trigger operations | no | no-op |

pub(crate) mod homing;
pub mod trigger;

use crate::backend::{AxisBackend, AxisCache};
use crate::poll::{Deadline, PollTiming, pause};
use stage_common::error::MotionError;
use stage_common::hal::config::{AxisConfig, HomeMode, MotionParams};
use stage_common::hal::types::{HwAxis, MotionIo};
use stage_common::units::UnitConverter;
use tracing::{debug, info, trace, warn};

/// One physical axis with its configuration, cache and device backend.
pub struct Axis {
    config: AxisConfig,
    timing: PollTiming,
    cache: AxisCache,
    backend: Box<dyn AxisBackend>,
}

impl std::fmt::Debug for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Axis")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Axis {
    /// Create an axis over `backend`.
    pub fn new(config: AxisConfig, backend: Box<dyn AxisBackend>, timing: PollTiming) -> Self {
        Self {
            config,
            timing,
            cache: AxisCache::default(),
            backend,
        }
    }

    /// Axis name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Hardware address.
    pub fn hw(&self) -> HwAxis {
        self.config.hw()
    }

    /// Controller card index.
    pub fn card_id(&self) -> u16 {
        self.config.card_id
    }

    /// Persisted configuration.
    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    /// Editable configuration; saved by `MotionSystem::save_axis_params`.
    pub fn config_mut(&mut self) -> &mut AxisConfig {
        &mut self.config
    }

    /// Unit converter of the current calibration.
    pub fn units(&self) -> UnitConverter {
        self.config.units()
    }

    /// Poll timing used by the blocking operations.
    pub fn timing(&self) -> &PollTiming {
        &self.timing
    }

    pub(crate) fn set_timing(&mut self, timing: PollTiming) {
        self.timing = timing;
    }

    /// Last known state without touching the device.
    pub fn cached(&self) -> &AxisCache {
        &self.cache
    }

    /// Energise (`true`) or de-energise the drive.
    pub fn set_enabled(&mut self, on: bool) -> Result<(), MotionError> {
        debug!("Axis '{}' enabled={}", self.config.name, on);
        self.backend.set_enabled(&mut self.cache, on)
    }

    /// Establish the reference position. Blocks until done.
    ///
    /// With home mode `None` only the cached position is zeroed and no
    /// device call is made.
    ///
    /// # Errors
    ///
    /// - `TimeOut` if a pass exceeds `home.max_seconds`
    /// - `HomeFailed` if the reversed pass reports failure
    /// - `NegativeLimit` if the negative limit is asserted after the reversed pass
    /// - `Driver` for any failing driver call
    pub fn home(&mut self) -> Result<(), MotionError> {
        if self.config.home.mode == HomeMode::None {
            debug!("Axis '{}' has no home mode, zeroing cache", self.config.name);
            self.cache.zero();
            return Ok(());
        }
        let units = self.units();
        self.backend
            .home(&mut self.cache, &self.config.home, &units, &self.timing)
    }

    /// Redefine the current position as zero.
    pub fn zero_position(&mut self) -> Result<(), MotionError> {
        self.backend.zero_position(&mut self.cache)
    }

    /// Start a trapezoidal move. Does not wait for completion.
    ///
    /// A relative `target` is added to the current feedback position, not
    /// to the last commanded one.
    pub fn move_to(
        &mut self,
        target: f64,
        absolute: bool,
        params: &MotionParams,
    ) -> Result<(), MotionError> {
        let units = self.units();
        let target = if absolute {
            target
        } else {
            self.backend.feedback_position(&mut self.cache, &units)? + target
        };
        self.backend.move_to(&mut self.cache, target, params, &units)
    }

    /// Move to `position` [mm] at `speed_ratio` of the configured speed.
    pub fn abs_move(&mut self, position: f64, speed_ratio: f64) -> Result<(), MotionError> {
        let params = self.config.motion.scaled(speed_ratio);
        self.move_to(position, true, &params)
    }

    /// Move by `distance` [mm] at `speed_ratio` of the configured speed.
    pub fn rel_move(&mut self, distance: f64, speed_ratio: f64) -> Result<(), MotionError> {
        let params = self.config.motion.scaled(speed_ratio);
        self.move_to(distance, false, &params)
    }

    /// [`abs_move`](Self::abs_move), then wait for [`motion_done`](Self::motion_done).
    pub fn abs_move_over(&mut self, position: f64, speed_ratio: f64) -> Result<(), MotionError> {
        self.abs_move(position, speed_ratio)?;
        self.motion_done()
    }

    /// [`rel_move`](Self::rel_move), then wait for [`motion_done`](Self::motion_done).
    pub fn rel_move_over(&mut self, distance: f64, speed_ratio: f64) -> Result<(), MotionError> {
        self.rel_move(distance, speed_ratio)?;
        self.motion_done()
    }

    /// Wait until the axis stops moving or `motion.max_seconds` elapses.
    pub fn motion_done(&mut self) -> Result<(), MotionError> {
        let deadline = Deadline::after_seconds(self.config.motion.max_seconds);
        loop {
            if deadline.expired() {
                warn!(
                    "Axis '{}' still moving after {} s",
                    self.config.name, self.config.motion.max_seconds
                );
                return Err(MotionError::TimeOut {
                    what: "motion_done",
                    seconds: self.config.motion.max_seconds,
                });
            }
            pause(self.timing.motion_poll());
            let io = self.backend.motion_io(&mut self.cache)?;
            trace!("Axis '{}' moving={}", self.config.name, io.moving);
            if !io.moving {
                return Ok(());
            }
        }
    }

    /// Clear faults and pulse the reset line.
    pub fn reset(&mut self) -> Result<(), MotionError> {
        self.backend.reset(&mut self.cache)
    }

    /// Clear the drive alarm.
    pub fn clear_alarm(&mut self) -> Result<(), MotionError> {
        info!("Axis '{}' clearing alarm", self.config.name);
        self.backend.clear_alarm(&mut self.cache)
    }

    /// Limit/enable/moving/alarm snapshot. Reads the device when online.
    pub fn motion_io(&mut self) -> Result<MotionIo, MotionError> {
        self.backend.motion_io(&mut self.cache)
    }

    /// Command position [mm]. Reads the device when online.
    pub fn command_position(&mut self) -> Result<f64, MotionError> {
        let units = self.units();
        self.backend.command_position(&mut self.cache, &units)
    }

    /// Feedback position [mm]. Reads the device when online.
    pub fn feedback_position(&mut self) -> Result<f64, MotionError> {
        let units = self.units();
        self.backend.feedback_position(&mut self.cache, &units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{LiveAxis, SimulatedAxis};
    use stage_common::hal::config::HomeParams;
    use stage_hal::drivers::simulation::{DriverCall, SimulationDriver};
    use std::sync::Arc;

    fn config() -> AxisConfig {
        AxisConfig {
            card_id: 0,
            id: 1,
            name: "X".to_string(),
            pulse_per_mm: 1000.0,
            home: HomeParams::default(),
            motion: MotionParams {
                acc: 1.0,
                max_vel: 0.1,
                max_seconds: 1.0,
            },
        }
    }

    fn offline() -> Axis {
        Axis::new(config(), Box::new(SimulatedAxis), PollTiming::uniform(0))
    }

    fn online(driver: &Arc<SimulationDriver>) -> Axis {
        let backend = LiveAxis::new(driver.clone(), config().hw());
        Axis::new(config(), Box::new(backend), PollTiming::uniform(0))
    }

    #[test]
    fn test_relative_moves_compose_offline() {
        let mut axis = offline();
        axis.abs_move(10.0, 1.0).unwrap();
        axis.rel_move(2.5, 1.0).unwrap();
        axis.rel_move(2.5, 1.0).unwrap();
        assert_eq!(axis.feedback_position(), Ok(15.0));
        assert_eq!(axis.command_position(), Ok(15.0));
    }

    #[test]
    fn test_offline_status_is_cached() {
        let mut axis = offline();
        axis.set_enabled(true).unwrap();
        assert!(axis.motion_io().unwrap().enabled);
        assert!(axis.motion_done().is_ok());
        assert!(axis.reset().is_ok());
        axis.abs_move(3.0, 0.5).unwrap();
        axis.zero_position().unwrap();
        assert_eq!(axis.feedback_position(), Ok(0.0));
    }

    #[test]
    fn test_move_sequence_online() {
        let driver = Arc::new(SimulationDriver::new());
        let mut axis = online(&driver);
        axis.abs_move(2.0, 0.5).unwrap();

        let hw = axis.hw();
        let calls = driver.calls();
        assert_eq!(calls.len(), 4);
        match &calls[0] {
            DriverCall::SetTrapProfile(a, profile) => {
                assert_eq!(*a, hw);
                assert_eq!(profile.acc, profile.dec);
                assert_eq!(profile.vel_start, 0.0);
                assert!((profile.acc - 0.25).abs() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(calls[1], DriverCall::SetTargetPosition(hw, 2000));
        assert!(matches!(calls[2], DriverCall::SetTargetVelocity(a, v) if a == hw && (v - 50.0).abs() < 1e-9));
        assert_eq!(calls[3], DriverCall::Update { card: 0, mask: 1 });
    }

    #[test]
    fn test_relative_move_uses_feedback_online() {
        let driver = Arc::new(SimulationDriver::new());
        let mut axis = online(&driver);
        driver.set_position(axis.hw(), 5000.0);

        axis.rel_move(-1.0, 1.0).unwrap();
        assert!(driver.calls().contains(&DriverCall::SetTargetPosition(axis.hw(), 4000)));
    }

    #[test]
    fn test_axis_past_mask_width_makes_no_call() {
        let driver = Arc::new(SimulationDriver::new());
        let mut wide = config();
        wide.id = 33;
        let backend = LiveAxis::new(driver.clone(), wide.hw());
        let mut axis = Axis::new(wide, Box::new(backend), PollTiming::uniform(0));

        assert_eq!(
            axis.abs_move(1.0, 1.0),
            Err(MotionError::IdOutOfRange { id: 33, count: 32 })
        );
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn test_failed_sub_call_short_circuits() {
        let driver = Arc::new(SimulationDriver::new());
        driver.fail_when(|c| matches!(c, DriverCall::SetTargetPosition(..)), -5);
        let mut axis = online(&driver);

        assert_eq!(axis.abs_move(1.0, 1.0), Err(MotionError::Driver(-5)));
        assert_eq!(driver.calls().len(), 2);
    }

    #[test]
    fn test_motion_done_online() {
        let driver = Arc::new(SimulationDriver::new().with_settle_polls(3));
        let mut axis = online(&driver);
        axis.abs_move_over(1.0, 1.0).unwrap();
        assert_eq!(axis.feedback_position(), Ok(1.0));
        assert_eq!(
            driver.count_calls(|c| matches!(c, DriverCall::ReadStatus(_))),
            4
        );
    }

    #[test]
    fn test_motion_done_times_out() {
        let driver = Arc::new(SimulationDriver::new());
        let mut axis = online(&driver);
        axis.config_mut().motion.max_seconds = 0.02;
        driver.set_stuck(axis.hw(), true);

        let err = axis.abs_move_over(1.0, 1.0).unwrap_err();
        assert!(matches!(err, MotionError::TimeOut { what: "motion_done", .. }));
    }

    #[test]
    fn test_reset_pulses_both_edges() {
        let driver = Arc::new(SimulationDriver::new());
        let mut axis = online(&driver);
        axis.reset().unwrap();
        let hw = axis.hw();
        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::ClearStatus(hw),
                DriverCall::AxisResetEdge(hw, true),
                DriverCall::AxisResetEdge(hw, false),
            ]
        );
    }

    #[test]
    fn test_non_positive_scale_reads_with_fallback() {
        let driver = Arc::new(SimulationDriver::new());
        let mut cfg = config();
        cfg.pulse_per_mm = 0.0;
        let backend = LiveAxis::new(driver.clone(), cfg.hw());
        let mut axis = Axis::new(cfg, Box::new(backend), PollTiming::uniform(0));
        driver.set_position(axis.hw(), 2500.0);

        assert_eq!(axis.feedback_position(), Ok(2.5));
        assert_eq!(axis.command_position(), Ok(2.5));
    }
}
