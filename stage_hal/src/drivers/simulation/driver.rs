//! Simulation driver implementation.
//!
//! The `SimulationDriver` implements the `MotionDriver` trait entirely in
//! memory. Moves complete after a configurable number of status reads,
//! homing follows a per-axis [`HomeScript`], and every call is appended to a
//! log that tests inspect. Failures are injected per call with
//! [`SimulationDriver::fail_when`].

use super::script::{CallMatcher, DriverCall, HomeScript};
use super::state::SimState;
use parking_lot::Mutex;
use stage_common::hal::driver::{DriverError, DriverResult, MotionDriver};
use stage_common::hal::types::{
    CompareMode, CompareParams, ComparePoint, CompareStatus, CoordConfig, CoordStatus, HomeCommand,
    HomeStatus, HwAxis, LinearCompare, LineSegment, PulseBurst, StatusBits, TrapProfile,
};
use std::path::Path;
use tracing::{debug, info, trace};

/// Status returned when opening a card that does not exist.
pub const ERR_NO_CARD: i32 = -6;
/// Status returned by `close` when no card is open.
pub const ERR_NOT_OPEN: i32 = -7;
/// Status returned when a card configuration file is missing.
pub const ERR_CONFIG_FILE: i32 = -8;

/// In-memory motion controller implementing `MotionDriver`.
pub struct SimulationDriver {
    /// Driver name
    name: &'static str,
    /// Driver version
    version: &'static str,
    state: Mutex<SimState>,
}

impl SimulationDriver {
    /// Create a driver with one card and single-poll move settling.
    pub fn new() -> Self {
        Self {
            name: "simulation",
            version: env!("CARGO_PKG_VERSION"),
            state: Mutex::new(SimState::new()),
        }
    }

    /// Number of cards reported by `enumerate_cards`.
    pub fn with_cards(self, cards: u16) -> Self {
        self.state.lock().cards = cards;
        self
    }

    /// Status reads that report "moving" after a move, home pass or line starts.
    pub fn with_settle_polls(self, polls: u32) -> Self {
        self.state.lock().settle_polls = polls;
        self
    }

    /// Script the homing behaviour of one axis.
    pub fn set_home_script(&self, axis: HwAxis, script: HomeScript) {
        let mut state = self.state.lock();
        let sim = state.axis(axis);
        sim.script = script;
        sim.reverse_pending = false;
    }

    /// Make an axis report "moving" forever.
    pub fn set_stuck(&self, axis: HwAxis, stuck: bool) {
        self.state.lock().axis(axis).stuck = stuck;
    }

    /// Make the coordinate system report "running" forever.
    pub fn set_coord_stuck(&self, stuck: bool) {
        self.state.lock().coord.stuck = stuck;
    }

    /// Force the limit inputs of an axis.
    pub fn set_limits(&self, axis: HwAxis, positive: bool, negative: bool) {
        let mut state = self.state.lock();
        let sim = state.axis(axis);
        sim.positive_limit = positive;
        sim.negative_limit = negative;
    }

    /// Raise or drop the drive alarm of an axis.
    pub fn set_alarm(&self, axis: HwAxis, alarm: bool) {
        self.state.lock().axis(axis).alarm = alarm;
    }

    /// Place an axis at `pulses` without logging a call.
    pub fn set_position(&self, axis: HwAxis, pulses: f64) {
        self.state.lock().axis(axis).set_position(pulses);
    }

    /// Drive one bit of the general input register. Bits past the register width are ignored.
    pub fn set_input(&self, bit: u16, value: bool) {
        let mut state = self.state.lock();
        let mask = 1u32.checked_shl(u32::from(bit)).unwrap_or(0);
        if value {
            state.inputs |= mask;
        } else {
            state.inputs &= !mask;
        }
    }

    /// Fail every call matched by `matcher` with `code`.
    pub fn fail_when(&self, matcher: CallMatcher, code: i32) {
        self.state.lock().failures.push((matcher, code));
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    /// Snapshot of the call log.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.state.lock().calls.clone()
    }

    /// Empty the call log.
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Number of logged calls matching `matcher`.
    pub fn count_calls(&self, matcher: CallMatcher) -> usize {
        self.state.lock().calls.iter().filter(|c| matcher(c)).count()
    }

    /// Number of logged calls that change controller state.
    pub fn command_count(&self) -> usize {
        self.state.lock().calls.iter().filter(|c| !c.is_read()).count()
    }

    /// Last executed interpolation segment.
    pub fn last_line(&self) -> Option<LineSegment> {
        self.state.lock().coord.executed.last().copied()
    }

    /// Current coordinate system configuration.
    pub fn coord_config(&self) -> Option<CoordConfig> {
        self.state.lock().coord.config
    }

    /// Points currently uploaded to a compare channel.
    pub fn compare_points(&self, channel: u16) -> Vec<ComparePoint> {
        self.state.lock().channel(channel).points.clone()
    }

    /// Raw encoder position of an axis.
    pub fn encoder(&self, axis: HwAxis) -> f64 {
        self.state.lock().axis(axis).encoder
    }

    /// Cards currently open.
    pub fn open_cards(&self) -> Vec<u16> {
        self.state.lock().opened.iter().copied().collect()
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> &'static str {
        self.version
    }

    fn enumerate_cards(&self) -> DriverResult<u16> {
        let mut state = self.state.lock();
        state.issue(DriverCall::EnumerateCards)?;
        Ok(state.cards)
    }

    fn open(&self, card: u16) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::Open(card))?;
        if card >= state.cards {
            return Err(DriverError(ERR_NO_CARD));
        }
        state.opened.insert(card);
        info!("Simulated card {} opened", card);
        Ok(())
    }

    fn close(&self) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::Close)?;
        if state.opened.is_empty() {
            return Err(DriverError(ERR_NOT_OPEN));
        }
        state.opened.clear();
        info!("Simulated controller closed");
        Ok(())
    }

    fn reset_controller(&self) -> DriverResult<()> {
        self.state.lock().issue(DriverCall::ResetController)
    }

    fn home_init(&self) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::HomeInit)?;
        state.home_initialised = true;
        Ok(())
    }

    fn load_card_config(&self, card: u16, path: &Path) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::LoadCardConfig(card, path.to_path_buf()))?;
        if !path.is_file() {
            return Err(DriverError(ERR_CONFIG_FILE));
        }
        state.card_configs.push((card, path.to_path_buf()));
        Ok(())
    }

    fn enable(&self, axis: HwAxis) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::Enable(axis))?;
        state.axis(axis).enabled = true;
        Ok(())
    }

    fn disable(&self, axis: HwAxis) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::Disable(axis))?;
        state.axis(axis).enabled = false;
        Ok(())
    }

    fn read_status_bits(&self, axis: HwAxis) -> DriverResult<StatusBits> {
        let mut state = self.state.lock();
        state.issue(DriverCall::ReadStatus(axis))?;
        let bits = state.axis(axis).status_bits();
        trace!("{} status {:?}", axis, bits);
        Ok(bits)
    }

    fn read_command_pulses(&self, axis: HwAxis) -> DriverResult<f64> {
        let mut state = self.state.lock();
        state.issue(DriverCall::ReadCommand(axis))?;
        Ok(state.axis(axis).command)
    }

    fn read_encoder_pulses(&self, axis: HwAxis) -> DriverResult<f64> {
        let mut state = self.state.lock();
        state.issue(DriverCall::ReadEncoder(axis))?;
        Ok(state.axis(axis).encoder)
    }

    fn home(&self, axis: HwAxis, command: &HomeCommand) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::Home(axis, *command))?;
        let settle = state.settle_polls;
        debug!("{} home search {} pulses", axis, command.search_pulses);
        state.axis(axis).start_home(settle);
        Ok(())
    }

    fn home_status(&self, axis: HwAxis) -> DriverResult<HomeStatus> {
        let mut state = self.state.lock();
        state.issue(DriverCall::HomeStatus(axis))?;
        Ok(state.axis(axis).home_status())
    }

    fn zero_position(&self, axis: HwAxis) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::ZeroPosition(axis))?;
        state.axis(axis).set_position(0.0);
        Ok(())
    }

    fn set_trap_profile(&self, axis: HwAxis, profile: &TrapProfile) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::SetTrapProfile(axis, *profile))?;
        state.axis(axis).profile = Some(*profile);
        Ok(())
    }

    fn set_target_position(&self, axis: HwAxis, pulses: i32) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::SetTargetPosition(axis, pulses))?;
        state.axis(axis).target = pulses;
        Ok(())
    }

    fn set_target_velocity(&self, axis: HwAxis, vel: f64) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::SetTargetVelocity(axis, vel))?;
        state.axis(axis).vel = vel;
        Ok(())
    }

    fn update(&self, card: u16, mask: u32) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::Update { card, mask })?;
        state.start_moves(card, mask);
        Ok(())
    }

    fn clear_status(&self, axis: HwAxis) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::ClearStatus(axis))?;
        state.axis(axis).alarm = false;
        Ok(())
    }

    fn axis_reset_edge(&self, axis: HwAxis, level: bool) -> DriverResult<()> {
        self.state.lock().issue(DriverCall::AxisResetEdge(axis, level))
    }

    fn compare_stop(&self, channel: u16) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::CompareStop(channel))?;
        state.channel(channel).armed = false;
        Ok(())
    }

    fn compare_clear(&self, channel: u16) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::CompareClear(channel))?;
        state.channel(channel).points.clear();
        Ok(())
    }

    fn compare_mode(&self, channel: u16, mode: CompareMode) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::CompareMode(channel, mode))?;
        state.channel(channel).mode = Some(mode);
        Ok(())
    }

    fn compare_set_params(&self, channel: u16, params: &CompareParams) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::CompareSetParams(channel, *params))?;
        state.channel(channel).params = Some(*params);
        Ok(())
    }

    fn compare_upload(&self, channel: u16, points: &[ComparePoint]) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::CompareUpload(channel, points.to_vec()))?;
        state.channel(channel).points.extend_from_slice(points);
        Ok(())
    }

    fn compare_status(&self, channel: u16) -> DriverResult<CompareStatus> {
        let mut state = self.state.lock();
        state.issue(DriverCall::CompareStatus(channel))?;
        Ok(state.channel(channel).status())
    }

    fn compare_start(&self, channel: u16) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::CompareStart(channel))?;
        state.channel(channel).armed = true;
        Ok(())
    }

    fn compare_linear(&self, axis: HwAxis, program: &LinearCompare) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::CompareLinear(axis, *program))?;
        let points = (0..program.count.max(0))
            .map(|i| ComparePoint {
                px: program.start.saturating_add(i.saturating_mul(program.interval)),
                py: 0,
            })
            .collect::<Vec<_>>();
        let channel = state.channel(program.channel);
        channel.points = points;
        channel.armed = true;
        Ok(())
    }

    fn compare_pulse(&self, channel: u16, burst: &PulseBurst) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::ComparePulse(channel, *burst))?;
        let channel = state.channel(channel);
        channel.hits = channel.hits.saturating_add(burst.count);
        channel.bursts.push(*burst);
        Ok(())
    }

    fn set_coord_params(&self, coord: i16, config: &CoordConfig) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::SetCoordParams(coord, *config))?;
        state.coord.config = Some(*config);
        Ok(())
    }

    fn coord_clear(&self, coord: i16, fifo: i16) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::CoordClear(coord, fifo))?;
        state.coord.queue.clear();
        Ok(())
    }

    fn coord_line(&self, coord: i16, fifo: i16, segment: &LineSegment) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::CoordLine(coord, fifo, *segment))?;
        state.coord.queue.push(*segment);
        Ok(())
    }

    fn coord_start(&self, coord_mask: u16, fifo_mask: u16) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::CoordStart(coord_mask, fifo_mask))?;
        let settle = state.settle_polls;
        let coord = &mut state.coord;
        if !coord.queue.is_empty() {
            let queued = std::mem::take(&mut coord.queue);
            coord.executed.extend(queued);
            coord.running_polls = settle;
        }
        Ok(())
    }

    fn coord_status(&self, coord: i16, fifo: i16) -> DriverResult<CoordStatus> {
        let mut state = self.state.lock();
        state.issue(DriverCall::CoordStatus(coord, fifo))?;
        Ok(state.coord.status())
    }

    fn read_outputs(&self) -> DriverResult<u32> {
        let mut state = self.state.lock();
        state.issue(DriverCall::ReadOutputs)?;
        Ok(state.outputs)
    }

    fn read_inputs(&self, group: i16) -> DriverResult<u32> {
        let mut state = self.state.lock();
        state.issue(DriverCall::ReadInputs(group))?;
        Ok(state.inputs)
    }

    fn set_output_bit(&self, bit: u16, value: bool) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.issue(DriverCall::SetOutputBit(bit, value))?;
        let mask = 1u32.checked_shl(u32::from(bit)).unwrap_or(0);
        if value {
            state.outputs |= mask;
        } else {
            state.outputs &= !mask;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stage_common::hal::types::CompareOutput;

    #[test]
    fn test_simulation_driver_name_version() {
        let driver = SimulationDriver::new();
        assert_eq!(driver.name(), "simulation");
        assert!(!driver.version().is_empty());
    }

    #[test]
    fn test_open_close_lifecycle() {
        let driver = SimulationDriver::new().with_cards(2);
        assert_eq!(driver.enumerate_cards(), Ok(2));
        assert!(driver.open(0).is_ok());
        assert!(driver.open(1).is_ok());
        assert_eq!(driver.open(2), Err(DriverError(ERR_NO_CARD)));
        assert_eq!(driver.open_cards(), vec![0, 1]);

        assert!(driver.close().is_ok());
        assert_eq!(driver.close(), Err(DriverError(ERR_NOT_OPEN)));
    }

    #[test]
    fn test_trap_move_completes_after_settle_polls() {
        let driver = SimulationDriver::new().with_settle_polls(2);
        let x = HwAxis::new(0, 1);
        driver.set_target_position(x, 4000).unwrap();
        driver.update(0, x.mask()).unwrap();

        assert!(driver.read_status_bits(x).unwrap().contains(StatusBits::MOVING));
        assert!(driver.read_status_bits(x).unwrap().contains(StatusBits::MOVING));
        assert!(!driver.read_status_bits(x).unwrap().contains(StatusBits::MOVING));
        assert_eq!(driver.read_encoder_pulses(x), Ok(4000.0));
        assert_eq!(driver.read_command_pulses(x), Ok(4000.0));
    }

    #[test]
    fn test_injected_failure_is_logged() {
        let driver = SimulationDriver::new();
        let x = HwAxis::new(0, 1);
        driver.fail_when(|c| matches!(c, DriverCall::SetTargetVelocity(..)), -3);

        assert_eq!(driver.set_target_velocity(x, 1.0), Err(DriverError(-3)));
        assert_eq!(driver.calls(), vec![DriverCall::SetTargetVelocity(x, 1.0)]);

        driver.clear_failures();
        assert!(driver.set_target_velocity(x, 1.0).is_ok());
        assert_eq!(driver.command_count(), 2);
    }

    #[test]
    fn test_compare_round_trip() {
        let driver = SimulationDriver::new();
        let points = [ComparePoint { px: 10, py: 0 }, ComparePoint { px: 20, py: 0 }];
        driver.compare_upload(0, &points).unwrap();
        driver.compare_start(0).unwrap();

        let status = driver.compare_status(0).unwrap();
        assert!(status.is_armed());
        assert_eq!(status.fifo_count, 2);

        driver.compare_stop(0).unwrap();
        assert!(!driver.compare_status(0).unwrap().is_armed());
    }

    #[test]
    fn test_compare_linear_and_pulse() {
        let driver = SimulationDriver::new();
        let program = LinearCompare {
            channel: 1,
            start: 100,
            count: 3,
            interval: -10,
            pulse_width: 100,
            start_level: 1,
        };
        driver.compare_linear(HwAxis::new(0, 2), &program).unwrap();
        let xs: Vec<i32> = driver.compare_points(1).iter().map(|p| p.px).collect();
        assert_eq!(xs, vec![100, 90, 80]);

        let burst = PulseBurst {
            level: 1,
            output: CompareOutput::Pulse,
            pulse_width: 100,
            count: 5,
            interval_us: 200,
        };
        driver.compare_pulse(1, &burst).unwrap();
        assert_eq!(driver.compare_status(1).unwrap().count, 5);
    }

    #[test]
    fn test_coord_runs_then_stops() {
        let driver = SimulationDriver::new().with_settle_polls(1);
        let segment = LineSegment {
            target: [1000, 2000, 0],
            dimension: 2,
            vel: 1.0,
            acc: 0.1,
            end_vel: 0.0,
        };
        driver.coord_line(1, 0, &segment).unwrap();
        driver.coord_start(1, 1).unwrap();
        assert!(driver.coord_status(1, 0).unwrap().is_running());
        let done = driver.coord_status(1, 0).unwrap();
        assert!(!done.is_running());
        assert_eq!(done.command_count, 1);
        assert_eq!(driver.last_line(), Some(segment));
    }

    #[test]
    fn test_io_registers() {
        let driver = SimulationDriver::new();
        driver.set_output_bit(3, true).unwrap();
        assert_eq!(driver.read_outputs(), Ok(0b1000));
        driver.set_output_bit(3, false).unwrap();
        assert_eq!(driver.read_outputs(), Ok(0));

        driver.set_input(5, true);
        assert_eq!(driver.read_inputs(4), Ok(1 << 5));

        driver.set_input(40, true);
        driver.set_output_bit(32, true).unwrap();
        assert_eq!(driver.read_inputs(4), Ok(1 << 5));
        assert_eq!(driver.read_outputs(), Ok(0));
    }

    #[test]
    fn test_load_card_config_requires_file() {
        let driver = SimulationDriver::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0.cfg");
        assert_eq!(
            driver.load_card_config(0, &path),
            Err(DriverError(ERR_CONFIG_FILE))
        );
        std::fs::write(&path, "").unwrap();
        assert!(driver.load_card_config(0, &path).is_ok());
    }
}
