//! In-memory controller state behind the simulation driver.

use super::script::{CallMatcher, DriverCall, HomeScript};
use stage_common::hal::driver::{DriverError, DriverResult};
use stage_common::hal::types::{
    CompareMode, CompareParams, ComparePoint, CompareStatus, CoordConfig, CoordStatus, HomeStatus,
    HwAxis, LineSegment, PulseBurst, StatusBits, TrapProfile,
};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

/// One simulated axis.
#[derive(Debug, Clone, Default)]
pub(crate) struct SimAxis {
    pub enabled: bool,
    pub alarm: bool,
    pub positive_limit: bool,
    pub negative_limit: bool,
    pub command: f64,
    pub encoder: f64,
    pub target: i32,
    pub vel: f64,
    pub profile: Option<TrapProfile>,
    /// Status reads left that still report "moving".
    pub moving_polls: u32,
    /// Motion never completes.
    pub stuck: bool,
    pub script: HomeScript,
    /// A first pass ended on the positive limit; the next home call is the reversed pass.
    pub reverse_pending: bool,
    /// Home status reads left that still report "searching".
    pub searching_polls: u32,
    pub home_result: Option<HomeStatus>,
}

impl SimAxis {
    pub fn status_bits(&mut self) -> StatusBits {
        let mut bits = StatusBits::empty();
        bits.set(StatusBits::ALARM, self.alarm);
        bits.set(StatusBits::POSITIVE_LIMIT, self.positive_limit);
        bits.set(StatusBits::NEGATIVE_LIMIT, self.negative_limit);
        bits.set(StatusBits::ENABLED, self.enabled);
        let moving = if self.stuck {
            true
        } else if self.moving_polls > 0 {
            self.moving_polls -= 1;
            true
        } else {
            false
        };
        bits.set(StatusBits::MOVING, moving);
        bits
    }

    /// Start a home pass according to the script.
    pub fn start_home(&mut self, settle_polls: u32) {
        self.moving_polls = settle_polls;
        if !self.reverse_pending {
            if self.script.hits_positive_limit() {
                self.positive_limit = true;
                self.reverse_pending = true;
                self.home_result = None;
            } else {
                self.home_result = Some(HomeStatus::Success);
                self.set_position(0.0);
            }
            return;
        }

        self.reverse_pending = false;
        self.positive_limit = false;
        match self.script {
            HomeScript::Clean => self.home_result = Some(HomeStatus::Success),
            HomeScript::PositiveLimitFirst { searching_polls } => {
                self.searching_polls = searching_polls;
                self.home_result = Some(HomeStatus::Success);
            }
            HomeScript::NegativeLimitAfterReverse => {
                self.negative_limit = true;
                self.home_result = Some(HomeStatus::Success);
            }
            HomeScript::ReverseFails(raw) => self.home_result = Some(HomeStatus::Failed(raw)),
        }
    }

    pub fn home_status(&mut self) -> HomeStatus {
        if self.searching_polls > 0 {
            self.searching_polls -= 1;
            return HomeStatus::Searching;
        }
        self.home_result.unwrap_or(HomeStatus::Searching)
    }

    pub fn set_position(&mut self, pulses: f64) {
        self.command = pulses;
        self.encoder = pulses;
        self.target = pulses.round() as i32;
    }
}

/// One simulated compare channel.
#[derive(Debug, Clone, Default)]
pub(crate) struct SimCompare {
    pub armed: bool,
    pub mode: Option<CompareMode>,
    pub params: Option<CompareParams>,
    pub points: Vec<ComparePoint>,
    pub bursts: Vec<PulseBurst>,
    pub hits: i32,
}

impl SimCompare {
    pub fn status(&self) -> CompareStatus {
        CompareStatus {
            state: i16::from(self.armed),
            count: self.hits,
            fifo: 0,
            fifo_count: self.points.len().min(i16::MAX as usize) as i16,
            buffer_count: 0,
        }
    }
}

/// The simulated coordinate system.
#[derive(Debug, Clone, Default)]
pub(crate) struct SimCoord {
    pub config: Option<CoordConfig>,
    pub queue: Vec<LineSegment>,
    pub executed: Vec<LineSegment>,
    pub running_polls: u32,
    pub stuck: bool,
}

impl SimCoord {
    pub fn status(&mut self) -> CoordStatus {
        let running = if self.stuck {
            true
        } else if self.running_polls > 0 {
            self.running_polls -= 1;
            true
        } else {
            false
        };
        CoordStatus {
            state: if running { CoordStatus::RUNNING } else { 0 },
            command_count: self.executed.len().min(i32::MAX as usize) as i32,
            space: 4096 - self.queue.len().min(4096) as i32,
        }
    }
}

/// Whole simulated controller.
#[derive(Debug, Default)]
pub(crate) struct SimState {
    pub cards: u16,
    pub opened: BTreeSet<u16>,
    pub home_initialised: bool,
    pub card_configs: Vec<(u16, PathBuf)>,
    pub settle_polls: u32,
    pub axes: HashMap<HwAxis, SimAxis>,
    pub compare: HashMap<u16, SimCompare>,
    pub coord: SimCoord,
    pub outputs: u32,
    pub inputs: u32,
    pub calls: Vec<DriverCall>,
    pub failures: Vec<(CallMatcher, i32)>,
}

impl SimState {
    pub fn new() -> Self {
        Self {
            cards: 1,
            settle_polls: 1,
            ..Default::default()
        }
    }

    /// Log a call and apply any injected failure.
    pub fn issue(&mut self, call: DriverCall) -> DriverResult<()> {
        let failure = self
            .failures
            .iter()
            .find(|(matches, _)| matches(&call))
            .map(|(_, code)| *code);
        self.calls.push(call);
        match failure {
            Some(code) => Err(DriverError(code)),
            None => Ok(()),
        }
    }

    pub fn axis(&mut self, axis: HwAxis) -> &mut SimAxis {
        self.axes.entry(axis).or_default()
    }

    pub fn channel(&mut self, channel: u16) -> &mut SimCompare {
        self.compare.entry(channel).or_default()
    }

    /// Start every axis of `card` selected by `mask` towards its target.
    pub fn start_moves(&mut self, card: u16, mask: u32) {
        let settle = self.settle_polls;
        for (hw, axis) in self.axes.iter_mut() {
            if hw.card == card && mask & hw.mask() != 0 {
                let target = f64::from(axis.target);
                axis.command = target;
                axis.encoder = target;
                axis.moving_polls = settle;
            }
        }
    }
}
