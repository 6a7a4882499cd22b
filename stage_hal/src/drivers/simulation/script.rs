//! Call log and scripted behaviours of the simulation driver.

use stage_common::hal::types::{
    CompareMode, CompareParams, ComparePoint, CoordConfig, HomeCommand, HwAxis, LinearCompare,
    LineSegment, PulseBurst, TrapProfile,
};
use std::path::PathBuf;

/// One recorded driver call with its arguments.
///
/// Variants are named after the `MotionDriver` method they record.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    EnumerateCards,
    Open(u16),
    Close,
    ResetController,
    HomeInit,
    LoadCardConfig(u16, PathBuf),
    Enable(HwAxis),
    Disable(HwAxis),
    ReadStatus(HwAxis),
    ReadCommand(HwAxis),
    ReadEncoder(HwAxis),
    Home(HwAxis, HomeCommand),
    HomeStatus(HwAxis),
    ZeroPosition(HwAxis),
    SetTrapProfile(HwAxis, TrapProfile),
    SetTargetPosition(HwAxis, i32),
    SetTargetVelocity(HwAxis, f64),
    Update { card: u16, mask: u32 },
    ClearStatus(HwAxis),
    AxisResetEdge(HwAxis, bool),
    CompareStop(u16),
    CompareClear(u16),
    CompareMode(u16, CompareMode),
    CompareSetParams(u16, CompareParams),
    CompareUpload(u16, Vec<ComparePoint>),
    CompareStatus(u16),
    CompareStart(u16),
    CompareLinear(HwAxis, LinearCompare),
    ComparePulse(u16, PulseBurst),
    SetCoordParams(i16, CoordConfig),
    CoordClear(i16, i16),
    CoordLine(i16, i16, LineSegment),
    CoordStart(u16, u16),
    CoordStatus(i16, i16),
    ReadOutputs,
    ReadInputs(i16),
    SetOutputBit(u16, bool),
}

impl DriverCall {
    /// True for calls that only read state.
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            Self::EnumerateCards
                | Self::ReadStatus(_)
                | Self::ReadCommand(_)
                | Self::ReadEncoder(_)
                | Self::HomeStatus(_)
                | Self::CompareStatus(_)
                | Self::CoordStatus(..)
                | Self::ReadOutputs
                | Self::ReadInputs(_)
        )
    }

    /// Hardware axis addressed by this call, if any.
    pub fn axis(&self) -> Option<HwAxis> {
        match self {
            Self::Enable(a)
            | Self::Disable(a)
            | Self::ReadStatus(a)
            | Self::ReadCommand(a)
            | Self::ReadEncoder(a)
            | Self::Home(a, _)
            | Self::HomeStatus(a)
            | Self::ZeroPosition(a)
            | Self::SetTrapProfile(a, _)
            | Self::SetTargetPosition(a, _)
            | Self::SetTargetVelocity(a, _)
            | Self::ClearStatus(a)
            | Self::AxisResetEdge(a, _)
            | Self::CompareLinear(a, _) => Some(*a),
            _ => None,
        }
    }
}

/// Predicate selecting calls that should fail.
pub type CallMatcher = fn(&DriverCall) -> bool;

/// How an axis responds to hardware homing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeScript {
    /// The first pass finds the reference; the positive limit stays clear.
    #[default]
    Clean,
    /// The first pass stops on the positive limit. The reversed pass reports
    /// "searching" for `searching_polls` status reads, then success, and the
    /// limit releases.
    PositiveLimitFirst {
        /// Home status reads answered with "searching".
        searching_polls: u32,
    },
    /// Like `PositiveLimitFirst`, but the reversed pass ends on the negative limit.
    NegativeLimitAfterReverse,
    /// The first pass stops on the positive limit and the reversed pass
    /// reports the given raw home status.
    ReverseFails(u16),
}

impl HomeScript {
    /// True if the first pass ends on the positive limit.
    pub const fn hits_positive_limit(&self) -> bool {
        !matches!(self, Self::Clean)
    }
}
