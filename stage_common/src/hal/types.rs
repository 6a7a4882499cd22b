//! Values exchanged with the motion-controller driver.
//!
//! - `HwAxis` - Hardware address of one axis (card + 1-based id)
//! - `StatusBits` / `MotionIo` - Axis status register and its decoded form
//! - `HomeCommand` / `HomeStatus` - Hardware homing
//! - `TrapProfile` - Trapezoidal point-to-point profile
//! - `CompareParams` / `ComparePoint` / `CompareStatus` / `LinearCompare` / `PulseBurst` - Position compare
//! - `CoordConfig` / `LineSegment` / `CoordStatus` - Coordinate system interpolation

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hardware address of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HwAxis {
    /// Controller card index, 0-based.
    pub card: u16,
    /// Axis index within the card, 1-based.
    pub id: u16,
}

impl HwAxis {
    /// Create a hardware address.
    pub const fn new(card: u16, id: u16) -> Self {
        Self { card, id }
    }

    /// Bit of this axis in a per-card axis mask (`1 << (id - 1)`).
    ///
    /// 0 for an id past the mask width.
    #[inline]
    pub const fn mask(&self) -> u32 {
        match 1u32.checked_shl(self.id.saturating_sub(1) as u32) {
            Some(mask) => mask,
            None => 0,
        }
    }
}

impl fmt::Display for HwAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card{}/axis{}", self.card, self.id)
    }
}

bitflags! {
    /// Axis status register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StatusBits: u32 {
        /// Drive alarm.
        const ALARM          = 0x0002;
        /// Positive limit switch.
        const POSITIVE_LIMIT = 0x0020;
        /// Negative limit switch.
        const NEGATIVE_LIMIT = 0x0040;
        /// Drive energised.
        const ENABLED        = 0x0200;
        /// Profile generator running.
        const MOVING         = 0x0400;
    }
}

/// Decoded limit/enable/moving/alarm snapshot of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MotionIo {
    /// Positive limit asserted.
    pub positive_limit: bool,
    /// Negative limit asserted.
    pub negative_limit: bool,
    /// Drive energised.
    pub enabled: bool,
    /// Axis moving.
    pub moving: bool,
    /// Drive alarm.
    pub alarm: bool,
}

impl From<StatusBits> for MotionIo {
    fn from(bits: StatusBits) -> Self {
        Self {
            positive_limit: bits.contains(StatusBits::POSITIVE_LIMIT),
            negative_limit: bits.contains(StatusBits::NEGATIVE_LIMIT),
            enabled: bits.contains(StatusBits::ENABLED),
            moving: bits.contains(StatusBits::MOVING),
            alarm: bits.contains(StatusBits::ALARM),
        }
    }
}

/// Hardware home command, all quantities in device units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomeCommand {
    /// Signed search distance; the sign selects the direction.
    pub search_pulses: i32,
    /// Search velocity (pulse/ms).
    pub vel: f64,
    /// Search acceleration (pulse/ms²).
    pub acc: f64,
    /// Offset applied after the reference is found (pulses).
    pub offset_pulses: i32,
}

/// Result of the driver's home status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeStatus {
    /// Still searching for the reference.
    Searching,
    /// Reference found.
    Success,
    /// Any other raw value.
    Failed(u16),
}

impl HomeStatus {
    /// Decode the raw register value (0 = searching, 1 = success).
    pub const fn from_raw(raw: u16) -> Self {
        match raw {
            0 => Self::Searching,
            1 => Self::Success,
            other => Self::Failed(other),
        }
    }

    /// Raw register value.
    pub const fn raw(&self) -> u16 {
        match self {
            Self::Searching => 0,
            Self::Success => 1,
            Self::Failed(raw) => *raw,
        }
    }
}

/// Trapezoidal profile parameters (device units).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapProfile {
    /// Acceleration (pulse/ms²).
    pub acc: f64,
    /// Deceleration (pulse/ms²).
    pub dec: f64,
    /// Start velocity (pulse/ms).
    pub vel_start: f64,
    /// Smoothing time (ms).
    pub smooth_time: i16,
}

/// Compare channel dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum CompareMode {
    /// Compare one encoder against a position list.
    OneDimensional = 0,
    /// Compare two encoders against a point list.
    TwoDimensional = 1,
}

/// Compare source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum CompareSource {
    /// Profile (command) position.
    Profile = 0,
    /// Encoder (feedback) position.
    Encoder = 1,
}

/// Compare output shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum CompareOutput {
    /// Pulse of `pulse_width` µs.
    Pulse = 0,
    /// Level toggle.
    Level = 1,
}

/// Compare channel parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompareParams {
    /// Primary encoder (axis id).
    pub enc_x: i16,
    /// Paired encoder, must differ from `enc_x`.
    pub enc_y: i16,
    /// Position source.
    pub source: CompareSource,
    /// Output shape.
    pub output: CompareOutput,
    /// Output pulse width (µs).
    pub pulse_width: i16,
    /// Output level at start.
    pub start_level: i16,
    /// Position error tolerance (pulses).
    pub max_err: i32,
    /// Threshold (pulses).
    pub threshold: i32,
    /// Pulses per hit.
    pub pulse_count: i16,
    /// Spacing between pulses of one hit (µs).
    pub space_time: i16,
}

/// One compare point (pulses).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComparePoint {
    /// Primary coordinate.
    pub px: i32,
    /// Paired coordinate (unused in one-dimensional mode).
    pub py: i32,
}

/// Compare channel status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompareStatus {
    /// Raw run state; 0 = stopped.
    pub state: i16,
    /// Compare hits so far.
    pub count: i32,
    /// Active FIFO.
    pub fifo: i16,
    /// Points left in the FIFO.
    pub fifo_count: i16,
    /// Points left in the buffer.
    pub buffer_count: i16,
}

impl CompareStatus {
    /// True while the comparator is armed.
    #[inline]
    pub const fn is_armed(&self) -> bool {
        self.state != 0
    }
}

/// Evenly spaced compare program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearCompare {
    /// Channel.
    pub channel: u16,
    /// First compare position (pulses, absolute).
    pub start: i32,
    /// Number of positions.
    pub count: i32,
    /// Spacing (pulses, may be negative).
    pub interval: i32,
    /// Output pulse width (µs).
    pub pulse_width: i16,
    /// Output level at start.
    pub start_level: i16,
}

/// Immediate software-fired pulse burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseBurst {
    /// Output level.
    pub level: i16,
    /// Output shape.
    pub output: CompareOutput,
    /// Pulse width (µs).
    pub pulse_width: i16,
    /// Number of pulses.
    pub count: i32,
    /// Interval between pulses (µs).
    pub interval_us: i16,
}

/// Coordinate system parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordConfig {
    /// Number of participating axes.
    pub dimension: i16,
    /// Hardware axis id per coordinate dimension (0 = unused).
    pub profile: [i16; 8],
    /// Origin per dimension (pulses).
    pub origin: [i32; 8],
    /// Whether `origin` is applied.
    pub set_origin: bool,
    /// Even time (ms).
    pub even_time: i16,
    /// Synchronised acceleration cap.
    pub syn_acc_max: f64,
    /// Synchronised velocity cap.
    pub syn_vel_max: f64,
    /// Synchronised deceleration smoothing.
    pub dec_smooth: i16,
    /// Abrupt-stop deceleration.
    pub dec_abrupt: f64,
}

/// Straight-line interpolation segment (device units).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    /// Target per dimension (pulses); `dimension` entries are used.
    pub target: [i32; 3],
    /// Number of used dimensions (2 or 3).
    pub dimension: usize,
    /// Resultant velocity (pulse/ms).
    pub vel: f64,
    /// Resultant acceleration (pulse/ms²).
    pub acc: f64,
    /// End velocity (pulse/ms).
    pub end_vel: f64,
}

/// Coordinate system run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoordStatus {
    /// Raw run state; 1 = running.
    pub state: i16,
    /// Segments executed.
    pub command_count: i32,
    /// Free space in the command buffer.
    pub space: i32,
}

impl CoordStatus {
    /// Raw state value reported while a segment executes.
    pub const RUNNING: i16 = 1;

    /// True while interpolation is running.
    #[inline]
    pub const fn is_running(&self) -> bool {
        self.state == Self::RUNNING
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bits_decode() {
        let bits = StatusBits::from_bits_truncate(0x0020 | 0x0400 | 0x1);
        let io = MotionIo::from(bits);
        assert!(io.positive_limit);
        assert!(io.moving);
        assert!(!io.negative_limit);
        assert!(!io.enabled);
        assert!(!io.alarm);

        let io = MotionIo::from(StatusBits::ALARM | StatusBits::ENABLED | StatusBits::NEGATIVE_LIMIT);
        assert!(io.alarm && io.enabled && io.negative_limit);
    }

    #[test]
    fn home_status_roundtrip() {
        assert_eq!(HomeStatus::from_raw(0), HomeStatus::Searching);
        assert_eq!(HomeStatus::from_raw(1), HomeStatus::Success);
        assert_eq!(HomeStatus::from_raw(9), HomeStatus::Failed(9));
        for raw in 0..4u16 {
            assert_eq!(HomeStatus::from_raw(raw).raw(), raw);
        }
    }

    #[test]
    fn axis_mask() {
        assert_eq!(HwAxis::new(0, 1).mask(), 0b1);
        assert_eq!(HwAxis::new(1, 4).mask(), 0b1000);
        assert_eq!(HwAxis::new(0, 32).mask(), 1 << 31);
        assert_eq!(HwAxis::new(0, 33).mask(), 0);
        assert_eq!(HwAxis::new(0, 2).to_string(), "card0/axis2");
    }

    #[test]
    fn compare_and_coord_states() {
        assert!(!CompareStatus::default().is_armed());
        assert!(CompareStatus { state: 1, ..Default::default() }.is_armed());
        assert!(!CoordStatus::default().is_running());
        assert!(CoordStatus { state: CoordStatus::RUNNING, ..Default::default() }.is_running());
    }
}
