//! Axis and digital IO configuration.
//!
//! This module contains the persisted parameter tables:
//! - `AxisTable` - `axis.toml`, one `[[axis]]` per physical axis
//! - `IoTable` - `dio.toml`, one `[[io]]` per digital signal
//! - `AxisConfig` / `HomeParams` / `MotionParams` - Per-axis identity, calibration and parameters
//! - `DigitalIoConfig` - Per-signal identity and direction

use crate::config::ConfigError;
use crate::consts::{AXES_PER_CARD, IO_REGISTER_BITS};
use crate::hal::types::HwAxis;
use crate::units::UnitConverter;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

fn default_home_acc() -> f64 {
    0.1
}

fn default_home_vel() -> f64 {
    0.01
}

fn default_home_timeout() -> f64 {
    30.0
}

fn default_motion_acc() -> f64 {
    1.0
}

fn default_motion_vel() -> f64 {
    0.1
}

fn default_motion_timeout() -> f64 {
    10.0
}

/// Homing reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum HomeMode {
    /// Not configured; homing only zeroes the cached position.
    #[default]
    None = 0,
    /// Origin switch.
    OriginSwitch = 1,
    /// Encoder index (EZ) signal.
    IndexSignal = 2,
    /// Probe input.
    Probe = 3,
    /// Origin switch, then index signal.
    OriginThenIndex = 4,
}


/// Initial home search direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HomeDirection {
    /// Search towards +.
    #[default]
    Positive,
    /// Search towards -.
    Negative,
}

impl HomeDirection {
    /// Sign multiplier of the search distance.
    #[inline]
    pub const fn sign(&self) -> i32 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
        }
    }

    /// Opposite direction (used by the reversed homing pass).
    #[inline]
    pub const fn reversed(&self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

/// Homing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomeParams {
    /// Homing reference.
    #[serde(default)]
    pub mode: HomeMode,
    /// Acceleration [m/s²].
    #[serde(default = "default_home_acc")]
    pub acc: f64,
    /// Velocity [m/s].
    #[serde(default = "default_home_vel")]
    pub vel: f64,
    /// Offset applied after the reference is found [mm].
    #[serde(default)]
    pub offset: f64,
    /// Budget of each homing pass [s].
    #[serde(default = "default_home_timeout")]
    pub max_seconds: f64,
    /// Initial search direction.
    #[serde(default)]
    pub direction: HomeDirection,
    /// Maximum search travel [mm]; <= 0 means effectively unbounded.
    #[serde(default)]
    pub max_search_distance: f64,
}

impl Default for HomeParams {
    fn default() -> Self {
        Self {
            mode: HomeMode::None,
            acc: default_home_acc(),
            vel: default_home_vel(),
            offset: 0.0,
            max_seconds: default_home_timeout(),
            direction: HomeDirection::Positive,
            max_search_distance: 0.0,
        }
    }
}

/// Point-to-point motion parameters. Deceleration equals acceleration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionParams {
    /// Acceleration [m/s²].
    #[serde(default = "default_motion_acc")]
    pub acc: f64,
    /// Maximum velocity [m/s].
    #[serde(default = "default_motion_vel")]
    pub max_vel: f64,
    /// Budget of `motion_done` [s].
    #[serde(default = "default_motion_timeout")]
    pub max_seconds: f64,
}

impl MotionParams {
    /// Parameters for a move at `speed_ratio` of the configured speed.
    ///
    /// Acceleration scales with the square of the ratio and velocity with its
    /// magnitude, so the whole profile is time-scaled by `1 / |ratio|`.
    pub fn scaled(&self, speed_ratio: f64) -> Self {
        Self {
            acc: self.acc * speed_ratio * speed_ratio,
            max_vel: self.max_vel * speed_ratio.abs(),
            max_seconds: self.max_seconds,
        }
    }
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            acc: default_motion_acc(),
            max_vel: default_motion_vel(),
            max_seconds: default_motion_timeout(),
        }
    }
}

/// Identity, calibration and parameters of one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    /// Controller card index, 0-based.
    pub card_id: u16,
    /// Axis index within the card, 1-based.
    pub id: u16,
    /// Axis name (unique).
    pub name: String,
    /// Calibration scale [pulse/mm].
    pub pulse_per_mm: f64,
    /// Homing parameters.
    #[serde(default)]
    pub home: HomeParams,
    /// Motion parameters.
    #[serde(default)]
    pub motion: MotionParams,
}

impl AxisConfig {
    /// Hardware address.
    #[inline]
    pub const fn hw(&self) -> HwAxis {
        HwAxis::new(self.card_id, self.id)
    }

    /// Unit converter for this axis's calibration.
    #[inline]
    pub const fn units(&self) -> UnitConverter {
        UnitConverter::new(self.pulse_per_mm)
    }

    /// Validate the axis configuration.
    ///
    /// # Validation Rules
    /// 1. `name` not empty
    /// 2. `id` in `1..=AXES_PER_CARD`
    /// 3. Timeouts finite and >= 0
    ///
    /// A `pulse_per_mm` <= 0 is accepted; conversion falls back to the default scale.
    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "Axis {} has empty name",
                index
            )));
        }
        if self.id == 0 || self.id > AXES_PER_CARD {
            return Err(ConfigError::ValidationError(format!(
                "Axis '{}': id {} outside 1..={}",
                self.name, self.id, AXES_PER_CARD
            )));
        }
        for (field, value) in [
            ("home.max_seconds", self.home.max_seconds),
            ("motion.max_seconds", self.motion.max_seconds),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "Axis '{}': {} must be finite and >= 0",
                    self.name, field
                )));
            }
        }
        if self.pulse_per_mm <= 0.0 {
            warn!(
                "Axis '{}': pulse_per_mm {} <= 0, using fallback scale",
                self.name, self.pulse_per_mm
            );
        }
        Ok(())
    }
}

/// Identity and direction of one digital signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalIoConfig {
    /// Signal name (unique).
    pub name: String,
    /// Controller card index, 0-based.
    #[serde(default)]
    pub card_id: u16,
    /// Bit position in the register, 0-based.
    pub bit_no: u16,
    /// True for an output, false for an input.
    #[serde(default)]
    pub output: bool,
}

/// Contents of `axis.toml`.
///
/// # TOML Example
///
/// ```toml
/// [[axis]]
/// card_id = 0
/// id = 1
/// name = "X"
/// pulse_per_mm = 1000.0
///
/// [axis.home]
/// mode = "origin_switch"
/// vel = 0.02
///
/// [axis.motion]
/// acc = 2.0
/// max_vel = 0.3
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisTable {
    /// Axes in logical order (index = logical axis id).
    #[serde(default)]
    pub axis: Vec<AxisConfig>,
}

impl AxisTable {
    /// Validate every axis plus cross-axis uniqueness (names, hardware addresses).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        let mut addresses = HashSet::new();
        for (idx, axis) in self.axis.iter().enumerate() {
            axis.validate(idx)?;
            if !names.insert(axis.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate axis name: {}",
                    axis.name
                )));
            }
            if !addresses.insert(axis.hw()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate hardware axis {} ('{}')",
                    axis.hw(),
                    axis.name
                )));
            }
        }
        Ok(())
    }
}

/// Contents of `dio.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoTable {
    /// Signals in logical order.
    #[serde(default)]
    pub io: Vec<DigitalIoConfig>,
}

impl IoTable {
    /// Validate names and bit positions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for io in &self.io {
            if io.name.is_empty() {
                return Err(ConfigError::ValidationError(
                    "Digital IO with empty name".to_string(),
                ));
            }
            if !names.insert(io.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate digital IO name: {}",
                    io.name
                )));
            }
            if io.bit_no >= IO_REGISTER_BITS {
                return Err(ConfigError::ValidationError(format!(
                    "Digital IO '{}': bit_no {} exceeds register width {}",
                    io.name, io.bit_no, IO_REGISTER_BITS
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(name: &str, card_id: u16, id: u16) -> AxisConfig {
        AxisConfig {
            card_id,
            id,
            name: name.to_string(),
            pulse_per_mm: 1000.0,
            home: HomeParams::default(),
            motion: MotionParams::default(),
        }
    }

    #[test]
    fn test_home_mode_default() {
        assert_eq!(HomeMode::default(), HomeMode::None);
    }

    #[test]
    fn test_home_direction() {
        assert_eq!(HomeDirection::Positive.sign(), 1);
        assert_eq!(HomeDirection::Negative.sign(), -1);
        assert_eq!(HomeDirection::Positive.reversed(), HomeDirection::Negative);
        assert_eq!(HomeDirection::Negative.reversed(), HomeDirection::Positive);
    }

    #[test]
    fn test_motion_params_scaled() {
        let p = MotionParams {
            acc: 2.0,
            max_vel: 0.5,
            max_seconds: 3.0,
        };
        let half = p.scaled(0.5);
        assert_eq!(half.acc, 0.5);
        assert_eq!(half.max_vel, 0.25);
        assert_eq!(half.max_seconds, 3.0);

        let reversed = p.scaled(-2.0);
        assert_eq!(reversed.acc, 8.0);
        assert_eq!(reversed.max_vel, 1.0);
    }

    #[test]
    fn test_axis_validate() {
        assert!(axis("X", 0, 1).validate(0).is_ok());
        assert!(axis("", 0, 1).validate(0).is_err());
        assert!(axis("X", 0, 0).validate(0).is_err());
        assert!(axis("X", 0, 32).validate(0).is_ok());
        assert!(axis("X", 0, 33).validate(0).is_err());

        let mut bad = axis("X", 0, 1);
        bad.motion.max_seconds = f64::NAN;
        assert!(bad.validate(0).is_err());

        let mut zero_scale = axis("X", 0, 1);
        zero_scale.pulse_per_mm = 0.0;
        assert!(zero_scale.validate(0).is_ok());
    }

    #[test]
    fn test_axis_table_duplicates() {
        let table = AxisTable {
            axis: vec![axis("X", 0, 1), axis("X", 0, 2)],
        };
        assert!(table.validate().unwrap_err().to_string().contains("Duplicate axis name"));

        let table = AxisTable {
            axis: vec![axis("X", 0, 1), axis("Y", 0, 1)],
        };
        assert!(table.validate().unwrap_err().to_string().contains("Duplicate hardware"));

        let table = AxisTable {
            axis: vec![axis("X", 0, 1), axis("Y", 1, 1)],
        };
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_io_table_validate() {
        let io = |name: &str, bit_no| DigitalIoConfig {
            name: name.to_string(),
            card_id: 0,
            bit_no,
            output: true,
        };
        assert!(IoTable { io: vec![io("lamp", 0), io("valve", 31)] }.validate().is_ok());
        assert!(IoTable { io: vec![io("lamp", 0), io("lamp", 1)] }.validate().is_err());
        assert!(IoTable { io: vec![io("lamp", 32)] }.validate().is_err());
    }

    #[test]
    fn test_axis_table_toml_defaults() {
        let table: AxisTable = toml::from_str(
            r#"
[[axis]]
card_id = 0
id = 2
name = "Y"
pulse_per_mm = 500.0

[axis.home]
mode = "origin_then_index"
direction = "negative"
"#,
        )
        .unwrap();
        let y = &table.axis[0];
        assert_eq!(y.hw(), HwAxis::new(0, 2));
        assert_eq!(y.home.mode, HomeMode::OriginThenIndex);
        assert_eq!(y.home.direction, HomeDirection::Negative);
        assert_eq!(y.home.max_seconds, 30.0);
        assert_eq!(y.motion, MotionParams::default());
        assert_eq!(y.units().scale(), 500.0);
    }
}
