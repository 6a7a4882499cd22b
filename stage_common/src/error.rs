//! Motion error type and numeric status codes.
//!
//! Every fallible operation returns `Result<T, MotionError>`. Callers that need
//! the integer status contract (0 = success, negative vendor codes passed
//! through, a fixed set of named coordinator codes) use [`MotionError::code`]
//! or [`status_code`].

use crate::config::ConfigError;
use crate::hal::driver::DriverError;
use std::path::PathBuf;
use thiserror::Error;

/// Success.
pub const NO_ERROR: i32 = 0;
/// A required parameter file is missing.
pub const FILE_NOT_EXIST: i32 = -1000;
/// A logical axis or IO index is out of range.
pub const ID_OUT_OF_RANGE: i32 = -1001;
/// A blocking wait exceeded its budget.
pub const TIME_OUT: i32 = -1002;
/// Negative limit asserted at the end of homing.
pub const NEL: i32 = -1003;
/// Positive limit asserted at the end of homing.
pub const PEL: i32 = -1004;
/// Interpolated axes are spread over more than one card.
pub const AXES_NOT_IN_ONE_CARD: i32 = -1005;
/// A parameter file exists but cannot be used.
pub const CONFIG_INVALID: i32 = -1006;
/// Reversed homing pass reported an unknown home status.
pub const HOME_FAILED: i32 = 1;

/// Errors produced by axis, IO and coordinator operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    /// Parameter file missing.
    #[error("Parameter file does not exist: {0}")]
    FileNotExist(PathBuf),

    /// Logical index outside the configured table.
    #[error("Id {id} out of range (count {count})")]
    IdOutOfRange {
        /// Requested index
        id: usize,
        /// Number of entries in the table
        count: usize,
    },

    /// Blocking wait exceeded its budget.
    #[error("{what} timed out after {seconds}s")]
    TimeOut {
        /// Which wait expired
        what: &'static str,
        /// Budget in seconds
        seconds: f64,
    },

    /// Homing ended with the negative limit asserted.
    #[error("Negative limit asserted")]
    NegativeLimit,

    /// Homing ended with the positive limit asserted.
    #[error("Positive limit asserted")]
    PositiveLimit,

    /// Interpolation requested across controller cards.
    #[error("Axes are not on one card")]
    AxesNotInOneCard,

    /// Home status register returned a value other than searching/success.
    #[error("Homing failed with home status {status}")]
    HomeFailed {
        /// Raw home status
        status: u16,
    },

    /// Parameter file unreadable as structured data or semantically invalid.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Non-zero status returned by the driver, uninterpreted.
    #[error("Driver error {0}")]
    Driver(i32),
}

impl MotionError {
    /// Numeric status code of this error.
    pub const fn code(&self) -> i32 {
        match self {
            Self::FileNotExist(_) => FILE_NOT_EXIST,
            Self::IdOutOfRange { .. } => ID_OUT_OF_RANGE,
            Self::TimeOut { .. } => TIME_OUT,
            Self::NegativeLimit => NEL,
            Self::PositiveLimit => PEL,
            Self::AxesNotInOneCard => AXES_NOT_IN_ONE_CARD,
            Self::HomeFailed { .. } => HOME_FAILED,
            Self::ConfigInvalid(_) => CONFIG_INVALID,
            Self::Driver(code) => *code,
        }
    }

    /// True for the limit-switch outcomes of homing.
    pub const fn is_limit(&self) -> bool {
        matches!(self, Self::NegativeLimit | Self::PositiveLimit)
    }
}

impl From<DriverError> for MotionError {
    fn from(err: DriverError) -> Self {
        Self::Driver(err.0)
    }
}

impl From<ConfigError> for MotionError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::FileNotFound(path) => Self::FileNotExist(path),
            other => Self::ConfigInvalid(other.to_string()),
        }
    }
}

/// Collapse a result into the integer status contract.
pub fn status_code<T>(result: &Result<T, MotionError>) -> i32 {
    match result {
        Ok(_) => NO_ERROR,
        Err(e) => e.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_codes_match_contract() {
        assert_eq!(MotionError::FileNotExist(PathBuf::from("axis.toml")).code(), -1000);
        assert_eq!(MotionError::IdOutOfRange { id: 3, count: 2 }.code(), -1001);
        assert_eq!(
            MotionError::TimeOut {
                what: "motion",
                seconds: 1.0
            }
            .code(),
            -1002
        );
        assert_eq!(MotionError::NegativeLimit.code(), -1003);
        assert_eq!(MotionError::PositiveLimit.code(), -1004);
        assert_eq!(MotionError::AxesNotInOneCard.code(), -1005);
        assert_eq!(MotionError::HomeFailed { status: 7 }.code(), 1);
    }

    #[test]
    fn driver_codes_pass_through() {
        let err: MotionError = DriverError(-7).into();
        assert_eq!(err, MotionError::Driver(-7));
        assert_eq!(err.code(), -7);

        let err: MotionError = DriverError(42).into();
        assert_eq!(err.code(), 42);
    }

    #[test]
    fn status_code_of_ok_is_zero() {
        let ok: Result<(), MotionError> = Ok(());
        assert_eq!(status_code(&ok), NO_ERROR);
        let err: Result<(), MotionError> = Err(MotionError::AxesNotInOneCard);
        assert_eq!(status_code(&err), AXES_NOT_IN_ONE_CARD);
    }

    #[test]
    fn config_errors_map_to_motion_errors() {
        let missing = ConfigError::FileNotFound(PathBuf::from("/x/dio.toml"));
        assert!(matches!(MotionError::from(missing), MotionError::FileNotExist(_)));

        let parse = ConfigError::ParseError("bad".to_string());
        assert_eq!(MotionError::from(parse).code(), CONFIG_INVALID);
    }

    #[test]
    fn limit_outcomes() {
        assert!(MotionError::NegativeLimit.is_limit());
        assert!(MotionError::PositiveLimit.is_limit());
        assert!(!MotionError::AxesNotInOneCard.is_limit());
    }
}
