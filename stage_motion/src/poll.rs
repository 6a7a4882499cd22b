//! Polling contract of the blocking operations.
//!
//! `home`, `motion_done` and `line_done` are synchronous wait loops. Each
//! loop pauses for a fixed interval between status reads and gives up once
//! a [`Deadline`] on the monotonic clock has passed. Intervals come from
//! [`PollTiming`] (the `[timing]` table of `motion.toml`) so tests can run
//! against the simulation driver with near-zero pauses.

use serde::{Deserialize, Serialize};
use stage_common::consts::{
    DEFAULT_HOME_POLL_MS, DEFAULT_LINE_POLL_MS, DEFAULT_LINE_TIMEOUT_S, DEFAULT_MOTION_POLL_MS,
    DEFAULT_SETTLE_MS,
};
use std::thread;
use std::time::{Duration, Instant};

fn default_motion_poll_ms() -> u64 {
    DEFAULT_MOTION_POLL_MS
}

fn default_home_poll_ms() -> u64 {
    DEFAULT_HOME_POLL_MS
}

fn default_line_poll_ms() -> u64 {
    DEFAULT_LINE_POLL_MS
}

fn default_settle_ms() -> u64 {
    DEFAULT_SETTLE_MS
}

fn default_line_timeout_seconds() -> f64 {
    DEFAULT_LINE_TIMEOUT_S
}

/// Poll intervals and settle delays.
///
/// # TOML Example
///
/// ```toml
/// [timing]
/// motion_poll_ms = 5
/// home_poll_ms = 100
/// line_poll_ms = 10
/// settle_ms = 100
/// line_timeout_seconds = 20.0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollTiming {
    /// Interval of `motion_done` [ms].
    #[serde(default = "default_motion_poll_ms")]
    pub motion_poll_ms: u64,
    /// Interval of both homing passes [ms].
    #[serde(default = "default_home_poll_ms")]
    pub home_poll_ms: u64,
    /// Interval of `line_done` [ms].
    #[serde(default = "default_line_poll_ms")]
    pub line_poll_ms: u64,
    /// Delay after homing success and before batched or interpolated waits [ms].
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Default budget of `line_done` [s].
    #[serde(default = "default_line_timeout_seconds")]
    pub line_timeout_seconds: f64,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            motion_poll_ms: DEFAULT_MOTION_POLL_MS,
            home_poll_ms: DEFAULT_HOME_POLL_MS,
            line_poll_ms: DEFAULT_LINE_POLL_MS,
            settle_ms: DEFAULT_SETTLE_MS,
            line_timeout_seconds: DEFAULT_LINE_TIMEOUT_S,
        }
    }
}

impl PollTiming {
    /// Timing with every interval set to `ms`, for fake drivers.
    pub fn uniform(ms: u64) -> Self {
        Self {
            motion_poll_ms: ms,
            home_poll_ms: ms,
            line_poll_ms: ms,
            settle_ms: ms,
            line_timeout_seconds: DEFAULT_LINE_TIMEOUT_S,
        }
    }

    /// Interval of `motion_done`.
    #[inline]
    pub fn motion_poll(&self) -> Duration {
        Duration::from_millis(self.motion_poll_ms)
    }

    /// Interval of homing.
    #[inline]
    pub fn home_poll(&self) -> Duration {
        Duration::from_millis(self.home_poll_ms)
    }

    /// Interval of `line_done`.
    #[inline]
    pub fn line_poll(&self) -> Duration {
        Duration::from_millis(self.line_poll_ms)
    }

    /// Settle delay.
    #[inline]
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Point on the monotonic clock after which a wait gives up.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start a budget of `seconds`.
    ///
    /// Negative and non-finite budgets count as zero. A finite budget too
    /// large for a `Duration` is unbounded.
    pub fn after_seconds(seconds: f64) -> Self {
        let budget = if !seconds.is_finite() || seconds <= 0.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
        };
        Self {
            start: Instant::now(),
            budget,
        }
    }

    /// True once more than the budget has elapsed.
    #[inline]
    pub fn expired(&self) -> bool {
        self.start.elapsed() > self.budget
    }
}

/// Sleep for `interval`; zero returns immediately.
#[inline]
pub fn pause(interval: Duration) {
    if !interval.is_zero() {
        thread::sleep(interval);
    }
}
