//! Stage Common Library
//!
//! Shared types for every crate in the stage motion workspace.
//!
//! # Module Structure
//!
//! - [`error`] - `MotionError` and the numeric status-code contract
//! - [`consts`] - System-wide constants (file names, fallbacks, poll defaults)
//! - [`units`] - Millimetre/pulse unit conversion
//! - [`config`] - TOML loading/saving traits and shared configuration
//! - [`logging`] - `tracing` subscriber setup
//! - [`hal`] - Driver capability trait, driver value types and axis/IO configuration
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use stage_common::prelude::*;
//!
//! let units = UnitConverter::new(2000.0);
//! assert_eq!(units.mm_to_pulses(1.5), 3000);
//! ```

pub mod config;
pub mod consts;
pub mod error;
pub mod hal;
pub mod logging;
pub mod prelude;
pub mod units;
