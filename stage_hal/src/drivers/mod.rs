//! Motion driver implementations.
//!
//! - [`simulation`] - In-memory controller for development and testing
//!
//! A vendor driver lives in its own submodule, implements
//! `stage_common::hal::driver::MotionDriver` and gets an entry in
//! [`BUILTIN_DRIVERS`].

pub mod simulation;

use stage_common::hal::driver::DriverFactory;

/// Drivers preloaded by `DriverRegistry::with_builtin`.
pub const BUILTIN_DRIVERS: &[(&str, DriverFactory)] = &[("simulation", simulation::create_driver)];
