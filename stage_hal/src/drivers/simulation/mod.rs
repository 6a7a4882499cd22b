//! Simulation driver module.
//!
//! This module provides an in-memory motion controller for development and
//! testing without a controller card.

mod driver;
mod script;
mod state;

pub use driver::{ERR_CONFIG_FILE, ERR_NO_CARD, ERR_NOT_OPEN, SimulationDriver};
pub use script::{CallMatcher, DriverCall, HomeScript};

use stage_common::hal::driver::MotionDriver;
use std::sync::Arc;

/// Factory function to create a simulation driver instance.
pub fn create_driver() -> Arc<dyn MotionDriver> {
    Arc::new(SimulationDriver::new())
}
