//! # Stage HAL Library
//!
//! Motion-controller drivers behind the `MotionDriver` trait defined in
//! `stage_common::hal::driver`, plus a registry for selecting one by name.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌───────────────────┐     ┌──────────────────┐
//! │   stage_motion   │────►│ Arc<dyn           │◄────│ DriverRegistry   │
//! │ (axes, system)   │     │   MotionDriver>   │     │ "simulation", .. │
//! └──────────────────┘     └───────────────────┘     └──────────────────┘
//! ```

#![deny(missing_docs)]

pub mod driver_registry;
pub mod drivers;

pub use crate::driver_registry::DriverRegistry;
pub use crate::drivers::simulation::SimulationDriver;
