//! # Stage Motion
//!
//! Unit-aware axis control and multi-axis coordination over a
//! motion-controller driver.
//!
//! # Module Structure
//!
//! - [`axis`] - `Axis`: enable, homing, moves, completion, triggers, status
//! - [`io`] - `DigitalIo`: named digital bits
//! - [`backend`] - Live (driver) and simulated (cache-only) device backends
//! - [`system`] - `MotionSystem`: init/discard, batched moves, interpolation, parameter save
//! - [`poll`] - Poll intervals, settle delays and deadlines of the blocking operations
//! - [`point`] - Millimetre coordinate tuples
//!
//! # Usage
//!
//! ```rust,no_run
//! use stage_motion::prelude::*;
//! use std::path::Path;
//!
//! fn main() -> Result<(), MotionError> {
//!     let mut system = MotionSystem::init(Path::new("config"), OperatingMode::Offline)?;
//!     system.axis_mut(0)?.home()?;
//!     system.abs_move_xy_over(0, 1, Point2::new(10.0, 20.0), 0.5)?;
//!     system.line_xy_over(0, 1, Point2::new(0.0, 0.0), 0.05, 0.5, None)?;
//!     system.discard()
//! }
//! ```

pub mod axis;
pub mod backend;
pub mod io;
pub mod point;
pub mod poll;
pub mod system;

/// Common re-exports.
pub mod prelude {
    pub use crate::axis::Axis;
    pub use crate::io::DigitalIo;
    pub use crate::point::{Point2, Point3};
    pub use crate::poll::PollTiming;
    pub use crate::system::{MotionSystem, OperatingMode, SystemConfig};
    pub use stage_common::error::MotionError;
}
