//! Driver capability interface and axis/IO configuration.
//!
//! The vendor motion-controller driver is consumed through
//! [`driver::MotionDriver`]; [`types`] holds the values exchanged with it and
//! [`config`] the persisted axis and IO tables.

pub mod config;
pub mod consts;
pub mod driver;
pub mod types;
