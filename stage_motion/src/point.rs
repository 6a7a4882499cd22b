//! Coordinate tuples in millimetres.

use serde::{Deserialize, Serialize};

/// Planar target [mm].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    /// X [mm].
    pub x: f64,
    /// Y [mm].
    pub y: f64,
}

impl Point2 {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Spatial target [mm].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    /// X [mm].
    pub x: f64,
    /// Y [mm].
    pub y: f64,
    /// Z [mm].
    pub z: f64,
}

impl Point3 {
    /// Create a point.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}
