//! Shared fixtures: a configuration directory and a system over the simulation driver.

#![allow(dead_code)]

use stage_hal::drivers::simulation::SimulationDriver;
use stage_motion::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Logical ids of the fixture axes.
pub const X: usize = 0;
pub const Y: usize = 1;
pub const Z: usize = 2;
pub const W: usize = 3;

/// X, Y, Z on card 0 (ids 1..3), W on card 1 (id 1, no home mode).
pub const AXES: &str = r#"
[[axis]]
card_id = 0
id = 1
name = "X"
pulse_per_mm = 1000.0

[axis.home]
mode = "origin_switch"
max_seconds = 2.0

[axis.motion]
acc = 1.0
max_vel = 0.2
max_seconds = 1.0

[[axis]]
card_id = 0
id = 2
name = "Y"
pulse_per_mm = 2000.0

[axis.home]
mode = "index_signal"
max_seconds = 2.0

[axis.motion]
max_seconds = 1.0

[[axis]]
card_id = 0
id = 3
name = "Z"
pulse_per_mm = 500.0

[axis.motion]
max_seconds = 1.0

[[axis]]
card_id = 1
id = 1
name = "W"
pulse_per_mm = 1000.0

[axis.motion]
max_seconds = 1.0
"#;

pub const IOS: &str = r#"
[[io]]
name = "vacuum"
bit_no = 2
output = true

[[io]]
name = "part_present"
bit_no = 5
output = false
"#;

pub const FAST_TIMING: &str = r#"
[shared]
service_name = "bench"

[timing]
motion_poll_ms = 0
home_poll_ms = 0
line_poll_ms = 0
settle_ms = 0
line_timeout_seconds = 1.0
"#;

/// Write the axis, IO and timing tables plus `0.cfg` and `1.cfg`.
pub fn write_config(dir: &Path) {
    fs::write(dir.join("axis.toml"), AXES).unwrap();
    fs::write(dir.join("dio.toml"), IOS).unwrap();
    fs::write(dir.join("motion.toml"), FAST_TIMING).unwrap();
    fs::write(dir.join("0.cfg"), "vendor").unwrap();
    fs::write(dir.join("1.cfg"), "vendor").unwrap();
}

pub fn config_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());
    dir
}

/// Online system over a two-card simulation driver, call log cleared.
pub fn online() -> (TempDir, Arc<SimulationDriver>, MotionSystem) {
    let dir = config_dir();
    let driver = Arc::new(SimulationDriver::new().with_cards(2));
    let system = MotionSystem::init(dir.path(), OperatingMode::Online(driver.clone())).unwrap();
    driver.clear_calls();
    (dir, driver, system)
}

pub fn offline() -> (TempDir, MotionSystem) {
    let dir = config_dir();
    let system = MotionSystem::init(dir.path(), OperatingMode::Offline).unwrap();
    (dir, system)
}
