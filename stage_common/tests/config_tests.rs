//! Parameter table tests.
//!
//! Loading `axis.toml` / `dio.toml` from disk, table validation, the
//! `ConfigError` -> `MotionError` mapping and write-back through `ConfigSaver`.

use stage_common::config::{ConfigError, ConfigLoader, ConfigSaver};
use stage_common::error::{status_code, MotionError, CONFIG_INVALID, FILE_NOT_EXIST, NO_ERROR};
use stage_common::hal::config::{AxisTable, HomeDirection, HomeMode, IoTable};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const AXES: &str = r#"
[[axis]]
card_id = 0
id = 1
name = "X"
pulse_per_mm = 1000.0

[axis.home]
mode = "origin_then_index"
direction = "negative"
max_search_distance = 250.0

[[axis]]
card_id = 0
id = 2
name = "Y"
pulse_per_mm = 0.0
"#;

fn write(dir: &Path, file: &str, content: &str) {
    fs::write(dir.join(file), content).unwrap();
}

fn load_axes(content: &str) -> Result<AxisTable, MotionError> {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "axis.toml", content);
    let table = AxisTable::load(&dir.path().join("axis.toml"))?;
    table.validate()?;
    Ok(table)
}

#[test]
fn test_axis_table_from_disk() {
    let table = load_axes(AXES).unwrap();
    assert_eq!(table.axis.len(), 2);

    let x = &table.axis[0];
    assert_eq!(x.home.mode, HomeMode::OriginThenIndex);
    assert_eq!(x.home.direction, HomeDirection::Negative);
    assert_eq!(x.home.max_search_distance, 250.0);
    assert_eq!(x.motion.max_seconds, 10.0);

    // A zero scale is accepted and converts with the fallback.
    let y = &table.axis[1];
    assert_eq!(y.home.mode, HomeMode::None);
    assert_eq!(y.units().mm_to_pulses(2.0), 2000);
}

#[test]
fn test_missing_file_maps_to_file_not_exist() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("axis.toml");
    let err: MotionError = AxisTable::load(&path).unwrap_err().into();
    assert_eq!(err, MotionError::FileNotExist(path));
    assert_eq!(err.code(), FILE_NOT_EXIST);
}

#[test]
fn test_malformed_table_maps_to_config_invalid() {
    let err = load_axes("[[axis]]\ncard_id = \"zero\"\n").unwrap_err();
    assert_eq!(err.code(), CONFIG_INVALID);
}

#[test]
fn test_unknown_home_mode_rejected() {
    let table = AXES.replace("origin_then_index", "laser");
    let err = load_axes(&table).unwrap_err();
    assert!(matches!(err, MotionError::ConfigInvalid(_)));
}

#[test]
fn test_zero_based_axis_id_rejected() {
    let table = AXES.replace("id = 2", "id = 0");
    let err = load_axes(&table).unwrap_err();
    assert!(matches!(err, MotionError::ConfigInvalid(ref msg) if msg.contains("id 0 outside 1..=32")));
}

#[test]
fn test_axis_id_past_mask_width_rejected() {
    let table = AXES.replace("id = 2", "id = 33");
    let err = load_axes(&table).unwrap_err();
    assert!(matches!(err, MotionError::ConfigInvalid(ref msg) if msg.contains("id 33")));
    assert!(load_axes(&AXES.replace("id = 2", "id = 32")).is_ok());
}

#[test]
fn test_shared_hardware_address_rejected() {
    let table = AXES.replace("id = 2", "id = 1");
    let err = load_axes(&table).unwrap_err();
    assert!(matches!(err, MotionError::ConfigInvalid(ref msg) if msg.contains("Duplicate hardware axis")));
}

#[test]
fn test_negative_timeout_rejected() {
    let table = format!("{AXES}\n[axis.motion]\nmax_seconds = -1.0\n");
    assert!(load_axes(&table).is_err());
}

#[test]
fn test_io_table_bit_range() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "dio.toml",
        "[[io]]\nname = \"lamp\"\nbit_no = 32\noutput = true\n",
    );
    let table = IoTable::load(&dir.path().join("dio.toml")).unwrap();
    assert!(matches!(table.validate(), Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_empty_io_table_is_valid() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "dio.toml", "");
    let table = IoTable::load(&dir.path().join("dio.toml")).unwrap();
    assert!(table.io.is_empty());
    assert!(table.validate().is_ok());
}

#[test]
fn test_save_and_reload_axis_table() {
    let dir = TempDir::new().unwrap();
    let mut table = load_axes(AXES).unwrap();
    table.axis[1].pulse_per_mm = 800.0;
    table.axis[1].home.mode = HomeMode::Probe;

    let path = dir.path().join("axis.toml");
    table.save(&path).unwrap();
    let reloaded = AxisTable::load(&path).unwrap();
    assert_eq!(reloaded, table);
    assert!(reloaded.validate().is_ok());
}

#[test]
fn test_status_code_contract() {
    assert_eq!(status_code(&Ok::<(), MotionError>(())), NO_ERROR);
    assert_eq!(status_code(&load_axes("[[axis]]\n")), CONFIG_INVALID);
}
