// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use photo_journal::Config;
use photo_journal::backends::camera::CameraFacing;
use photo_journal::constants::PhotoTimerSetting;
use std::time::Duration;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.compression.reference_width, 1290);
    assert_eq!(config.compression.width_multiplier, 1.0);
    assert_eq!(config.compression.quality, 0.8);
    assert_eq!(config.camera.timer, PhotoTimerSetting::Off);
    assert_eq!(config.camera.facing, CameraFacing::Back);
    assert_eq!(config.slideshow_interval(), Duration::from_secs(3));
    assert!(config.compress_imports);
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings").join("config.json");

    let mut config = Config::default();
    config.compression.quality = 0.55;
    config.camera.timer = PhotoTimerSetting::Sec10;
    config.camera.facing = CameraFacing::Front;
    config.export_dir = Some(dir.path().join("out"));
    config.save_to(&path).unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), config);
}

#[test]
fn test_out_of_range_values_are_clamped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "compression": { "width_multiplier": 9.0, "quality": 0.01, "reference_width": 10 },
            "camera": { "ghost_opacity": 2.5 },
            "slideshow_interval_secs": 0
        }"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.compression.width_multiplier, 3.0);
    assert_eq!(config.compression.quality, 0.1);
    assert_eq!(config.compression.reference_width, 64);
    assert_eq!(config.camera.ghost_opacity, 1.0);
    assert_eq!(config.slideshow_interval_secs, 1);
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "camera": { "timer": "Sec5" } }"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.camera.timer, PhotoTimerSetting::Sec5);
    assert_eq!(config.compression, Config::default().compression);
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(Config::load_from(&path).is_err());
}
