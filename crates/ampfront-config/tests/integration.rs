//! Integration tests for ampfront-config: file round-trips and validation.

use ampfront_config::{ConfigError, Settings, Source, ValidationError, ValidationWarning};
use std::fs;
use tempfile::TempDir;

#[test]
fn save_creates_parent_dirs_and_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/config/settings.toml");

    let mut settings = Settings::default();
    settings.volume = 3;
    settings.source = Source::Wireless;
    settings.filter.enabled = true;
    settings.filter.highpass_hz = 120.0;
    settings.save(&path).unwrap();

    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn load_or_default_without_file() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load_or_default(dir.path().join("absent.toml")).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn load_missing_file_is_read_error() {
    let dir = TempDir::new().unwrap();
    let err = Settings::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn malformed_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "volume = \"loud\"").unwrap();
    assert!(matches!(
        Settings::load(&path),
        Err(ConfigError::TomlParse(_))
    ));
}

#[test]
fn hand_written_file_validates_with_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(
        &path,
        r#"
sample_rate = 48000
volume = -2

[filter]
enabled = true
lowpass_hz = 8000.0
highpass_hz = 1.0

[playback]
chunk_size = 1600
music_root = "/media/sd"
"#,
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.playback.settle_ms, 10);

    let warnings = settings.validate().unwrap();
    assert_eq!(warnings.len(), 2);
    assert!(matches!(warnings[0], ValidationWarning::Volume { value: -2 }));
    assert!(matches!(
        warnings[1],
        ValidationWarning::Cutoff {
            filter: "highpass",
            ..
        }
    ));
}

#[test]
fn odd_chunk_size_fails_validation() {
    let settings = Settings::from_toml("[playback]\nchunk_size = 801").unwrap();
    assert_eq!(settings.validate(), Err(ValidationError::ChunkSize(801)));

    let err: ConfigError = settings.validate().unwrap_err().into();
    assert!(err.to_string().contains("801"));
}

#[test]
fn load_rejects_unusable_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(&path, "sample_rate = 0\n").unwrap();

    let err = Settings::load(&path).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Validation(ValidationError::SampleRate(0))
    ));
    assert!(err.to_string().starts_with("invalid settings:"), "got: {err}");

    let err = Settings::load_or_default(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}
