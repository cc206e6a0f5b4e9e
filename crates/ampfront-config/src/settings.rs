//! The TOML settings file.

use crate::error::ConfigError;
use crate::validation::{ValidationError, ValidationWarning, validate_settings};
use ampfront_core::{AudioSource, DEFAULT_HIGHPASS_HZ, DEFAULT_LOWPASS_HZ, NEUTRAL_VOLUME_SCALE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which input the front-end starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Streaming link.
    Wireless,
    /// File playback.
    #[default]
    Storage,
}

impl From<Source> for AudioSource {
    fn from(source: Source) -> Self {
        match source {
            Source::Wireless => AudioSource::Wireless,
            Source::Storage => AudioSource::Storage,
        }
    }
}

/// Filter bank settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Whether samples go through the filter banks.
    pub enabled: bool,
    /// Low-pass cutoff in Hz.
    pub lowpass_hz: f32,
    /// High-pass cutoff in Hz.
    pub highpass_hz: f32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            lowpass_hz: DEFAULT_LOWPASS_HZ,
            highpass_hz: DEFAULT_HIGHPASS_HZ,
        }
    }
}

/// File playback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Payload bytes fed per chunk.
    pub chunk_size: usize,
    /// Delay after an implicit stop, in milliseconds.
    pub settle_ms: u64,
    /// Directory scanned for tracks.
    pub music_root: PathBuf,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            settle_ms: 10,
            music_root: PathBuf::from("/sd"),
        }
    }
}

/// Output transport settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Per-frame write timeout with filtering off, in milliseconds.
    pub unfiltered_timeout_ms: u64,
    /// Per-frame write timeout with filtering on, in milliseconds.
    pub filtered_timeout_ms: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            unfiltered_timeout_ms: 20,
            filtered_timeout_ms: 100,
        }
    }
}

/// Front-end settings as stored on disk. Every field has a default, so an
/// empty file is valid.
///
/// # Example
///
/// ```rust
/// use ampfront_config::Settings;
///
/// let settings = Settings::from_toml("volume = 7\n[filter]\nenabled = true").unwrap();
/// assert_eq!(settings.volume, 7);
/// assert!(settings.filter.enabled);
/// assert_eq!(settings.playback.chunk_size, 800);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Output sample rate in Hz before any file sets its own.
    pub sample_rate: u32,
    /// Volume on the 0-9 scale.
    pub volume: i32,
    /// Initial source.
    pub source: Source,
    /// Filter banks.
    pub filter: FilterSettings,
    /// File playback.
    pub playback: PlaybackSettings,
    /// Output transport.
    pub transport: TransportSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            volume: i32::from(NEUTRAL_VOLUME_SCALE),
            source: Source::default(),
            filter: FilterSettings::default(),
            playback: PlaybackSettings::default(),
            transport: TransportSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    ///
    /// A file the runtime cannot use is rejected with
    /// [`ConfigError::Validation`]. Clamp warnings are left to
    /// [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let settings = Self::from_toml(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`, or the defaults if the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save settings to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the settings to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks the settings. See [`validate_settings`].
    pub fn validate(&self) -> Result<Vec<ValidationWarning>, ValidationError> {
        validate_settings(self)
    }

    /// Initial routing.
    pub fn audio_source(&self) -> AudioSource {
        self.source.into()
    }

    /// Settle delay as a duration.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.playback.settle_ms)
    }

    /// Write timeout with filtering off.
    pub fn unfiltered_timeout(&self) -> Duration {
        Duration::from_millis(self.transport.unfiltered_timeout_ms)
    }

    /// Write timeout with filtering on.
    pub fn filtered_timeout(&self) -> Duration {
        Duration::from_millis(self.transport.filtered_timeout_ms)
    }
}
