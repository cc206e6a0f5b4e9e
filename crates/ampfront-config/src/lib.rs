//! Settings for the ampfront audio front-end.
//!
//! A single TOML file holds the boot-time tunables: sample rate, volume,
//! initial source, filter cutoffs, playback chunking and transport timeouts.
//! Every field has a default, so a missing or partial file still yields a
//! complete [`Settings`].
//!
//! # Example
//!
//! ```rust,no_run
//! use ampfront_config::{Settings, paths};
//!
//! let settings = Settings::load_or_default(paths::default_settings_path()).unwrap();
//! for warning in settings.validate().unwrap() {
//!     eprintln!("warning: {warning}");
//! }
//! ```

mod error;
mod settings;

/// Platform-specific configuration paths.
#[cfg(feature = "std")]
pub mod paths;

/// Settings validation.
pub mod validation;

pub use error::ConfigError;
pub use settings::{FilterSettings, PlaybackSettings, Settings, Source, TransportSettings};
pub use validation::{ValidationError, ValidationWarning, validate_settings};

#[cfg(feature = "std")]
pub use paths::{default_settings_path, user_config_dir};
