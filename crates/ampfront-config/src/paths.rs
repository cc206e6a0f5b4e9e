//! Platform-specific configuration paths.
//!
//! - Linux: `~/.config/ampfront/`
//! - macOS: `~/Library/Application Support/ampfront/`
//! - Windows: `%APPDATA%\ampfront\`

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "ampfront";

/// File name of the settings file inside the config directory.
pub const SETTINGS_FILE: &str = "settings.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the default settings file path.
pub fn default_settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_ends_with_app_name() {
        assert!(user_config_dir().ends_with(APP_NAME));
    }

    #[test]
    fn test_settings_path_is_inside_config_dir() {
        let path = default_settings_path();
        assert_eq!(path.parent(), Some(user_config_dir().as_path()));
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(SETTINGS_FILE));
    }
}
