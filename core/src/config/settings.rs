//! User settings (~/.config/romdeck/settings.toml)
//!
//! Handles loading and providing defaults for the settings that apply to
//! every session: display locale, debug diagnostics and video preferences.
//! Settings are stored in TOML format in the platform-specific config directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Settings file name inside the config directory.
pub const SETTINGS_FILE: &str = "settings.toml";

/// User settings loaded before the ROM is fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Locale for user-visible messages (default: "en")
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Show raw error details instead of localized messages (default: false)
    #[serde(default)]
    pub debug: bool,
    /// Video settings
    #[serde(default)]
    pub video: VideoSettings,
}

/// Video preferences forwarded to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSettings {
    /// Whether to enable vertical sync (default: true)
    #[serde(default = "default_true")]
    pub vsync: bool,
    /// Whether to smooth the framebuffer when scaling (default: false)
    #[serde(default)]
    pub bilinear_filter: bool,
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            debug: false,
            video: VideoSettings::default(),
        }
    }
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            vsync: default_true(),
            bilinear_filter: false,
        }
    }
}

/// Error loading user settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Source of user settings for a session.
pub trait SettingsStore: Send + Sync {
    /// Load the current settings.
    fn load(&self) -> Result<UserSettings, SettingsError>;
}

/// Fixed settings, mostly useful for embedding and tests.
impl SettingsStore for UserSettings {
    fn load(&self) -> Result<UserSettings, SettingsError> {
        Ok(self.clone())
    }
}

/// Settings read from a TOML file.
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: Option<PathBuf>,
}

impl TomlSettingsStore {
    /// Read settings from an explicit file.
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Read `settings.toml` from the platform config directory.
    ///
    /// When the directory cannot be determined, defaults are used.
    pub fn platform() -> Self {
        Self {
            path: config_dir().map(|dir| dir.join(SETTINGS_FILE)),
        }
    }

    /// Path the store reads from, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

impl SettingsStore for TomlSettingsStore {
    /// Missing files yield defaults; malformed files are logged and yield
    /// defaults; any other I/O failure is an error.
    fn load(&self) -> Result<UserSettings, SettingsError> {
        let Some(path) = &self.path else {
            return Ok(UserSettings::default());
        };

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings at {}, using defaults", path.display());
                return Ok(UserSettings::default());
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.clone(),
                    source,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                Ok(UserSettings::default())
            }
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\romdeck\config`
/// On macOS: `~/Library/Application Support/io.romdeck.romdeck`
/// On Linux: `~/.config/romdeck`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.romdeck", "", "romdeck")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform-specific data directory where save data is stored.
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.romdeck", "", "romdeck")
        .map(|dirs| dirs.data_dir().to_path_buf())
}
