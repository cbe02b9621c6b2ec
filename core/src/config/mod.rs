//! Launch configuration normalization.
//!
//! Turns a loosely typed [`LaunchConfig`] into strongly typed
//! [`SessionOptions`]. Only the ROM locator and console type are required;
//! every other field is validated on its own and, when invalid, logged and
//! replaced by its default so the launch can continue.

mod settings;
mod source;
pub mod value;

use std::fmt;

use romdeck_shared::{ConsoleType, UnknownConsoleType};
use serde_json::Value;

pub use settings::{
    SETTINGS_FILE, SettingsError, SettingsStore, TomlSettingsStore, UserSettings, VideoSettings,
    config_dir, data_dir,
};
pub use source::{
    ConfigSource, FallbackSource, FeedItemSource, LaunchConfig, PropsSource, QuerySource,
};

/// Sentinel for "let the engine auto-detect" on flash size and save type.
pub const AUTO_DETECT: i32 = -1;

/// Hardware type submitted for every console except the plain Game Boy.
pub const ENHANCED_HARDWARE_TYPE: i32 = 1;

/// Fatal configuration problems. The pipeline never starts when one occurs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("A ROM file was not specified.")]
    MissingRom,

    #[error("The application type was not specified.")]
    MissingConsoleType,

    #[error(transparent)]
    UnknownConsoleType(#[from] UnknownConsoleType),

    #[error("launch configuration is malformed: {0}")]
    Malformed(String),
}

/// Why an optional field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIssue {
    /// The value could not be read as a number.
    NotANumber,
    /// A rotation that is not a multiple of 90 degrees.
    NotRightAngle,
    /// A number outside the range the engine accepts.
    OutOfRange,
    /// A value of the wrong JSON kind (e.g. a numeric title).
    WrongKind,
}

/// A recovered validation failure on an optional field.
///
/// The field fell back to its default; the launch continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} {issue}: {value}")]
pub struct FieldValidationError {
    pub field: &'static str,
    pub value: String,
    pub issue: FieldIssue,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldIssue::NotANumber => "value is not a number",
            FieldIssue::NotRightAngle => "value is not a 90 degree value",
            FieldIssue::OutOfRange => "value is out of range",
            FieldIssue::WrongKind => "value has the wrong type",
        })
    }
}

/// Screen orientation derived from the rotation field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Orientation {
    quarter_turns: u8,
}

impl Orientation {
    /// Orientation for a rotation of `degrees`, if it is a multiple of 90.
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        Some(Self {
            quarter_turns: (degrees / 90).rem_euclid(4) as u8,
        })
    }

    /// Number of clockwise quarter turns, `0..=3`.
    pub fn quarter_turns(&self) -> u8 {
        self.quarter_turns
    }

    /// Rotation in degrees, `0`, `90`, `180` or `270`.
    pub fn degrees(&self) -> u16 {
        self.quarter_turns as u16 * 90
    }

    /// Whether the screen is turned on its side (affects presentation only).
    pub fn is_sideways(&self) -> bool {
        self.quarter_turns % 2 == 1
    }
}

/// Normalized, immutable options for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// ROM source locator
    pub rom: String,
    /// Console variant
    pub console: ConsoleType,
    /// Display title, when the launch named one
    pub title: Option<String>,
    /// Screen orientation
    pub orientation: Orientation,
    /// Flash size selector, [`AUTO_DETECT`] when unspecified
    pub flash_size: i32,
    /// Save type selector, [`AUTO_DETECT`] when unspecified
    pub save_type: i32,
    /// Cartridge has a real-time clock
    pub rtc: bool,
    /// Enable memory mirroring
    pub mirroring: bool,
    /// Skip the engine's automatic cartridge database lookup
    pub disable_lookup: bool,
    /// Effective hardware type (only configurable for the plain Game Boy)
    pub hardware_type: i32,
    /// Game Boy color mode
    pub colors: i32,
    /// Game Boy palette id
    pub palette: i32,
    /// Game Boy border flag
    pub border: i32,
}

/// Options plus the field failures that were recovered while deriving them.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub options: SessionOptions,
    pub warnings: Vec<FieldValidationError>,
}

/// Normalize a launch configuration into session options.
///
/// Fails only when the ROM locator or console type is missing or the console
/// type is unknown. Recovered field failures are logged.
pub fn normalize(raw: &LaunchConfig) -> Result<SessionOptions, ConfigError> {
    normalize_reporting(raw).map(|n| n.options)
}

/// Like [`normalize`], also returning every recovered field failure.
pub fn normalize_reporting(raw: &LaunchConfig) -> Result<Normalized, ConfigError> {
    let mut fields = FieldReader {
        raw,
        warnings: Vec::new(),
    };

    let rom = match raw.get("rom") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => return Err(ConfigError::MissingRom),
    };

    let console = match raw.get("type") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.parse::<ConsoleType>()?,
        _ => return Err(ConfigError::MissingConsoleType),
    };

    let title = fields.title();
    let orientation = fields.orientation();
    let flash_size = fields.selector("flashSize");
    let save_type = fields.selector("saveType");
    let rtc = value::is_true(raw.get("rtc"));
    let mirroring = value::is_true(raw.get("mirroring"));
    let disable_lookup = value::is_true(raw.get("disableLookup"));

    let gb_hardware_type = fields.small_int("hwType");
    let hardware_type = if console.honors_hardware_type() {
        gb_hardware_type
    } else {
        ENHANCED_HARDWARE_TYPE
    };
    let colors = fields.small_int("colors");
    let palette = fields.small_int("palette");
    let border = fields.small_int("border");

    let options = SessionOptions {
        rom,
        console,
        title,
        orientation,
        flash_size,
        save_type,
        rtc,
        mirroring,
        disable_lookup,
        hardware_type,
        colors,
        palette,
        border,
    };
    tracing::debug!(?options, "Normalized launch config");

    Ok(Normalized {
        options,
        warnings: fields.warnings,
    })
}

struct FieldReader<'a> {
    raw: &'a LaunchConfig,
    warnings: Vec<FieldValidationError>,
}

impl FieldReader<'_> {
    fn reject(&mut self, field: &'static str, raw: &Value, issue: FieldIssue) {
        let err = FieldValidationError {
            field,
            value: value::describe(raw),
            issue,
        };
        tracing::warn!("{}", err);
        self.warnings.push(err);
    }

    fn title(&mut self) -> Option<String> {
        match self.raw.get("title")? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::String(_) | Value::Null => None,
            other => {
                self.reject("title", other, FieldIssue::WrongKind);
                None
            }
        }
    }

    fn orientation(&mut self) -> Orientation {
        let Some(raw) = self.raw.get("rotation") else {
            return Orientation::default();
        };
        if value::is_blank(raw) {
            return Orientation::default();
        }
        let Some(degrees) = value::parse_int(raw) else {
            self.reject("rotation", raw, FieldIssue::NotANumber);
            return Orientation::default();
        };
        match Orientation::from_degrees(degrees) {
            Some(orientation) => orientation,
            None => {
                self.reject("rotation", raw, FieldIssue::NotRightAngle);
                Orientation::default()
            }
        }
    }

    /// Flash size / save type: blank means auto-detect, garbage is logged.
    fn selector(&mut self, field: &'static str) -> i32 {
        let Some(raw) = self.raw.get(field) else {
            return AUTO_DETECT;
        };
        if value::is_blank(raw) {
            return AUTO_DETECT;
        }
        match value::parse_int(raw) {
            Some(n) => match i32::try_from(n) {
                Ok(n) => n,
                Err(_) => {
                    self.reject(field, raw, FieldIssue::OutOfRange);
                    AUTO_DETECT
                }
            },
            None => {
                self.reject(field, raw, FieldIssue::NotANumber);
                AUTO_DETECT
            }
        }
    }

    /// Console-specific small integers, default 0.
    fn small_int(&mut self, field: &'static str) -> i32 {
        let Some(raw) = self.raw.get(field) else {
            return 0;
        };
        match value::parse_int(raw).map(i32::try_from) {
            Some(Ok(n)) => n,
            Some(Err(_)) => {
                self.reject(field, raw, FieldIssue::OutOfRange);
                0
            }
            None => {
                self.reject(field, raw, FieldIssue::NotANumber);
                0
            }
        }
    }
}
