//! Console types supported by the launch pipeline.
//!
//! The handheld family is served by a single emulation engine, so every
//! console type shares one engine but differs in the options it honors and
//! the tag it is submitted with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Console variant a launch configuration targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ConsoleType {
    /// Game Boy Advance
    Gba,
    /// Plain Game Boy (DMG). The only variant whose hardware type is configurable.
    Gb,
    /// Game Boy Color
    Gbc,
}

/// Error returned when a console identifier is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown console type '{0}'")]
pub struct UnknownConsoleType(pub String);

impl ConsoleType {
    /// Canonical identifier, as used in launch configurations and save ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleType::Gba => "vba-m-gba",
            ConsoleType::Gb => "vba-m-gb",
            ConsoleType::Gbc => "vba-m-gbc",
        }
    }

    /// Short name used for directory layout and display.
    pub fn short_name(&self) -> &'static str {
        match self {
            ConsoleType::Gba => "gba",
            ConsoleType::Gb => "gb",
            ConsoleType::Gbc => "gbc",
        }
    }

    /// Whether this is the Game Boy Advance variant.
    pub fn is_gba(&self) -> bool {
        matches!(self, ConsoleType::Gba)
    }

    /// Whether console-specific hardware type selection is honored.
    ///
    /// Only the plain Game Boy lets the launch configuration pick the
    /// emulated hardware; the enhanced variants always run on their own.
    pub fn honors_hardware_type(&self) -> bool {
        matches!(self, ConsoleType::Gb)
    }

    /// All console types, in registry order.
    pub fn all() -> &'static [ConsoleType] {
        &[ConsoleType::Gba, ConsoleType::Gb, ConsoleType::Gbc]
    }
}

impl FromStr for ConsoleType {
    type Err = UnknownConsoleType;

    /// Parses both canonical (`vba-m-gba`) and short (`gba`) identifiers,
    /// ignoring ASCII case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ConsoleType::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == lower || c.short_name() == lower)
            .ok_or_else(|| UnknownConsoleType(s.to_string()))
    }
}

impl TryFrom<String> for ConsoleType {
    type Error = UnknownConsoleType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ConsoleType> for String {
    fn from(value: ConsoleType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ConsoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
