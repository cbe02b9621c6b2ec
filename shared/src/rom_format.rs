//! ROM format specifications for the handheld family.
//!
//! This module defines the `RomFormat` struct which serves as the single source
//! of truth for the file extensions each console accepts, and the
//! `ExtensionPolicy` the archive resolver uses to pick a payload out of a
//! multi-file archive.
//!
//! # Example
//!
//! ```
//! use romdeck_shared::{ExtensionPolicy, HANDHELD_FAMILY};
//!
//! let policy = ExtensionPolicy::for_family(HANDHELD_FAMILY);
//! assert_eq!(policy.unique(), &["gba", "agb", "gb", "dmg", "gbc", "cgb"]);
//! assert!(policy.matches_any("zelda.gbc"));
//! ```

use crate::console::ConsoleType;

/// ROM format specification for one console.
#[derive(Debug, Clone, Copy)]
pub struct RomFormat {
    /// Console this format belongs to
    pub console: ConsoleType,

    /// Extensions (without dot) that identify this console unambiguously
    pub unique_extensions: &'static [&'static str],

    /// Extensions (without dot) shared with other consoles or generic dumps
    pub shared_extensions: &'static [&'static str],
}

impl RomFormat {
    /// Create a new ROM format specification.
    pub const fn new(
        console: ConsoleType,
        unique_extensions: &'static [&'static str],
        shared_extensions: &'static [&'static str],
    ) -> Self {
        Self {
            console,
            unique_extensions,
            shared_extensions,
        }
    }

    /// Unique extensions followed by shared ones.
    pub fn all_extensions(&self) -> impl Iterator<Item = &'static str> {
        self.unique_extensions
            .iter()
            .chain(self.shared_extensions.iter())
            .copied()
    }
}

/// Game Boy Advance ROM format (`.gba`, `.agb`; multiboot `.mb` and raw `.bin` shared).
pub const GBA_ROM_FORMAT: RomFormat =
    RomFormat::new(ConsoleType::Gba, &["gba", "agb"], &["mb", "bin"]);

/// Game Boy ROM format (`.gb`, `.dmg`; Super Game Boy enhanced `.sgb` shared).
pub const GB_ROM_FORMAT: RomFormat = RomFormat::new(ConsoleType::Gb, &["gb", "dmg"], &["sgb", "bin"]);

/// Game Boy Color ROM format (`.gbc`, `.cgb`).
pub const GBC_ROM_FORMAT: RomFormat = RomFormat::new(ConsoleType::Gbc, &["gbc", "cgb"], &["bin"]);

/// Every format served by the handheld engine, in registry order.
///
/// The engine runs all three consoles, so archives are resolved against the
/// whole family regardless of the launch type.
pub const HANDHELD_FAMILY: &[RomFormat] = &[GBA_ROM_FORMAT, GB_ROM_FORMAT, GBC_ROM_FORMAT];

/// Look up the ROM format of a console.
pub fn format_for(console: ConsoleType) -> &'static RomFormat {
    HANDHELD_FAMILY
        .iter()
        .find(|f| f.console == console)
        .unwrap_or(&GBA_ROM_FORMAT)
}

/// Extension policy handed to the archive resolver.
///
/// `unique` is an ordered list of extensions that are each checked for a
/// single distinct match. `non_unique` is the deduplicated list of every
/// acceptable extension, used when the unique check is inconclusive.
/// Extensions are stored lowercase, without the leading dot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtensionPolicy {
    unique: Vec<String>,
    non_unique: Vec<String>,
}

impl ExtensionPolicy {
    /// Build a policy from explicit extension lists.
    ///
    /// Leading dots and case are normalized and duplicates in the
    /// non-unique list are dropped, keeping first occurrence order.
    pub fn new<U, N>(unique: U, non_unique: N) -> Self
    where
        U: IntoIterator,
        U::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        let mut policy = Self::default();
        for ext in unique {
            let ext = normalize_extension(ext.as_ref());
            if !ext.is_empty() {
                policy.unique.push(ext);
            }
        }
        for ext in non_unique {
            policy.push_non_unique(normalize_extension(ext.as_ref()));
        }
        policy
    }

    /// Build the policy for a family of formats.
    ///
    /// The unique list is the concatenation of every format's unique
    /// extensions. The non-unique list is the deduplicated union of every
    /// extension the family accepts.
    pub fn for_family(formats: &[RomFormat]) -> Self {
        let unique: Vec<&str> = formats
            .iter()
            .flat_map(|f| f.unique_extensions.iter().copied())
            .collect();
        let non_unique: Vec<&str> = formats.iter().flat_map(|f| f.all_extensions()).collect();
        Self::new(unique, non_unique)
    }

    fn push_non_unique(&mut self, ext: String) {
        if !ext.is_empty() && !self.non_unique.contains(&ext) {
            self.non_unique.push(ext);
        }
    }

    /// Ordered unique-preferred extensions.
    pub fn unique(&self) -> &[String] {
        &self.unique
    }

    /// Deduplicated non-unique extensions.
    pub fn non_unique(&self) -> &[String] {
        &self.non_unique
    }

    /// Returns the unique-preferred extension `name` carries, if any.
    pub fn unique_match(&self, name: &str) -> Option<&str> {
        let ext = extension_of(name)?;
        self.unique.iter().find(|u| **u == ext).map(String::as_str)
    }

    /// Whether `name` carries an extension from either list.
    pub fn matches_any(&self, name: &str) -> bool {
        match extension_of(name) {
            Some(ext) => self.unique.contains(&ext) || self.non_unique.contains(&ext),
            None => false,
        }
    }
}

/// Lowercase extension of the last path component of `name`, without the dot.
pub fn extension_of(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_policy_orders_unique_extensions_by_console() {
        let policy = ExtensionPolicy::for_family(HANDHELD_FAMILY);
        assert_eq!(policy.unique(), &["gba", "agb", "gb", "dmg", "gbc", "cgb"]);
    }

    #[test]
    fn family_policy_deduplicates_shared_extensions() {
        let policy = ExtensionPolicy::for_family(HANDHELD_FAMILY);
        let bins = policy.non_unique().iter().filter(|e| *e == "bin").count();
        assert_eq!(bins, 1);
        assert!(policy.non_unique().contains(&"sgb".to_string()));
    }

    #[test]
    fn new_normalizes_dots_and_case() {
        let policy = ExtensionPolicy::new([".GBA"], ["gba", ".Gb", "gb", "gbc"]);
        assert_eq!(policy.unique(), &["gba"]);
        assert_eq!(policy.non_unique(), &["gba", "gb", "gbc"]);
    }

    #[test]
    fn unique_match_checks_last_component_only() {
        let policy = ExtensionPolicy::new(["gba"], ["gba", "gb"]);
        assert_eq!(policy.unique_match("roms/Game.GBA"), Some("gba"));
        assert_eq!(policy.unique_match("game.gba/readme"), None);
        assert_eq!(policy.unique_match("game.gb"), None);
        assert!(policy.matches_any("game.gb"));
        assert!(!policy.matches_any("readme.txt"));
    }

    #[test]
    fn extension_of_ignores_dotfiles_and_bare_names() {
        assert_eq!(extension_of("game.gba"), Some("gba".to_string()));
        assert_eq!(extension_of(".gba"), None);
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of("trailing."), None);
    }

    #[test]
    fn format_lookup_by_console() {
        assert_eq!(format_for(ConsoleType::Gbc).unique_extensions, &["gbc", "cgb"]);
        assert_eq!(format_for(ConsoleType::Gb).console, ConsoleType::Gb);
    }
}
