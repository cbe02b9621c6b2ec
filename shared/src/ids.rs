//! Save ids and the save file names stored under them.
//!
//! A save id is `<console>-<fingerprint>`: the console's short name followed
//! by the 64 lowercase hex digits of the ROM's content fingerprint. Both
//! halves are fixed alphabets, so a well-formed id is always a single safe
//! path component.

use crate::console::ConsoleType;
use crate::fingerprint::ContentFingerprint;

/// Suffix of in-flight writes; never a valid save file name.
pub const SAVE_TMP_SUFFIX: &str = ".tmp";

/// Longest save file name accepted.
pub const MAX_SAVE_FILE_NAME_LEN: usize = 128;

/// Save id of a ROM. The title is deliberately absent so renamed games keep
/// their saves.
pub fn save_id(console: ConsoleType, fingerprint: &ContentFingerprint) -> String {
    format!("{}-{}", console.short_name(), fingerprint.to_hex())
}

/// Split a save id back into its console and fingerprint.
///
/// Only the exact form produced by [`save_id`] is accepted: lowercase short
/// console name, a single `-`, lowercase hex digest.
pub fn parse_save_id(id: &str) -> Option<(ConsoleType, ContentFingerprint)> {
    let (prefix, digest) = id.split_once('-')?;
    let console = ConsoleType::all()
        .iter()
        .copied()
        .find(|c| c.short_name() == prefix)?;
    if !digest.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return None;
    }
    let fingerprint = digest.parse().ok()?;
    Some((console, fingerprint))
}

/// Whether `name` may be stored as a file inside a save directory.
///
/// Emulator save files are short names like `game.sav` or `Game (USA).rtc`:
/// ASCII letters, digits, space and `._-()[]`, no leading dot, no trailing
/// dot or space, and never the temporary-write suffix.
pub fn is_valid_save_file_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_SAVE_FILE_NAME_LEN {
        return false;
    }
    if name.starts_with('.') || name.ends_with('.') || name.ends_with(' ') {
        return false;
    }
    if name.ends_with(SAVE_TMP_SUFFIX) {
        return false;
    }
    name.chars().all(|c| {
        c.is_ascii_alphanumeric() || matches!(c, ' ' | '.' | '_' | '-' | '(' | ')' | '[' | ']')
    })
}
