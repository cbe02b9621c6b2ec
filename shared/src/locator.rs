//! File names derived from ROM source locators.
//!
//! A locator is whatever the launch configuration points at: an `http(s)`
//! URL, a `file://` URL or a plain filesystem path. When an archive exposes no
//! entry name, the display name of the ROM is taken from the locator.

use percent_encoding::percent_decode_str;
use url::Url;

/// Returns the file name a locator points at.
///
/// Query string and fragment are dropped, the last non-empty path segment is
/// taken and percent-escapes are decoded. Returns `None` when the locator has
/// no usable segment (e.g. `https://host/`).
pub fn file_name_from_locator(locator: &str) -> Option<String> {
    let locator = locator.trim();
    let name = match Url::parse(locator) {
        Ok(url) if !url.cannot_be_a_base() && url.scheme().len() > 1 => {
            let segment = url.path_segments()?.rev().find(|s| !s.is_empty())?;
            percent_decode_str(segment).decode_utf8_lossy().into_owned()
        }
        // Plain paths, including Windows drive paths (`C:` parses as a scheme).
        _ => {
            let path = locator.split(['?', '#']).next().unwrap_or(locator);
            path.rsplit(['/', '\\']).find(|s| !s.is_empty())?.to_string()
        }
    };
    (!name.trim().is_empty()).then_some(name)
}

/// File name without its final extension (`"Game (USA).zip"` -> `"Game (USA)"`).
pub fn file_stem(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    }
}
