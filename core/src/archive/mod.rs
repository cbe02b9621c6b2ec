//! ROM archive resolution
//!
//! ROMs are usually distributed as ZIP archives that may hold the game next
//! to readmes, covers or alternate dumps. This module opens the downloaded
//! payload, picks the single most plausible ROM entry and returns its bytes.
//! Payloads that are not archives pass through untouched.

mod scorer;

use std::io::{Cursor, Read};

use romdeck_shared::{ExtensionPolicy, file_name_from_locator};

pub use scorer::{NameScorer, canonical_title, levenshtein_distance};

/// Largest ROM payload accepted (GBA cartridges top out at 32 MiB).
pub const MAX_ROM_SIZE: usize = 64 * 1024 * 1024;

/// Display name used when neither the archive nor the locator names the ROM.
const FALLBACK_ROM_NAME: &str = "rom";

/// Local file header, end of central directory, and spanned archive signatures.
const ZIP_SIGNATURES: [&[u8; 4]; 3] = [b"PK\x03\x04", b"PK\x05\x06", b"PK\x07\x08"];

/// Error resolving a ROM out of a downloaded payload. Fatal to the session.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("the downloaded ROM is empty")]
    EmptyPayload,

    #[error("archive contains no usable files")]
    NoEntries,

    #[error("archive contains no ROM file (found: {})", .0.join(", "))]
    NoCandidate(Vec<String>),

    #[error("ROM is too large ({size} bytes, limit {MAX_ROM_SIZE})")]
    TooLarge { size: u64 },

    #[error("failed to decompress archive: {0}")]
    Decompress(#[from] zip::result::ZipError),

    #[error("failed to read archive entry '{name}': {source}")]
    ReadEntry {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// The ROM chosen out of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRom {
    /// Uncompressed ROM bytes
    pub bytes: Vec<u8>,
    /// Entry file name, or a name derived from the source locator
    pub name: String,
}

/// One file inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Position in the archive's central directory
    pub index: usize,
    /// Full entry path as stored in the archive
    pub name: String,
    /// Uncompressed size in bytes
    pub size: u64,
}

/// A downloaded payload, opened for resolution.
pub enum Archive<'a> {
    /// Not an archive: the payload is the ROM itself.
    Raw(&'a [u8]),
    /// A ZIP archive and its usable entries, in archive order.
    Zip {
        archive: zip::ZipArchive<Cursor<&'a [u8]>>,
        entries: Vec<ArchiveEntry>,
    },
}

impl<'a> Archive<'a> {
    /// Open a payload, listing usable entries when it is a ZIP archive.
    ///
    /// Directories, `__MACOSX` resource forks and hidden dot-files are not
    /// usable entries.
    pub fn open(bytes: &'a [u8]) -> Result<Self, ResolutionError> {
        if bytes.is_empty() {
            return Err(ResolutionError::EmptyPayload);
        }
        if !is_zip(bytes) {
            return Ok(Archive::Raw(bytes));
        }

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::new();
        for index in 0..archive.len() {
            let file = archive.by_index_raw(index)?;
            let name = file.name().to_string();
            if file.is_dir() || !is_usable_entry(&name) {
                continue;
            }
            entries.push(ArchiveEntry {
                index,
                name,
                size: file.size(),
            });
        }
        tracing::debug!("Archive holds {} usable entries", entries.len());

        Ok(Archive::Zip { archive, entries })
    }

    /// Usable entries; empty for raw payloads.
    pub fn entries(&self) -> &[ArchiveEntry] {
        match self {
            Archive::Raw(_) => &[],
            Archive::Zip { entries, .. } => entries,
        }
    }

    fn read_entry(&mut self, entry: &ArchiveEntry) -> Result<Vec<u8>, ResolutionError> {
        let Archive::Zip { archive, .. } = self else {
            return Err(ResolutionError::NoEntries);
        };
        if entry.size > MAX_ROM_SIZE as u64 {
            return Err(ResolutionError::TooLarge { size: entry.size });
        }

        let file = archive.by_index(entry.index)?;
        let mut bytes = Vec::with_capacity(entry.size as usize);
        // The declared size can lie; cap the actual read as well.
        file.take(MAX_ROM_SIZE as u64 + 1)
            .read_to_end(&mut bytes)
            .map_err(|source| ResolutionError::ReadEntry {
                name: entry.name.clone(),
                source,
            })?;
        if bytes.len() > MAX_ROM_SIZE {
            return Err(ResolutionError::TooLarge {
                size: bytes.len() as u64,
            });
        }
        Ok(bytes)
    }
}

/// Resolve the ROM out of a downloaded payload.
///
/// `locator` is the source the payload was fetched from; it names raw
/// payloads and steers the name scorer toward the requested title.
///
/// Selection when an archive holds several entries:
/// 1. For each unique-preferred extension in order, an extension carried by
///    exactly one entry selects that entry.
/// 2. Otherwise every entry matching either extension list is scored and the
///    best score wins; ties go to the entry that comes first in the archive.
pub fn resolve(
    bytes: &[u8],
    policy: &ExtensionPolicy,
    locator: &str,
) -> Result<ResolvedRom, ResolutionError> {
    let locator_name = file_name_from_locator(locator);
    let mut archive = Archive::open(bytes)?;

    let entry = match &archive {
        Archive::Raw(payload) => {
            if payload.len() > MAX_ROM_SIZE {
                return Err(ResolutionError::TooLarge {
                    size: payload.len() as u64,
                });
            }
            let name = locator_name.unwrap_or_else(|| FALLBACK_ROM_NAME.to_string());
            tracing::debug!("Payload is not an archive, using it as '{}'", name);
            return Ok(ResolvedRom {
                bytes: payload.to_vec(),
                name,
            });
        }
        Archive::Zip { entries, .. } => {
            select_entry(entries, policy, locator_name.as_deref())?.clone()
        }
    };

    let bytes = archive.read_entry(&entry)?;
    let name = entry_file_name(&entry.name)
        .map(str::to_string)
        .or(locator_name)
        .unwrap_or_else(|| FALLBACK_ROM_NAME.to_string());
    tracing::info!("Resolved ROM '{}' ({} bytes)", name, bytes.len());

    Ok(ResolvedRom { bytes, name })
}

/// Pick the most plausible entry out of a non-empty entry list.
pub fn select_entry<'e>(
    entries: &'e [ArchiveEntry],
    policy: &ExtensionPolicy,
    requested_name: Option<&str>,
) -> Result<&'e ArchiveEntry, ResolutionError> {
    match entries {
        [] => return Err(ResolutionError::NoEntries),
        [only] => return Ok(only),
        _ => {}
    }

    for ext in policy.unique() {
        let mut matching = entries
            .iter()
            .filter(|e| policy.unique_match(&e.name) == Some(ext.as_str()));
        if let (Some(entry), None) = (matching.next(), matching.next()) {
            tracing::debug!("'{}' is the only .{} entry", entry.name, ext);
            return Ok(entry);
        }
    }

    let scorer = NameScorer::new(policy, requested_name);
    let mut best: Option<(&ArchiveEntry, i32)> = None;
    for entry in entries.iter().filter(|e| scorer.is_candidate(&e.name)) {
        let score = scorer.score(&entry.name);
        tracing::trace!("Candidate '{}' scored {}", entry.name, score);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((entry, score));
        }
    }

    best.map(|(entry, _)| entry).ok_or_else(|| {
        ResolutionError::NoCandidate(entries.iter().map(|e| e.name.clone()).collect())
    })
}

fn is_zip(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && ZIP_SIGNATURES.iter().any(|sig| &bytes[..4] == *sig)
}

fn is_usable_entry(name: &str) -> bool {
    if name.starts_with("__MACOSX/") {
        return false;
    }
    match entry_file_name(name) {
        Some(base) => !base.starts_with('.'),
        None => false,
    }
}

fn entry_file_name(name: &str) -> Option<&str> {
    name.rsplit(['/', '\\']).find(|s| !s.is_empty())
}
