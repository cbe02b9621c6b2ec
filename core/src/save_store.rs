//! Directory-backed save storage.
//!
//! Save files live under `<root>/<console>/<save id>/<file>`. Engine writes are
//! buffered in memory and only reach the disk on [`SaveManager::flush`], which
//! writes each file to a `.tmp` sibling and renames it into place.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use romdeck_shared::{
    ConsoleType, ContentFingerprint, SAVE_TMP_SUFFIX, is_valid_save_file_name, parse_save_id,
};
use zip::write::SimpleFileOptions;

use crate::config::data_dir;
use crate::save::{MAX_SAVE_SIZE, PersistentFs, SaveBlob, SaveError, SaveFile, SaveManager};

/// Subdirectory of the data directory holding save data.
pub const SAVES_DIR: &str = "saves";

/// Unflushed writes, keyed by save id then file name.
type Pending = BTreeMap<String, BTreeMap<String, Vec<u8>>>;

/// Save manager and persistent filesystem backed by a directory tree.
pub struct DirSaveManager {
    root: PathBuf,
    pending: Mutex<Pending>,
}

impl DirSaveManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pending: Mutex::new(BTreeMap::new()),
        }
    }

    /// Store saves under the platform data directory.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn platform() -> Option<Self> {
        data_dir().map(|dir| Self::new(dir.join(SAVES_DIR)))
    }

    /// Root of the save tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Buffer a save file write. Nothing touches the disk until `flush`.
    pub fn write(&self, save_id: &str, name: &str, bytes: Vec<u8>) -> Result<(), SaveError> {
        validate_id(save_id)?;
        validate_file_name(name)?;
        if bytes.len() > MAX_SAVE_SIZE {
            return Err(SaveError::TooLarge {
                name: name.to_string(),
                size: bytes.len(),
            });
        }

        self.lock_pending()
            .entry(save_id.to_string())
            .or_default()
            .insert(name.to_string(), bytes);
        Ok(())
    }

    /// Whether any write is waiting for a flush.
    pub fn has_pending(&self) -> bool {
        !self.lock_pending().is_empty()
    }

    /// Directory holding the files of `save_id`.
    pub fn save_dir(&self, save_id: &str) -> Result<PathBuf, SaveError> {
        // The console half of the id picks the subdirectory.
        let console = validate_id(save_id)?;
        Ok(self.root.join(console.short_name()).join(save_id))
    }

    fn lock_pending(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(|e| {
            tracing::warn!("Save buffer mutex poisoned; continuing");
            e.into_inner()
        })
    }

    fn write_files(&self, save_id: &str, files: &BTreeMap<String, Vec<u8>>) -> Result<(), SaveError> {
        let dir = self.save_dir(save_id)?;
        fs::create_dir_all(&dir)?;
        for (name, bytes) in files {
            write_atomic(&dir.join(name), bytes)?;
        }
        Ok(())
    }

    fn read_dir_files(dir: &Path) -> Result<BTreeMap<String, Vec<u8>>, SaveError> {
        let mut files = BTreeMap::new();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            // Leftovers of an interrupted flush.
            if name.ends_with(SAVE_TMP_SUFFIX) {
                continue;
            }
            files.insert(name, fs::read(entry.path())?);
        }
        Ok(files)
    }
}

impl SaveManager for DirSaveManager {
    /// `"<console>-<fingerprint>"`; the title is not part of the key so a
    /// renamed game keeps its saves.
    fn save_id(
        &self,
        _title: Option<&str>,
        console: ConsoleType,
        fingerprint: &ContentFingerprint,
    ) -> Result<String, SaveError> {
        Ok(romdeck_shared::save_id(console, fingerprint))
    }

    fn load_local(&self, save_id: &str) -> Result<Vec<SaveFile>, SaveError> {
        let mut files = Self::read_dir_files(&self.save_dir(save_id)?)?;
        if let Some(pending) = self.lock_pending().get(save_id) {
            for (name, bytes) in pending {
                files.insert(name.clone(), bytes.clone());
            }
        }

        Ok(files
            .into_iter()
            .map(|(name, bytes)| SaveFile { name, bytes })
            .collect())
    }

    fn create_archive(&self, files: &[SaveFile]) -> Result<SaveBlob, SaveError> {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for file in files {
            validate_file_name(&file.name)?;
            writer.start_file(file.name.as_str(), options)?;
            writer.write_all(&file.bytes)?;
        }
        let bytes = writer.finish()?.into_inner();

        Ok(SaveBlob {
            bytes,
            file_count: files.len(),
            created_at: chrono::Utc::now(),
        })
    }

    fn flush(&self) -> Result<(), SaveError> {
        let mut pending = self.lock_pending();
        if pending.is_empty() {
            return Ok(());
        }

        // Drain one save id at a time so a failure keeps the rest buffered.
        while let Some((save_id, files)) = pending.pop_first() {
            if let Err(e) = self.write_files(&save_id, &files) {
                pending.insert(save_id, files);
                return Err(e);
            }
            tracing::debug!("Flushed {} save file(s) for {}", files.len(), save_id);
        }
        Ok(())
    }
}

impl PersistentFs for DirSaveManager {
    fn sync(&self) -> Result<(), SaveError> {
        if !self.root.exists() {
            return Ok(());
        }
        sync_dir(&self.root)?;
        Ok(())
    }
}

fn validate_id(save_id: &str) -> Result<ConsoleType, SaveError> {
    parse_save_id(save_id)
        .map(|(console, _)| console)
        .ok_or_else(|| SaveError::InvalidId(save_id.to_string()))
}

fn validate_file_name(name: &str) -> Result<(), SaveError> {
    if is_valid_save_file_name(name) {
        Ok(())
    } else {
        Err(SaveError::InvalidFileName(name.to_string()))
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp_path = match path.file_name() {
        Some(name) => {
            let mut tmp_name = OsString::from(name);
            tmp_name.push(SAVE_TMP_SUFFIX);
            path.with_file_name(tmp_name)
        }
        None => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "save path has no file name",
            ));
        }
    };

    {
        let mut f = fs::File::create(&tmp_path)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }

    #[cfg(windows)]
    {
        if path.exists() {
            // Windows rename fails if destination exists.
            fs::remove_file(path)?;
        }
    }

    fs::rename(&tmp_path, path)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    // Directories cannot be opened for syncing here; renames are already durable.
    Ok(())
}
