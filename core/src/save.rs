//! Save manager interfaces
//!
//! The engine owns the save data of a session. It exposes it through a
//! [`SaveManager`] (identity lookup, local files, packaging, flushing) and,
//! optionally, a [`PersistentFs`] that makes flushed data durable.

use chrono::{DateTime, Utc};
use romdeck_shared::{ConsoleType, ContentFingerprint};

/// Largest single save file accepted (flash saves are 128 KiB).
pub const MAX_SAVE_SIZE: usize = 1024 * 1024;

/// Error from a save operation. Always recovered: logged, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("invalid save id '{0}'")]
    InvalidId(String),

    #[error("invalid save file name '{0}'")]
    InvalidFileName(String),

    #[error("save file '{name}' exceeds {MAX_SAVE_SIZE} bytes ({size} bytes)")]
    TooLarge { name: String, size: usize },

    #[error("save I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to package save data: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("save manager unavailable: {0}")]
    Unavailable(String),
}

/// One persisted save file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFile {
    /// File name, without directories
    pub name: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl SaveFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Portable package of a session's save data.
///
/// Created on demand and handed to the host; never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveBlob {
    /// Archive bytes
    pub bytes: Vec<u8>,
    /// Number of files packaged
    pub file_count: usize,
    /// When the blob was packaged
    pub created_at: DateTime<Utc>,
}

/// Save manager exposed by an engine.
pub trait SaveManager: Send + Sync {
    /// Identity key for a game's save data.
    fn save_id(
        &self,
        title: Option<&str>,
        console: ConsoleType,
        fingerprint: &ContentFingerprint,
    ) -> Result<String, SaveError>;

    /// Files currently stored under `save_id`, including unflushed writes.
    fn load_local(&self, save_id: &str) -> Result<Vec<SaveFile>, SaveError>;

    /// Package files into a portable blob.
    fn create_archive(&self, files: &[SaveFile]) -> Result<SaveBlob, SaveError>;

    /// Write in-memory save data to the persistent layer.
    fn flush(&self) -> Result<(), SaveError>;
}

/// Filesystem-like persistence layer behind the save manager.
pub trait PersistentFs: Send + Sync {
    /// Make previously flushed data durable.
    fn sync(&self) -> Result<(), SaveError>;
}
