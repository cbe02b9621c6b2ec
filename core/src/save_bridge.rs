//! Host-facing save operations for a ready session.
//!
//! The bridge is what the hosting shell calls to export the current save data
//! or to force it to disk. Neither operation touches emulation state and
//! neither ever fails: problems are logged and reported as "nothing to export".

use std::sync::Arc;

use romdeck_shared::{ConsoleType, ContentFingerprint};

use crate::save::{PersistentFs, SaveBlob, SaveError, SaveManager};

/// Save operations of one session.
pub struct SaveBridge {
    save_manager: Arc<dyn SaveManager>,
    persistent_fs: Option<Arc<dyn PersistentFs>>,
    title: Option<String>,
    console: ConsoleType,
    fingerprint: ContentFingerprint,
}

impl SaveBridge {
    pub fn new(
        save_manager: Arc<dyn SaveManager>,
        persistent_fs: Option<Arc<dyn PersistentFs>>,
        title: Option<String>,
        console: ConsoleType,
        fingerprint: ContentFingerprint,
    ) -> Self {
        Self {
            save_manager,
            persistent_fs,
            title,
            console,
            fingerprint,
        }
    }

    /// Identity key of this session's save data.
    pub fn save_id(&self) -> Result<String, SaveError> {
        self.save_manager
            .save_id(self.title.as_deref(), self.console, &self.fingerprint)
    }

    /// Fingerprint of the loaded ROM.
    pub fn fingerprint(&self) -> &ContentFingerprint {
        &self.fingerprint
    }

    pub fn console(&self) -> ConsoleType {
        self.console
    }

    /// Package the session's save files.
    ///
    /// Returns `None` when there is nothing saved yet or the save manager
    /// fails; failures are logged.
    pub fn export_save_blob(&self) -> Option<SaveBlob> {
        match self.try_export() {
            Ok(Some(blob)) => {
                tracing::info!(
                    "Exported {} save file(s) ({} bytes)",
                    blob.file_count,
                    blob.bytes.len()
                );
                Some(blob)
            }
            Ok(None) => {
                tracing::debug!("No save files to export");
                None
            }
            Err(e) => {
                tracing::warn!("Failed to export save data: {}", e);
                None
            }
        }
    }

    fn try_export(&self) -> Result<Option<SaveBlob>, SaveError> {
        let save_id = self.save_id()?;
        let files = self.save_manager.load_local(&save_id)?;
        if files.is_empty() {
            return Ok(None);
        }
        self.save_manager.create_archive(&files).map(Some)
    }

    /// Flush in-memory save data, then sync the persistent layer.
    ///
    /// Errors are logged, never returned. The sync pass is skipped when the
    /// flush itself failed.
    pub fn flush(&self) {
        if let Err(e) = self.save_manager.flush() {
            tracing::warn!("Failed to flush save data: {}", e);
            return;
        }
        if let Some(fs) = &self.persistent_fs
            && let Err(e) = fs.sync()
        {
            tracing::warn!("Failed to sync save storage: {}", e);
        }
    }
}

impl std::fmt::Debug for SaveBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveBridge")
            .field("title", &self.title)
            .field("console", &self.console)
            .field("fingerprint", &self.fingerprint)
            .field("persistent_fs", &self.persistent_fs.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::save::SaveFile;
    use crate::save_store::DirSaveManager;

    /// Save manager whose operations can be made to fail.
    #[derive(Default)]
    struct FlakyManager {
        fail_load: bool,
        fail_flush: bool,
        flushes: AtomicUsize,
        requested_ids: Mutex<Vec<String>>,
    }

    impl SaveManager for FlakyManager {
        fn save_id(
            &self,
            title: Option<&str>,
            console: ConsoleType,
            _fingerprint: &ContentFingerprint,
        ) -> Result<String, SaveError> {
            Ok(format!("{}-{}", console.short_name(), title.unwrap_or("untitled")))
        }

        fn load_local(&self, save_id: &str) -> Result<Vec<SaveFile>, SaveError> {
            self.requested_ids.lock().unwrap().push(save_id.to_string());
            if self.fail_load {
                return Err(SaveError::Unavailable("storage offline".into()));
            }
            Ok(vec![SaveFile::new("game.sav", vec![7])])
        }

        fn create_archive(&self, files: &[SaveFile]) -> Result<SaveBlob, SaveError> {
            Ok(SaveBlob {
                bytes: files.iter().flat_map(|f| f.bytes.clone()).collect(),
                file_count: files.len(),
                created_at: chrono::Utc::now(),
            })
        }

        fn flush(&self) -> Result<(), SaveError> {
            self.flushes.fetch_add(1, Ordering::SeqCst);
            if self.fail_flush {
                return Err(SaveError::Unavailable("storage offline".into()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingFs {
        fail_sync: bool,
        syncs: AtomicUsize,
    }

    impl PersistentFs for CountingFs {
        fn sync(&self) -> Result<(), SaveError> {
            self.syncs.fetch_add(1, Ordering::SeqCst);
            if self.fail_sync {
                return Err(SaveError::Unavailable("disk detached".into()));
            }
            Ok(())
        }
    }

    fn bridge_with(manager: Arc<dyn SaveManager>, fs: Option<Arc<dyn PersistentFs>>) -> SaveBridge {
        SaveBridge::new(
            manager,
            fs,
            Some("Zelda".into()),
            ConsoleType::Gbc,
            ContentFingerprint::compute(b"zelda"),
        )
    }

    #[test]
    fn export_uses_session_identity() {
        let manager = Arc::new(FlakyManager::default());
        let bridge = bridge_with(manager.clone(), None);
        let blob = bridge.export_save_blob().unwrap();
        assert_eq!(blob.file_count, 1);
        assert_eq!(*manager.requested_ids.lock().unwrap(), vec!["gbc-Zelda".to_string()]);
    }

    #[test]
    fn export_with_no_files_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge_with(Arc::new(DirSaveManager::new(dir.path())), None);
        assert!(bridge.export_save_blob().is_none());
    }

    #[test]
    fn export_failure_is_none() {
        let manager = Arc::new(FlakyManager {
            fail_load: true,
            ..Default::default()
        });
        let bridge = bridge_with(manager, None);
        assert!(bridge.export_save_blob().is_none());
        assert!(bridge.export_save_blob().is_none());
    }

    #[test]
    fn flush_syncs_after_flushing() {
        let manager = Arc::new(FlakyManager::default());
        let fs = Arc::new(CountingFs::default());
        let bridge = bridge_with(manager.clone(), Some(fs.clone()));
        bridge.flush();
        bridge.flush();
        assert_eq!(manager.flushes.load(Ordering::SeqCst), 2);
        assert_eq!(fs.syncs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn flush_failure_is_swallowed_and_skips_sync() {
        let manager = Arc::new(FlakyManager {
            fail_flush: true,
            ..Default::default()
        });
        let fs = Arc::new(CountingFs::default());
        let bridge = bridge_with(manager.clone(), Some(fs.clone()));
        bridge.flush();
        assert_eq!(manager.flushes.load(Ordering::SeqCst), 1);
        assert_eq!(fs.syncs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn sync_failure_is_swallowed() {
        let manager = Arc::new(FlakyManager::default());
        let fs = Arc::new(CountingFs {
            fail_sync: true,
            ..Default::default()
        });
        let bridge = bridge_with(manager.clone(), Some(fs.clone()));
        bridge.flush();
        bridge.flush();
        assert_eq!(manager.flushes.load(Ordering::SeqCst), 2);
        assert_eq!(fs.syncs.load(Ordering::SeqCst), 2);
        assert!(bridge.export_save_blob().is_some());
    }

    #[test]
    fn export_round_trips_through_directory_manager() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Arc::new(DirSaveManager::new(dir.path()));
        let bridge = bridge_with(manager.clone(), Some(manager.clone()));
        let id = bridge.save_id().unwrap();
        manager.write(&id, "zelda.sav", vec![1, 2, 3]).unwrap();

        bridge.flush();
        assert!(!manager.has_pending());
        let blob = bridge.export_save_blob().unwrap();
        assert_eq!(blob.file_count, 1);
    }
}
