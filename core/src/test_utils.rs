//! Shared test utilities for integration and unit tests

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::Arc;

use tempfile::TempDir;
use zip::write::SimpleFileOptions;

use crate::config::{LaunchConfig, SessionOptions, UserSettings};
use crate::engine::{Engine, EngineError, RomSubmission};
use crate::save::{PersistentFs, SaveManager};
use crate::save_store::DirSaveManager;

// ============================================================================
// Test Engine Implementation
// ============================================================================

/// Engine that records every call and keeps saves in a temporary directory.
pub struct TestEngine {
    pub saves: Arc<DirSaveManager>,
    pub loaded: Option<SessionOptions>,
    pub settings: Option<UserSettings>,
    pub submissions: Vec<RomSubmission>,
    pub started: bool,
    pub saved_states: usize,
    pub cartridge_title: Option<String>,
    /// Expose the save directory as a persistent filesystem
    pub with_fs: bool,
    pub fail_load: bool,
    pub fail_configure: bool,
    pub reject_rom: bool,
    _dir: TempDir,
}

impl TestEngine {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        Self {
            saves: Arc::new(DirSaveManager::new(dir.path().join("saves"))),
            loaded: None,
            settings: None,
            submissions: Vec::new(),
            started: false,
            saved_states: 0,
            cartridge_title: None,
            with_fs: true,
            fail_load: false,
            fail_configure: false,
            reject_rom: false,
            _dir: dir,
        }
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for TestEngine {
    async fn load_module(&mut self, options: &SessionOptions) -> Result<(), EngineError> {
        if self.fail_load {
            return Err(EngineError::Load("module missing".into()));
        }
        self.loaded = Some(options.clone());
        Ok(())
    }

    fn configure(&mut self, settings: &UserSettings) -> Result<(), EngineError> {
        if self.fail_configure {
            return Err(EngineError::Configure("bad video mode".into()));
        }
        self.settings = Some(settings.clone());
        Ok(())
    }

    async fn submit(&mut self, rom: RomSubmission) -> Result<(), EngineError> {
        if self.reject_rom {
            return Err(EngineError::Submission("bad cartridge header".into()));
        }
        self.submissions.push(rom);
        Ok(())
    }

    fn save_manager(&self) -> Arc<dyn SaveManager> {
        self.saves.clone()
    }

    fn persistent_fs(&self) -> Option<Arc<dyn PersistentFs>> {
        if self.with_fs {
            Some(self.saves.clone())
        } else {
            None
        }
    }

    fn title(&self) -> Option<String> {
        self.cartridge_title.clone()
    }

    fn start(&mut self) -> Result<(), EngineError> {
        if self.submissions.is_empty() {
            return Err(EngineError::NotReady);
        }
        self.started = true;
        Ok(())
    }

    async fn save_state(&mut self) -> Result<(), EngineError> {
        let rom = self.submissions.last().ok_or(EngineError::NotReady)?;
        let id = self
            .saves
            .save_id(None, rom.console, &rom.fingerprint)
            .map_err(|e| EngineError::State(e.to_string()))?;
        self.saves
            .write(&id, "state.ss0", vec![self.saved_states as u8])
            .map_err(|e| EngineError::State(e.to_string()))?;
        self.saved_states += 1;
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Build a ZIP archive in memory. Names ending in `/` become directories.
pub fn zip_archive(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in files {
        if name.ends_with('/') {
            writer
                .add_directory(*name, SimpleFileOptions::default())
                .unwrap();
            continue;
        }
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Fetcher serving a single payload.
pub fn serve(locator: &str, payload: Vec<u8>) -> HashMap<String, Vec<u8>> {
    HashMap::from([(locator.to_string(), payload)])
}

/// Minimal complete launch config.
pub fn launch_config(rom: &str, console_type: &str) -> LaunchConfig {
    LaunchConfig::new()
        .with("title", "Test Game")
        .with("rom", rom)
        .with("type", console_type)
}
