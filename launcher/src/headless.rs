//! Headless engine
//!
//! Stands in for the native emulation core on machines without one: it
//! validates the cartridge header, keeps saves in a [`DirSaveManager`] and
//! acknowledges the ROM, but never emulates a frame.

use std::sync::Arc;

use romdeck_core::{
    DirSaveManager, Engine, EngineError, PersistentFs, RomSubmission, SaveManager, SessionOptions,
    UserSettings,
};
use serde::Serialize;

use crate::cartridge::CartridgeHeader;

/// File name of the state snapshot written on exit.
pub const STATE_FILE: &str = "headless.state.json";

/// What the headless engine knows about its loaded ROM.
#[derive(Debug, Clone, Serialize)]
struct StateSnapshot<'a> {
    title: &'a str,
    console: &'a str,
    file_name: &'a str,
    fingerprint: String,
}

/// ROM accepted by the engine.
#[derive(Debug, Clone)]
pub struct LoadedCartridge {
    pub header: CartridgeHeader,
    pub submission: RomSubmission,
}

pub struct HeadlessEngine {
    saves: Arc<DirSaveManager>,
    options: Option<SessionOptions>,
    settings: Option<UserSettings>,
    cartridge: Option<LoadedCartridge>,
    running: bool,
}

impl HeadlessEngine {
    pub fn new(saves: DirSaveManager) -> Self {
        Self {
            saves: Arc::new(saves),
            options: None,
            settings: None,
            cartridge: None,
            running: false,
        }
    }

    pub fn saves(&self) -> &Arc<DirSaveManager> {
        &self.saves
    }

    pub fn settings(&self) -> Option<&UserSettings> {
        self.settings.as_ref()
    }

    pub fn cartridge(&self) -> Option<&LoadedCartridge> {
        self.cartridge.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Engine for HeadlessEngine {
    async fn load_module(&mut self, options: &SessionOptions) -> Result<(), EngineError> {
        tracing::debug!("Loading headless core for {}", options.console);
        self.options = Some(options.clone());
        Ok(())
    }

    fn configure(&mut self, settings: &UserSettings) -> Result<(), EngineError> {
        tracing::debug!(
            "Video: vsync={} bilinear_filter={}",
            settings.video.vsync,
            settings.video.bilinear_filter
        );
        self.settings = Some(settings.clone());
        Ok(())
    }

    async fn submit(&mut self, rom: RomSubmission) -> Result<(), EngineError> {
        let Some(options) = &self.options else {
            return Err(EngineError::Submission("module not loaded".into()));
        };
        if options.console != rom.console {
            return Err(EngineError::Submission(format!(
                "module loaded for {}, ROM submitted for {}",
                options.console, rom.console
            )));
        }

        let header = CartridgeHeader::parse(rom.console, &rom.bytes)
            .map_err(|e| EngineError::Submission(e.to_string()))?;
        tracing::info!(
            "Cartridge '{}' accepted ({} bytes, hardware type {})",
            header.title,
            rom.bytes.len(),
            rom.hardware_type
        );
        self.cartridge = Some(LoadedCartridge {
            header,
            submission: rom,
        });
        Ok(())
    }

    fn save_manager(&self) -> Arc<dyn SaveManager> {
        self.saves.clone()
    }

    fn persistent_fs(&self) -> Option<Arc<dyn PersistentFs>> {
        Some(self.saves.clone())
    }

    fn title(&self) -> Option<String> {
        self.cartridge
            .as_ref()
            .map(|c| c.header.title.clone())
            .filter(|t| !t.is_empty())
    }

    fn start(&mut self) -> Result<(), EngineError> {
        if self.cartridge.is_none() {
            return Err(EngineError::NotReady);
        }
        self.running = true;
        Ok(())
    }

    async fn save_state(&mut self) -> Result<(), EngineError> {
        let cartridge = self.cartridge.as_ref().ok_or(EngineError::NotReady)?;
        let rom = &cartridge.submission;
        let snapshot = StateSnapshot {
            title: &cartridge.header.title,
            console: rom.console.as_str(),
            file_name: &rom.file_name,
            fingerprint: rom.fingerprint.to_hex(),
        };
        let bytes =
            serde_json::to_vec_pretty(&snapshot).map_err(|e| EngineError::State(e.to_string()))?;

        let save_id = self
            .saves
            .save_id(None, rom.console, &rom.fingerprint)
            .map_err(|e| EngineError::State(e.to_string()))?;
        self.saves
            .write(&save_id, STATE_FILE, bytes)
            .map_err(|e| EngineError::State(e.to_string()))?;
        self.running = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::fixtures::{gb_rom, gba_rom};
    use romdeck_core::{ContentFingerprint, LaunchConfig, normalize};

    fn options(console: &str) -> SessionOptions {
        normalize(
            &LaunchConfig::new()
                .with("rom", "game.zip")
                .with("type", console),
        )
        .unwrap()
    }

    fn submission(options: &SessionOptions, bytes: Vec<u8>) -> RomSubmission {
        let fingerprint = ContentFingerprint::compute(&bytes);
        RomSubmission::new(options, "game.rom".into(), bytes, fingerprint)
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn accepts_valid_cartridge_and_reports_title() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = HeadlessEngine::new(DirSaveManager::new(dir.path()));
        let options = options("gba");

        block_on(engine.load_module(&options)).unwrap();
        block_on(engine.submit(submission(&options, gba_rom("METROID", "BMXE")))).unwrap();

        assert_eq!(engine.title().as_deref(), Some("METROID"));
        engine.start().unwrap();
        assert!(engine.is_running());
    }

    #[test]
    fn rejects_payload_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = HeadlessEngine::new(DirSaveManager::new(dir.path()));
        let options = options("gb");

        block_on(engine.load_module(&options)).unwrap();
        let err = block_on(engine.submit(submission(&options, vec![0; 0x200]))).unwrap_err();
        assert!(matches!(err, EngineError::Submission(_)));
        assert!(matches!(engine.start(), Err(EngineError::NotReady)));
    }

    #[test]
    fn rejects_submission_before_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = HeadlessEngine::new(DirSaveManager::new(dir.path()));
        let options = options("gb");
        let err = block_on(engine.submit(submission(&options, gb_rom("TETRIS", 0)))).unwrap_err();
        assert!(matches!(err, EngineError::Submission(_)));
    }

    #[test]
    fn save_state_writes_snapshot_for_rom() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = HeadlessEngine::new(DirSaveManager::new(dir.path()));
        let options = options("gbc");
        let rom = gb_rom("ZELDA", 0x80);
        let fingerprint = ContentFingerprint::compute(&rom);

        block_on(engine.load_module(&options)).unwrap();
        block_on(engine.submit(submission(&options, rom))).unwrap();
        block_on(engine.save_state()).unwrap();

        let saves = engine.saves();
        let id = saves.save_id(None, options.console, &fingerprint).unwrap();
        let files = saves.load_local(&id).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, STATE_FILE);
        let snapshot: serde_json::Value = serde_json::from_slice(&files[0].bytes).unwrap();
        assert_eq!(snapshot["title"], "ZELDA");
        assert_eq!(snapshot["fingerprint"], fingerprint.to_hex());
    }
}
