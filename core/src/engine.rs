//! Emulation engine interface.
//!
//! The engine is an external native module. The pipeline only needs to load
//! it, hand it settings and the resolved ROM, and reach its save layer; how
//! it emulates is none of the pipeline's business.

use std::sync::Arc;

use romdeck_shared::{ConsoleType, ContentFingerprint};

use crate::config::{SessionOptions, UserSettings};
use crate::save::{PersistentFs, SaveManager};

/// Engine failure. Fatal to the session when it happens during bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to load engine module: {0}")]
    Load(String),

    #[error("engine rejected settings: {0}")]
    Configure(String),

    #[error("engine rejected the ROM: {0}")]
    Submission(String),

    #[error("engine is not running a ROM")]
    NotReady,

    #[error("failed to save engine state: {0}")]
    State(String),
}

/// Everything the engine receives for a ROM submission.
#[derive(Clone, PartialEq, Eq)]
pub struct RomSubmission {
    /// Whether the ROM targets the Game Boy Advance core
    pub is_gba: bool,
    /// Console type tag
    pub console: ConsoleType,
    /// Resolved ROM file name
    pub file_name: String,
    /// Uncompressed ROM bytes
    pub bytes: Vec<u8>,
    /// Content fingerprint of `bytes`
    pub fingerprint: ContentFingerprint,
    pub hardware_type: i32,
    pub colors: i32,
    pub palette: i32,
    pub border: i32,
}

impl RomSubmission {
    /// Build a submission from session options and a resolved ROM.
    pub fn new(
        options: &SessionOptions,
        file_name: String,
        bytes: Vec<u8>,
        fingerprint: ContentFingerprint,
    ) -> Self {
        Self {
            is_gba: options.console.is_gba(),
            console: options.console,
            file_name,
            bytes,
            fingerprint,
            hardware_type: options.hardware_type,
            colors: options.colors,
            palette: options.palette,
            border: options.border,
        }
    }
}

impl std::fmt::Debug for RomSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RomSubmission")
            .field("is_gba", &self.is_gba)
            .field("console", &self.console)
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .field("fingerprint", &self.fingerprint)
            .field("hardware_type", &self.hardware_type)
            .field("colors", &self.colors)
            .field("palette", &self.palette)
            .field("border", &self.border)
            .finish()
    }
}

/// A loadable emulation engine.
///
/// Calls arrive in bootstrap order: `load_module`, `configure`, `submit`.
/// `start` and `save_state` are only called on a session that reached ready.
#[allow(async_fn_in_trait)]
pub trait Engine {
    /// Load the native module for a session.
    async fn load_module(&mut self, options: &SessionOptions) -> Result<(), EngineError>;

    /// Apply user settings before the ROM is submitted.
    fn configure(&mut self, settings: &UserSettings) -> Result<(), EngineError>;

    /// Hand over the ROM. Returning `Ok` acknowledges the submission.
    async fn submit(&mut self, rom: RomSubmission) -> Result<(), EngineError>;

    /// The engine's save manager.
    fn save_manager(&self) -> Arc<dyn SaveManager>;

    /// Persistence layer behind the save manager, if the engine has one.
    fn persistent_fs(&self) -> Option<Arc<dyn PersistentFs>>;

    /// Title reported by the loaded cartridge, if known.
    fn title(&self) -> Option<String> {
        None
    }

    /// Begin frame pumping.
    fn start(&mut self) -> Result<(), EngineError>;

    /// Persist the emulator state before the session exits.
    async fn save_state(&mut self) -> Result<(), EngineError>;
}
