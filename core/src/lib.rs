//! romdeck Core - launch pipeline for the handheld emulation engine
//!
//! This crate takes a session from a loosely typed launch configuration to a
//! running engine and exposes the session's save data to the host.
//!
//! # Architecture
//!
//! - [`config`] - Launch config sources, normalization and user settings
//! - [`archive`] - Picks the ROM out of a downloaded archive
//! - [`Bootstrap`] - Sequential launch pipeline and its state machine
//! - [`Engine`] / [`RomFetcher`] - Seams to the native engine and the network
//! - [`SaveBridge`] - Export and flush operations published on ready
//! - [`DirSaveManager`] - Directory-backed save storage

pub mod archive;
pub mod bootstrap;
pub mod config;
pub mod engine;
pub mod fetch;
#[cfg(test)]
mod integration;
pub mod registry;
pub mod save;
pub mod save_bridge;
pub mod save_store;
pub mod session;
#[cfg(test)]
pub mod test_utils;
pub mod text;

// Re-export pipeline types
pub use bootstrap::{
    Bootstrap, PipelineError, SessionFailure, SessionState, StateMachine, TransitionError,
};
pub use session::EmulatorSession;

// Re-export configuration types
pub use config::{
    ConfigError, ConfigSource, FallbackSource, FeedItemSource, FieldValidationError, LaunchConfig,
    Orientation, PropsSource, QuerySource, SessionOptions, SettingsError, SettingsStore,
    TomlSettingsStore, UserSettings, normalize,
};

// Re-export archive resolution
pub use archive::{ResolutionError, ResolvedRom, resolve};

// Re-export engine seams
pub use engine::{Engine, EngineError, RomSubmission};
pub use fetch::{FetchError, RomFetcher};

// Re-export save types
pub use registry::{BridgeRegistration, BridgeRegistry};
pub use save::{MAX_SAVE_SIZE, PersistentFs, SaveBlob, SaveError, SaveFile, SaveManager};
pub use save_bridge::SaveBridge;
pub use save_store::DirSaveManager;

pub use romdeck_shared::{ConsoleType, ContentFingerprint, ExtensionPolicy};
