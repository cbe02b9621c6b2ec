//! Launch pipeline.
//!
//! [`Bootstrap`] takes a session from a launch configuration to a ready
//! engine in fixed stages:
//!
//! 1. Validate the launch configuration
//! 2. Load the engine module
//! 3. Load user settings and hand them to the engine
//! 4. Fetch the ROM payload
//! 5. Resolve the ROM out of the payload
//! 6. Fingerprint the ROM
//! 7. Submit the ROM to the engine
//!
//! Any stage failure ends the session in [`SessionState::Failed`]. There are
//! no retries; a new session needs a new `Bootstrap`.

mod error;
mod state;

use std::sync::Arc;

use romdeck_shared::{ContentFingerprint, ExtensionPolicy, HANDHELD_FAMILY};

use crate::archive;
use crate::config::{
    ConfigSource, FieldValidationError, SessionOptions, SettingsStore, UserSettings,
    normalize_reporting,
};
use crate::engine::{Engine, RomSubmission};
use crate::fetch::RomFetcher;
use crate::registry::BridgeRegistry;
use crate::save_bridge::SaveBridge;
use crate::session::EmulatorSession;

pub use error::{PipelineError, SessionFailure};
pub use state::{SessionState, StateMachine, TransitionError};

type TransitionCallback = Box<dyn FnMut(SessionState, SessionState)>;
type ReadyCallback = Box<dyn FnOnce(&Arc<SaveBridge>)>;
type FailedCallback = Box<dyn FnOnce(&SessionFailure)>;

/// Locale used for failures that happen before settings are loaded.
const DEFAULT_LOCALE: &str = "en";

/// What the pipeline stages produce before the session is assembled.
struct Prepared {
    options: SessionOptions,
    warnings: Vec<FieldValidationError>,
    rom_name: String,
    fingerprint: ContentFingerprint,
}

/// Single-shot launch pipeline for one session.
pub struct Bootstrap<E, F> {
    engine: E,
    fetcher: F,
    settings: Box<dyn SettingsStore>,
    registry: Option<BridgeRegistry>,
    policy: ExtensionPolicy,
    debug: bool,
    machine: StateMachine,
    on_transition: Option<TransitionCallback>,
    on_ready: Option<ReadyCallback>,
    on_failed: Option<FailedCallback>,
}

impl<E: Engine, F: RomFetcher> Bootstrap<E, F> {
    /// Create a pipeline with default settings and the handheld family's
    /// extension policy.
    pub fn new(engine: E, fetcher: F) -> Self {
        Self {
            engine,
            fetcher,
            settings: Box::new(UserSettings::default()),
            registry: None,
            policy: ExtensionPolicy::for_family(HANDHELD_FAMILY),
            debug: false,
            machine: StateMachine::new(),
            on_transition: None,
            on_ready: None,
            on_failed: None,
        }
    }

    /// Where user settings are loaded from.
    pub fn settings(mut self, store: impl SettingsStore + 'static) -> Self {
        self.settings = Box::new(store);
        self
    }

    /// Registry the save bridge is published to once the session is ready.
    pub fn registry(mut self, registry: BridgeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Extension policy for resolving archives.
    pub fn extension_policy(mut self, policy: ExtensionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Report raw error details instead of the localized message.
    ///
    /// Debug mode is also enabled by the `debug` user setting.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Called on every state transition with `(from, to)`.
    pub fn on_transition(mut self, callback: impl FnMut(SessionState, SessionState) + 'static) -> Self {
        self.on_transition = Some(Box::new(callback));
        self
    }

    /// Called once the session is ready and its bridge is published.
    pub fn on_ready(mut self, callback: impl FnOnce(&Arc<SaveBridge>) + 'static) -> Self {
        self.on_ready = Some(Box::new(callback));
        self
    }

    /// Called when the session fails.
    pub fn on_failed(mut self, callback: impl FnOnce(&SessionFailure) + 'static) -> Self {
        self.on_failed = Some(Box::new(callback));
        self
    }

    /// Run the pipeline to completion.
    pub async fn start(
        mut self,
        source: &dyn ConfigSource,
    ) -> Result<EmulatorSession<E>, SessionFailure> {
        let mut settings = None;
        let prepared = match self.run(source, &mut settings).await {
            Ok(prepared) => prepared,
            Err(error) => return Err(self.fail(error, settings.as_ref())),
        };

        let title = prepared.options.title.clone().or_else(|| self.engine.title());
        let bridge = Arc::new(SaveBridge::new(
            self.engine.save_manager(),
            self.engine.persistent_fs(),
            title,
            prepared.options.console,
            prepared.fingerprint,
        ));
        let registration = self.registry.as_ref().map(|r| r.publish(Arc::clone(&bridge)));

        tracing::info!(
            "Session ready: '{}' ({}, {})",
            prepared.rom_name,
            prepared.options.console,
            prepared.fingerprint.short()
        );
        if let Some(callback) = self.on_ready.take() {
            callback(&bridge);
        }

        Ok(EmulatorSession::new(
            self.engine,
            prepared.options,
            prepared.warnings,
            prepared.rom_name,
            prepared.fingerprint,
            bridge,
            registration,
            self.machine.history().to_vec(),
        ))
    }

    async fn run(
        &mut self,
        source: &dyn ConfigSource,
        settings_out: &mut Option<UserSettings>,
    ) -> Result<Prepared, PipelineError> {
        self.advance()?;
        tracing::debug!("Reading launch config from {}", source.describe());
        let raw = source.launch_config().unwrap_or_default();
        let normalized = normalize_reporting(&raw)?;
        let options = normalized.options;

        self.advance()?;
        self.engine.load_module(&options).await?;

        self.advance()?;
        let settings = self.settings.load()?;
        self.engine.configure(&settings)?;
        *settings_out = Some(settings);

        self.advance()?;
        let payload = self.fetcher.fetch(&options.rom).await?;
        tracing::info!("Downloaded {} ({} bytes)", options.rom, payload.len());

        self.advance()?;
        let rom = archive::resolve(&payload, &self.policy, &options.rom)?;
        drop(payload);

        self.advance()?;
        let fingerprint = ContentFingerprint::compute(&rom.bytes);
        tracing::debug!("ROM fingerprint {}", fingerprint);

        self.advance()?;
        let rom_name = rom.name.clone();
        let submission = RomSubmission::new(&options, rom.name, rom.bytes, fingerprint);
        self.engine.submit(submission).await?;

        self.advance()?;
        Ok(Prepared {
            options,
            warnings: normalized.warnings,
            rom_name,
            fingerprint,
        })
    }

    fn advance(&mut self) -> Result<(), PipelineError> {
        let from = self.machine.current();
        let to = self.machine.advance()?;
        if let Some(callback) = self.on_transition.as_mut() {
            callback(from, to);
        }
        Ok(())
    }

    fn fail(&mut self, error: PipelineError, settings: Option<&UserSettings>) -> SessionFailure {
        let stage = self.machine.current();
        if self.machine.fail().is_ok()
            && let Some(callback) = self.on_transition.as_mut()
        {
            callback(stage, SessionState::Failed);
        }

        let locale = settings.map_or(DEFAULT_LOCALE, |s| s.locale.as_str());
        let debug = self.debug || settings.is_some_and(|s| s.debug);
        let failure = SessionFailure::new(stage, error, locale, debug);
        tracing::warn!("Session failed while {}: {}", stage, failure.error);

        if let Some(callback) = self.on_failed.take() {
            callback(&failure);
        }
        failure
    }
}
