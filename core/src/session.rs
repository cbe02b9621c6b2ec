//! Live emulator session.

use std::sync::Arc;

use romdeck_shared::ContentFingerprint;

use crate::bootstrap::SessionState;
use crate::config::{FieldValidationError, SessionOptions};
use crate::engine::{Engine, EngineError};
use crate::registry::BridgeRegistration;
use crate::save_bridge::SaveBridge;

/// A session that reached [`SessionState::Ready`].
///
/// Only a ready session exists as a value, so frame pumping can never start
/// before the engine acknowledged the ROM. Dropping the session withdraws its
/// save bridge from the registry.
pub struct EmulatorSession<E: Engine> {
    engine: E,
    options: SessionOptions,
    warnings: Vec<FieldValidationError>,
    rom_name: String,
    fingerprint: ContentFingerprint,
    bridge: Arc<SaveBridge>,
    registration: Option<BridgeRegistration>,
    history: Vec<SessionState>,
    running: bool,
}

impl<E: Engine> EmulatorSession<E> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        engine: E,
        options: SessionOptions,
        warnings: Vec<FieldValidationError>,
        rom_name: String,
        fingerprint: ContentFingerprint,
        bridge: Arc<SaveBridge>,
        registration: Option<BridgeRegistration>,
        history: Vec<SessionState>,
    ) -> Self {
        Self {
            engine,
            options,
            warnings,
            rom_name,
            fingerprint,
            bridge,
            registration,
            history,
            running: false,
        }
    }

    pub fn state(&self) -> SessionState {
        SessionState::Ready
    }

    /// States the session went through during bootstrap.
    pub fn history(&self) -> &[SessionState] {
        &self.history
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Optional fields that were rejected and defaulted during normalization.
    pub fn warnings(&self) -> &[FieldValidationError] {
        &self.warnings
    }

    /// Name of the resolved ROM.
    pub fn rom_name(&self) -> &str {
        &self.rom_name
    }

    pub fn fingerprint(&self) -> &ContentFingerprint {
        &self.fingerprint
    }

    /// Save operations for the host.
    pub fn bridge(&self) -> &Arc<SaveBridge> {
        &self.bridge
    }

    /// Whether the bridge is published to a registry.
    pub fn is_published(&self) -> bool {
        self.registration.is_some()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start frame pumping. Calling it again is a no-op.
    pub fn start_frames(&mut self) -> Result<(), EngineError> {
        if self.running {
            return Ok(());
        }
        self.engine.start()?;
        self.running = true;
        tracing::info!("Running '{}'", self.rom_name);
        Ok(())
    }

    /// End the session.
    ///
    /// Unless the exit was requested from the pause screen, the engine is
    /// asked to save its state first. Save data is flushed either way and
    /// the bridge is withdrawn. Returns the engine.
    pub async fn shutdown(mut self, exit_from_pause: bool) -> E {
        if !exit_from_pause
            && let Err(e) = self.engine.save_state().await
        {
            tracing::warn!("Failed to save state on exit: {}", e);
        }
        self.bridge.flush();
        self.registration = None;
        tracing::info!("Session for '{}' ended", self.rom_name);
        self.engine
    }
}
