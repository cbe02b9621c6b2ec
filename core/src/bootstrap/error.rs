use crate::archive::ResolutionError;
use crate::config::{ConfigError, SettingsError};
use crate::engine::EngineError;
use crate::fetch::FetchError;
use crate::text::{TextId, get_text};

use super::state::{SessionState, TransitionError};

/// Any error that aborts the launch pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// A session that ended in the failed state.
#[derive(Debug, thiserror::Error)]
#[error("session failed while {stage}: {error}")]
pub struct SessionFailure {
    /// Stage the pipeline was in when it failed
    pub stage: SessionState,
    /// Originating error
    #[source]
    pub error: PipelineError,
    /// Message to show the user: the error detail for configuration errors
    /// and in debug mode, the localized generic message otherwise
    pub message: String,
}

impl SessionFailure {
    pub(crate) fn new(stage: SessionState, error: PipelineError, locale: &str, debug: bool) -> Self {
        let message = if debug || matches!(error, PipelineError::Config(_)) {
            error.to_string()
        } else {
            get_text(TextId::ErrorRetrievingGame, locale).to_string()
        };
        Self {
            stage,
            error,
            message,
        }
    }
}
