//! Session lifecycle states.

use std::fmt;

/// Lifecycle state of a session being bootstrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    ConfigValidating,
    EngineLoading,
    SettingsLoading,
    Fetching,
    Resolving,
    Fingerprinting,
    Submitting,
    /// The engine acknowledged the ROM; frames may be pumped.
    Ready,
    /// A stage failed. Terminal.
    Failed,
}

impl SessionState {
    /// The stage that follows this one on success, if any.
    pub fn next(self) -> Option<SessionState> {
        use SessionState::*;
        match self {
            Idle => Some(ConfigValidating),
            ConfigValidating => Some(EngineLoading),
            EngineLoading => Some(SettingsLoading),
            SettingsLoading => Some(Fetching),
            Fetching => Some(Resolving),
            Resolving => Some(Fingerprinting),
            Fingerprinting => Some(Submitting),
            Submitting => Some(Ready),
            Ready | Failed => None,
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Ready | SessionState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::ConfigValidating => "validating config",
            SessionState::EngineLoading => "loading engine",
            SessionState::SettingsLoading => "loading settings",
            SessionState::Fetching => "fetching",
            SessionState::Resolving => "resolving",
            SessionState::Fingerprinting => "fingerprinting",
            SessionState::Submitting => "submitting",
            SessionState::Ready => "ready",
            SessionState::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transition the lifecycle does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid session transition from {from} to {to}")]
pub struct TransitionError {
    pub from: SessionState,
    pub to: SessionState,
}

/// Strictly sequential lifecycle.
///
/// The only allowed moves are to the next stage, or from any non-terminal
/// state to [`SessionState::Failed`].
#[derive(Debug, Clone)]
pub struct StateMachine {
    current: SessionState,
    history: Vec<SessionState>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: SessionState::Idle,
            history: vec![SessionState::Idle],
        }
    }

    pub fn current(&self) -> SessionState {
        self.current
    }

    /// Every state entered so far, starting with `Idle`.
    pub fn history(&self) -> &[SessionState] {
        &self.history
    }

    /// Move to `to`, returning the state that was left.
    pub fn transition(&mut self, to: SessionState) -> Result<SessionState, TransitionError> {
        let from = self.current;
        let allowed = match to {
            SessionState::Failed => !from.is_terminal(),
            _ => from.next() == Some(to),
        };
        if !allowed {
            return Err(TransitionError { from, to });
        }

        self.current = to;
        self.history.push(to);
        tracing::debug!("Session {} -> {}", from, to);
        Ok(from)
    }

    /// Move to the next stage.
    pub fn advance(&mut self) -> Result<SessionState, TransitionError> {
        let to = self.current.next().ok_or(TransitionError {
            from: self.current,
            to: self.current,
        })?;
        self.transition(to).map(|_| to)
    }

    /// Move to `Failed`, returning the stage that failed.
    pub fn fail(&mut self) -> Result<SessionState, TransitionError> {
        self.transition(SessionState::Failed)
    }
}
