//! Scheduler lifecycle states

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a live session.
///
/// ```text
/// Idle ──► Loading ──► Live ──► Idle
///             │          │
///             ▼          ▼
///           Error ◄──────┘
/// ```
///
/// `Error` returns to `Idle` on stop, or straight to `Loading` when the
/// operator retries. `Disposed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SchedulerState {
    #[default]
    Idle,
    Loading,
    Live,
    Error,
    Disposed,
}

impl SchedulerState {
    pub fn can_transition_to(&self, next: SchedulerState) -> bool {
        use SchedulerState::*;
        matches!(
            (self, next),
            (Idle, Loading)
                | (Idle, Disposed)
                | (Loading, Live)
                | (Loading, Error)
                | (Live, Idle)
                | (Live, Error)
                | (Error, Idle)
                | (Error, Loading)
                | (Error, Disposed)
        )
    }

    pub fn is_live(&self) -> bool {
        *self == SchedulerState::Live
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SchedulerState::Idle => "Idle",
            SchedulerState::Loading => "Loading",
            SchedulerState::Live => "Live",
            SchedulerState::Error => "Error",
            SchedulerState::Disposed => "Disposed",
        }
    }
}

impl std::fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Operator-facing status, recorded on every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub state: SchedulerState,
    /// Failure reason or other detail
    pub message: Option<String>,
    pub at: DateTime<Utc>,
}

impl StatusReport {
    pub fn new(state: SchedulerState, message: Option<String>) -> Self {
        Self {
            state,
            message,
            at: Utc::now(),
        }
    }
}

impl std::fmt::Display for StatusReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S%.3f"), self.state)?;
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        use SchedulerState::*;
        assert!(Idle.can_transition_to(Loading));
        assert!(Loading.can_transition_to(Live));
        assert!(Loading.can_transition_to(Error));
        assert!(Live.can_transition_to(Idle));
        assert!(Live.can_transition_to(Error));
        assert!(Error.can_transition_to(Idle));
        assert!(Error.can_transition_to(Loading));

        assert!(!Idle.can_transition_to(Live));
        assert!(!Live.can_transition_to(Loading));
        assert!(!Disposed.can_transition_to(Idle));
        assert!(!Live.can_transition_to(Disposed));
    }

    #[test]
    fn test_status_display() {
        let report = StatusReport::new(SchedulerState::Error, Some("camera lost".into()));
        let text = report.to_string();
        assert!(text.ends_with("Error: camera lost"));
    }
}
