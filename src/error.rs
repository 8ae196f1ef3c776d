//! Error handling for the kinetic-stage runtime
//!
//! This module defines the crate-level error type, the acquisition error
//! surfaced to the operator, and a Result alias used throughout the crate.
//!
//! Two situations that look like failures are deliberately *not* errors:
//! a frame with zero tracked subjects (a legitimate zero value for the
//! metric extractor) and a tick with no camera frame yet (reported as
//! `TickOutcome::Skipped` by the scheduler).

use crate::graph::GraphError;
use crate::runtime::SchedulerState;
use thiserror::Error;

/// Camera or model acquisition failures.
///
/// These halt a live session and move the scheduler into its `Error`
/// state. They are recoverable by retrying the start action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    /// The camera could not be opened.
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    /// The landmark model could not be loaded.
    #[error("Landmark model unavailable: {0}")]
    ModelUnavailable(String),

    /// The camera disappeared while the session was live.
    #[error("Camera lost: {0}")]
    CameraLost(String),

    /// Start was requested from a state that cannot reach `Loading`.
    /// Nothing was acquired and the state is unchanged.
    #[error("Cannot start from {0}")]
    InvalidState(SchedulerState),
}

/// Main error type for kinetic-stage operations
#[derive(Error, Debug)]
pub enum StageError {
    /// Camera/model acquisition errors
    #[error("Acquisition error: {0}")]
    Acquisition(#[from] AcquisitionError),

    /// Structural graph edits that were rejected
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// A single detector invocation failed (transient)
    #[error("Detection error: {0}")]
    Detection(String),

    /// Errors related to configuration loading/saving/validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<StageError>,
    },
}

impl StageError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        StageError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error should halt a live session.
    pub fn is_acquisition(&self) -> bool {
        match self {
            StageError::Acquisition(_) => true,
            StageError::WithContext { source, .. } => source.is_acquisition(),
            _ => false,
        }
    }
}

/// Result type alias for kinetic-stage operations
pub type Result<T> = std::result::Result<T, StageError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<StageError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Into::<StageError>::into(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| Into::<StageError>::into(e).with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;

    #[test]
    fn test_error_display() {
        let err = StageError::Config("jaw_max must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: jaw_max must be positive"
        );
    }

    #[test]
    fn test_error_with_context() {
        let err = StageError::Detection("model busy".to_string());
        let with_ctx = err.with_context("Face detection");
        assert!(with_ctx.to_string().contains("Face detection"));
        assert!(with_ctx.to_string().contains("model busy"));
    }

    #[test]
    fn test_acquisition_detection_through_context() {
        let err: Result<()> = Err(AcquisitionError::CameraUnavailable("busy".into()))
            .context("Starting live session");
        let err = err.unwrap_err();
        assert!(err.is_acquisition());
        assert!(!StageError::Detection("x".into()).is_acquisition());
    }

    #[test]
    fn test_graph_error_conversion() {
        let err: StageError = GraphError::UnknownNode(NodeId(7)).into();
        assert!(err.to_string().contains("NodeId(7)"));
    }
}
