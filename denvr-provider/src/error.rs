//! Lifecycle error types.

use denvr_api::ClientError;
use thiserror::Error;

/// Errors raised while reconciling one resource.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A required input or response field was absent.
    #[error("{0}")]
    Validation(String),

    /// A list or map attribute could not be converted.
    #[error("error parsing {field}: {reason}")]
    Conversion { field: &'static str, reason: String },

    /// The remote resource does not exist.
    #[error("\"{id}\" not found")]
    NotFound { id: String },

    /// Readiness was not reached within the wait budget.
    #[error("Waiting for {operation} to come \"{ready}\" timed out")]
    Timeout { operation: String, ready: String },

    /// The control plane reported a configured terminal failure status.
    #[error("{operation} reported terminal status \"{status}\"")]
    RemoteFailure { operation: String, status: String },

    /// The response did not have a shape the normalizer accepts.
    #[error("unexpected response shape: {0}")]
    Normalize(String),

    /// Any other client failure, surfaced verbatim.
    #[error(transparent)]
    Transport(#[from] ClientError),
}

impl LifecycleError {
    pub fn validation(message: impl Into<String>) -> Self {
        LifecycleError::Validation(message.into())
    }

    /// Short title for the host diagnostic. `action` names the failed call,
    /// e.g. "Error creating application".
    pub fn summary<'a>(&self, action: &'a str) -> &'a str {
        match self {
            LifecycleError::Timeout { .. } => "Timeout Error",
            _ => action,
        }
    }

    /// Render as a host diagnostic.
    pub fn diagnostic(&self, action: &str) -> Diagnostic {
        Diagnostic {
            summary: self.summary(action).to_string(),
            detail: self.to_string(),
        }
    }
}

/// User-visible failure reported to the host orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub summary: String,
    pub detail: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)
    }
}

impl std::error::Error for Diagnostic {}

/// Result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, LifecycleError>;
