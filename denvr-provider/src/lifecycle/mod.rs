//! Lifecycle controllers for the different resource kinds.
//!
//! Each controller turns one host request (create, read, update or delete)
//! into the matching control-plane call, folds the response into canonical
//! state and tells the host what to do with its stored record.

mod app;
mod vm;

#[cfg(test)]
pub(crate) mod fake;

pub use app::AppLifecycle;
pub use vm::VmLifecycle;

use async_trait::async_trait;
use denvr_api::ClientError;
use tracing::{error, info, warn};

use crate::error::{LifecycleError, Result};
use crate::model::Record;
use crate::policy::WaitPolicy;

/// Status that marks a freshly created resource as usable.
pub const DEFAULT_READY_LABEL: &str = "ONLINE";

/// What the host should do with its stored record.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<R> {
    /// Store this record.
    Persist(R),
    /// Drop the stored record; the remote resource is gone.
    Remove,
}

/// Result of an update: the record to store plus the desired attributes
/// that changed but were not pushed to the control plane.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome<D> {
    pub record: Record<D>,
    pub unapplied: Vec<&'static str>,
}

/// Host request kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

/// Lifecycle phase of one resource within a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    Waiting,
    Ready,
    NotFound,
    Failed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Created => "Created",
            Phase::Waiting => "Waiting",
            Phase::Ready => "Ready",
            Phase::NotFound => "NotFound",
            Phase::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Trait for resource lifecycle controllers.
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// The desired-state type for this resource kind.
    type Desired: Send + Sync;

    /// Diagnostic title for a failed `operation`.
    fn error_title(&self, operation: Operation) -> &'static str;

    /// Create the resource and, when the plan asks for it, wait until it is
    /// ready.
    async fn create(&self, desired: Self::Desired) -> Result<Record<Self::Desired>>;

    /// Refresh canonical state from the control plane.
    async fn read(&self, record: Record<Self::Desired>) -> Result<Outcome<Record<Self::Desired>>>;

    /// Accept a new plan. Nothing is sent to the control plane.
    async fn update(
        &self,
        prior: Record<Self::Desired>,
        plan: Self::Desired,
    ) -> Result<UpdateOutcome<Self::Desired>>;

    /// Destroy the resource. Always ends in [`Outcome::Remove`] on success.
    async fn delete(
        &self,
        record: Record<Self::Desired>,
    ) -> Result<Outcome<Record<Self::Desired>>>;
}

/// Readiness settings shared by the controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readiness {
    pub ready_label: String,
    pub failure_labels: Vec<String>,
}

impl Default for Readiness {
    fn default() -> Self {
        Self {
            ready_label: DEFAULT_READY_LABEL.to_string(),
            failure_labels: Vec::new(),
        }
    }
}

impl Readiness {
    /// Attach the failure labels to a policy built from a plan.
    fn apply(&self, policy: WaitPolicy) -> WaitPolicy {
        policy.with_failure_labels(self.failure_labels.iter().cloned())
    }
}

pub(crate) fn transition(kind: &str, id: &str, phase: Phase) {
    match phase {
        Phase::Failed => error!(kind, id, %phase, "Lifecycle transition"),
        _ => info!(kind, id, %phase, "Lifecycle transition"),
    }
}

/// Map a client error for resource `id`, recognizing not-found.
pub(crate) fn from_client(err: ClientError, id: &str) -> LifecycleError {
    if err.is_not_found(id) {
        LifecycleError::NotFound { id: id.to_string() }
    } else {
        LifecycleError::Transport(err)
    }
}

/// Accept `plan` over the prior record without touching the control plane.
pub(crate) fn accept_plan<D>(
    kind: &str,
    prior: Record<D>,
    plan: D,
    unapplied: Vec<&'static str>,
) -> UpdateOutcome<D> {
    if !unapplied.is_empty() {
        warn!(
            kind,
            id = prior.state.id(),
            fields = ?unapplied,
            "Update does not change the remote resource; changed attributes are only stored locally"
        );
    }
    UpdateOutcome {
        record: Record::new(plan, prior.state),
        unapplied,
    }
}

/// Value of a response field the controller cannot continue without.
pub(crate) fn required_field(value: Option<&String>, kind: &str, field: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| LifecycleError::validation(format!("{kind} response has no {field}")))
}
