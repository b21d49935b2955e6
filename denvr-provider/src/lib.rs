//! denvr-provider: lifecycle reconciliation for Denvr Cloud resources.
//!
//! Given the desired state of a virtual machine or managed application, the
//! controllers in [`lifecycle`] create, read and destroy it through the
//! control-plane client and fold every response into one canonical state
//! record:
//!
//! - [`dispatch`] picks the creation strategy and builds the request
//! - [`poller`] waits until the resource reports its ready status
//! - [`normalize`] merges response shapes into [`CanonicalState`]
//! - [`host`] reads and writes the record files for the binary

pub mod dispatch;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod model;
pub mod normalize;
pub mod poller;
pub mod policy;

pub use error::{Diagnostic, LifecycleError, Result};
pub use lifecycle::{
    AppLifecycle, DEFAULT_READY_LABEL, Lifecycle, Operation, Outcome, Phase, UpdateOutcome,
    VmLifecycle,
};
pub use model::{AppSpec, Attr, CanonicalState, Record, VmSpec};
pub use normalize::{RawResponse, normalize};
pub use policy::WaitPolicy;
