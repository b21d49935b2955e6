//! Declarative records: desired state per resource kind, canonical observed
//! state, and the persisted record that joins them.

mod app;
mod attr;
mod vm;

use serde::{Deserialize, Serialize};

pub use app::AppSpec;
pub use attr::Attr;
pub use vm::VmSpec;

/// Value written to address fields the control plane did not report.
pub const NOT_AVAILABLE: &str = "NA";

/// Storage persistence flags shared by both resource kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageFlags {
    pub persist_direct_attached_storage: Attr<bool>,
    pub personal_shared_storage: Attr<bool>,
    pub tenant_shared_storage: Attr<bool>,
}

/// Hardware details only reported for virtual servers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerHardware {
    pub gpu_type: Attr<String>,
    pub gpus: Attr<i32>,
    pub image: Attr<String>,
    pub memory: Attr<i64>,
    pub storage: Attr<i64>,
    pub storage_type: Attr<String>,
    pub vcpus: Attr<i32>,
}

/// Observed remote condition of one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalState {
    pub id: Attr<String>,
    pub status: Attr<String>,
    pub ip: Attr<String>,
    pub private_ip: Attr<String>,
    pub dns: Attr<String>,
    pub username: Attr<String>,
    pub tenant: Attr<String>,
    pub cluster: Attr<String>,
    pub namespace: Attr<String>,
    #[serde(flatten)]
    pub storage: StorageFlags,
    #[serde(flatten)]
    pub hardware: ServerHardware,
}

impl CanonicalState {
    /// State of a resource about to be created: everything is computed by
    /// the control plane, so everything starts unknown.
    pub fn planned() -> Self {
        Self {
            id: Attr::Unknown,
            status: Attr::Unknown,
            ip: Attr::Unknown,
            private_ip: Attr::Unknown,
            dns: Attr::Unknown,
            username: Attr::Unknown,
            tenant: Attr::Unknown,
            cluster: Attr::Unknown,
            namespace: Attr::Unknown,
            storage: StorageFlags {
                persist_direct_attached_storage: Attr::Unknown,
                personal_shared_storage: Attr::Unknown,
                tenant_shared_storage: Attr::Unknown,
            },
            hardware: ServerHardware {
                gpu_type: Attr::Unknown,
                gpus: Attr::Unknown,
                image: Attr::Unknown,
                memory: Attr::Unknown,
                storage: Attr::Unknown,
                storage_type: Attr::Unknown,
                vcpus: Attr::Unknown,
            },
        }
    }

    /// Resource id, or `""` when not yet known.
    pub fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// Persisted snapshot of one resource: the desired state as planned plus
/// the canonical state observed from the control plane.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record<D> {
    pub desired: D,
    #[serde(default)]
    pub state: CanonicalState,
}

impl<D> Record<D> {
    pub fn new(desired: D, state: CanonicalState) -> Self {
        Self { desired, state }
    }
}
