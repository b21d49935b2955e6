//! Desired state of a virtual machine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Attr;
use crate::policy::WaitPolicy;

pub const DEFAULT_PERSONAL_STORAGE_MOUNT_PATH: &str = "/home/ubuntu/personal";
pub const DEFAULT_TENANT_SHARED_STORAGE_PATH: &str = "/home/ubuntu/tenant-shared";

/// Declarative input for one virtual machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmSpec {
    pub name: Attr<String>,
    pub cluster: Attr<String>,
    pub rpool: Attr<String>,
    pub vpc: Attr<String>,
    pub configuration: Attr<String>,
    pub operating_system_image: Attr<String>,
    pub root_disk_size: Attr<i32>,
    pub ssh_keys: Attr<Vec<Value>>,

    pub persist_storage: Attr<bool>,
    pub direct_storage_mount_path: Attr<String>,
    pub personal_storage_mount_path: Attr<String>,
    pub tenant_shared_additional_storage: Attr<String>,

    pub wait: Attr<bool>,
    pub interval: Attr<u64>,
    pub timeout: Attr<u64>,
}

impl VmSpec {
    /// Wait settings requested by this spec.
    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::from_attrs(&self.wait, &self.interval, &self.timeout)
    }

    /// Record the resolved wait settings in the persisted spec.
    pub fn with_policy(mut self, policy: &WaitPolicy) -> Self {
        policy.write_back(&mut self.wait, &mut self.interval, &mut self.timeout);
        self
    }

    /// Fill the storage attributes that have schema defaults.
    pub fn with_storage_defaults(mut self) -> Self {
        if !matches!(self.persist_storage, Attr::Value(_)) {
            self.persist_storage = false.into();
        }
        if !matches!(self.personal_storage_mount_path, Attr::Value(_)) {
            self.personal_storage_mount_path = DEFAULT_PERSONAL_STORAGE_MOUNT_PATH.into();
        }
        if !matches!(self.tenant_shared_additional_storage, Attr::Value(_)) {
            self.tenant_shared_additional_storage = DEFAULT_TENANT_SHARED_STORAGE_PATH.into();
        }
        self
    }

    /// Names of the attributes whose planned value differs from `prior`.
    pub fn changed_fields(&self, prior: &VmSpec) -> Vec<&'static str> {
        let mut changed = Vec::new();
        macro_rules! compare {
            ($($field:ident),* $(,)?) => {
                $(
                    if self.$field != prior.$field {
                        changed.push(stringify!($field));
                    }
                )*
            };
        }
        compare!(
            name,
            cluster,
            rpool,
            vpc,
            configuration,
            operating_system_image,
            root_disk_size,
            ssh_keys,
            persist_storage,
            direct_storage_mount_path,
            personal_storage_mount_path,
            tenant_shared_additional_storage,
        );
        changed
    }
}
