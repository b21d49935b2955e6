//! Desired state of a managed application.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Attr;
use crate::policy::WaitPolicy;

/// Declarative input for one application.
///
/// `image_repository_hostname` decides between the catalog and the custom
/// image creation paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSpec {
    // Identity and placement
    pub name: Attr<String>,
    pub cluster: Attr<String>,
    pub hardware_package_name: Attr<String>,
    pub resource_pool: Attr<String>,

    // Catalog applications
    pub application_catalog_item_name: Attr<String>,
    pub application_catalog_item_version: Attr<String>,
    pub jupyter_token: Attr<String>,
    pub ssh_keys: Attr<Vec<Value>>,

    // Custom images
    pub image_repository_hostname: Attr<String>,
    pub image_repository_username: Attr<String>,
    pub image_repository_password: Attr<String>,
    pub image_url: Attr<String>,
    pub image_cmd_override: Attr<Vec<Value>>,
    pub environment_variables: Attr<BTreeMap<String, Value>>,
    pub proxy_port: Attr<i32>,
    pub readiness_watcher_port: Attr<i32>,
    pub security_context_run_as_root: Attr<bool>,
    pub security_context_container_uid: Attr<i32>,
    pub security_context_container_gid: Attr<i32>,

    // Storage
    pub persist_direct_attached_storage: Attr<bool>,
    pub personal_shared_storage: Attr<bool>,
    pub tenant_shared_storage: Attr<bool>,

    // Wait policy
    pub wait: Attr<bool>,
    pub interval: Attr<u64>,
    pub timeout: Attr<u64>,
}

impl AppSpec {
    /// Wait settings requested by this spec.
    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::from_attrs(&self.wait, &self.interval, &self.timeout)
    }

    /// Record the resolved wait settings in the persisted spec.
    pub fn with_policy(mut self, policy: &WaitPolicy) -> Self {
        policy.write_back(&mut self.wait, &mut self.interval, &mut self.timeout);
        self
    }

    /// Names of the attributes whose planned value differs from `prior`.
    pub fn changed_fields(&self, prior: &AppSpec) -> Vec<&'static str> {
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
            hardware_package_name,
            resource_pool,
            application_catalog_item_name,
            application_catalog_item_version,
            jupyter_token,
            ssh_keys,
            image_repository_hostname,
            image_repository_username,
            image_repository_password,
            image_url,
            image_cmd_override,
            environment_variables,
            proxy_port,
            readiness_watcher_port,
            security_context_run_as_root,
            security_context_container_uid,
            security_context_container_gid,
            persist_direct_attached_storage,
            personal_shared_storage,
            tenant_shared_storage,
        );
        changed
    }
}
