//! Virtual server endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Body of `CreateServer`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServerRequest {
    pub cluster: String,
    pub configuration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_storage_mount_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_system_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist_storage: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_storage_mount_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_disk_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpool: Option<String>,
    pub ssh_keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_shared_additional_storage: Option<String>,
    pub vpc: String,
}

/// Server record returned by create, get and destroy.
///
/// The API mixes snake_case and camelCase keys here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub id: Option<String>,
    pub cluster: Option<String>,
    pub namespace: Option<String>,
    pub status: Option<String>,
    pub ip: Option<String>,
    #[serde(rename = "privateIp", alias = "private_ip")]
    pub private_ip: Option<String>,
    pub username: Option<String>,
    #[serde(rename = "tenancy_name", alias = "tenancyName")]
    pub tenancy_name: Option<String>,
    #[serde(rename = "gpu_type", alias = "gpuType")]
    pub gpu_type: Option<String>,
    pub gpus: Option<i32>,
    pub image: Option<String>,
    pub memory: Option<i64>,
    pub storage: Option<i64>,
    #[serde(rename = "storageType", alias = "storage_type")]
    pub storage_type: Option<String>,
    pub vcpus: Option<i32>,
    #[serde(
        rename = "directAttachedStoragePersisted",
        alias = "direct_attached_storage_persisted"
    )]
    pub direct_attached_storage_persisted: Option<bool>,
}

/// Query parameters identifying one server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerKey {
    pub id: String,
    pub namespace: String,
    pub cluster: String,
}

impl ServerKey {
    pub fn new(
        id: impl Into<String>,
        namespace: impl Into<String>,
        cluster: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            namespace: namespace.into(),
            cluster: cluster.into(),
        }
    }
}

/// Virtual server operations.
#[async_trait]
pub trait ServerApi: Send + Sync {
    async fn create_server(&self, request: &CreateServerRequest) -> Result<Option<ServerInfo>>;

    async fn get_server(&self, key: &ServerKey) -> Result<Option<ServerInfo>>;

    async fn destroy_server(&self, key: &ServerKey) -> Result<Option<ServerInfo>>;
}
