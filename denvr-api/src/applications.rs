//! Application endpoints.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// =============================================================================
// Requests
// =============================================================================

/// Body of `CreateCatalogApplication`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCatalogApplicationRequest {
    pub application_catalog_item_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_catalog_item_version: Option<String>,
    pub cluster: String,
    pub hardware_package_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jupyter_token: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist_direct_attached_storage: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_shared_storage: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_pool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_shared_storage: Option<bool>,
}

/// Registry the custom image is pulled from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRepository {
    pub hostname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Container security settings for custom applications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_as_root: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_uid: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_gid: Option<i32>,
}

/// Body of `CreateCustomApplication`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomApplicationRequest {
    pub cluster: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_variables: Option<BTreeMap<String, Option<String>>>,
    pub hardware_package_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_cmd_override: Option<Vec<String>>,
    pub image_repository: ImageRepository,
    pub image_url: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist_direct_attached_storage: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_shared_storage: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness_watcher_port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_pool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_shared_storage: Option<bool>,
}

// =============================================================================
// Responses
// =============================================================================

/// Returned by both create calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationOverview {
    pub id: Option<String>,
    pub cluster: Option<String>,
    pub application_catalog_item_name: Option<String>,
    pub application_catalog_item_version: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "publicIP")]
    pub public_ip: Option<String>,
    #[serde(rename = "privateIP")]
    pub private_ip: Option<String>,
    pub dns: Option<String>,
    pub created_by: Option<String>,
    pub tenant: Option<String>,
    pub hardware_package: Option<String>,
    pub resource_pool: Option<String>,
    pub ssh_username: Option<String>,
    pub persisted_direct_attached_storage: Option<bool>,
    pub personal_shared_storage: Option<bool>,
    pub tenant_shared_storage: Option<bool>,
}

/// Instance block of a details response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceDetails {
    pub id: Option<String>,
    pub cluster: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "publicIP")]
    pub public_ip: Option<String>,
    #[serde(rename = "privateIP")]
    pub private_ip: Option<String>,
    pub dns: Option<String>,
    pub created_by: Option<String>,
    pub tenant: Option<String>,
    pub hardware_package: Option<String>,
    pub resource_pool: Option<String>,
    pub ssh_username: Option<String>,
    pub image_url: Option<String>,
    pub persisted_direct_attached_storage: Option<bool>,
    pub personal_shared_storage: Option<bool>,
    pub tenant_shared_storage: Option<bool>,
}

/// Returned by `GetApplicationDetails`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDetails {
    #[serde(rename = "instanceDetails", alias = "InstanceDetails")]
    pub instance_details: Option<InstanceDetails>,
}

/// Returned by `DestroyApplication`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationCommandResult {
    pub id: Option<String>,
    pub cluster: Option<String>,
}

/// Query parameters identifying one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApplicationKey {
    pub id: String,
    pub cluster: String,
}

impl ApplicationKey {
    pub fn new(id: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cluster: cluster.into(),
        }
    }
}

/// Application operations.
#[async_trait]
pub trait ApplicationApi: Send + Sync {
    async fn create_catalog_application(
        &self,
        request: &CreateCatalogApplicationRequest,
    ) -> Result<Option<ApplicationOverview>>;

    async fn create_custom_application(
        &self,
        request: &CreateCustomApplicationRequest,
    ) -> Result<Option<ApplicationOverview>>;

    async fn get_application_details(
        &self,
        key: &ApplicationKey,
    ) -> Result<Option<ApplicationDetails>>;

    async fn destroy_application(
        &self,
        key: &ApplicationKey,
    ) -> Result<Option<ApplicationCommandResult>>;
}
