//! Creation request construction.
//!
//! Applications have two mutually exclusive creation strategies, chosen by
//! `image_repository_hostname`: a custom container image when it is set,
//! otherwise a catalog item. Virtual machines have one. Nothing here talks
//! to the network.

use std::collections::BTreeMap;

use denvr_api::{
    CreateCatalogApplicationRequest, CreateCustomApplicationRequest, CreateServerRequest,
    ImageRepository, SecurityContext,
};
use serde_json::Value;
use tracing::debug;

use crate::error::{LifecycleError, Result};
use crate::model::{AppSpec, Attr, VmSpec};

/// Application creation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Catalog,
    Custom,
}

/// A fully populated application creation request.
#[derive(Debug, Clone, PartialEq)]
pub enum CreationRequest {
    Catalog(CreateCatalogApplicationRequest),
    Custom(CreateCustomApplicationRequest),
}

impl CreationRequest {
    pub fn strategy(&self) -> Strategy {
        match self {
            CreationRequest::Catalog(_) => Strategy::Catalog,
            CreationRequest::Custom(_) => Strategy::Custom,
        }
    }
}

/// The discriminator alone decides, even when fields of both strategies
/// are present.
pub fn select_strategy(spec: &AppSpec) -> Strategy {
    if is_set(&spec.image_repository_hostname) {
        Strategy::Custom
    } else {
        Strategy::Catalog
    }
}

/// Build the creation request for whichever strategy `spec` selects.
pub fn build_application_request(spec: &AppSpec) -> Result<CreationRequest> {
    let strategy = select_strategy(spec);
    debug!(?strategy, "Selected application creation strategy");
    match strategy {
        Strategy::Catalog => build_catalog_request(spec).map(CreationRequest::Catalog),
        Strategy::Custom => build_custom_request(spec).map(CreationRequest::Custom),
    }
}

pub fn build_catalog_request(spec: &AppSpec) -> Result<CreateCatalogApplicationRequest> {
    if !is_set(&spec.application_catalog_item_name) {
        return Err(LifecycleError::validation(
            "application_catalog_item_name is required for catalog applications",
        ));
    }

    Ok(CreateCatalogApplicationRequest {
        application_catalog_item_name: require(
            &spec.application_catalog_item_name,
            "application_catalog_item_name",
        )?,
        application_catalog_item_version: spec.application_catalog_item_version.to_option(),
        cluster: require(&spec.cluster, "cluster")?,
        hardware_package_name: require(&spec.hardware_package_name, "hardware_package_name")?,
        jupyter_token: spec.jupyter_token.to_option(),
        name: require(&spec.name, "name")?,
        persist_direct_attached_storage: spec.persist_direct_attached_storage.to_option(),
        personal_shared_storage: spec.personal_shared_storage.to_option(),
        resource_pool: spec.resource_pool.to_option(),
        ssh_keys: convert_list("ssh_keys", &spec.ssh_keys)?,
        tenant_shared_storage: spec.tenant_shared_storage.to_option(),
    })
}

pub fn build_custom_request(spec: &AppSpec) -> Result<CreateCustomApplicationRequest> {
    if !is_set(&spec.image_repository_hostname) {
        return Err(LifecycleError::validation(
            "image_repository_hostname is required for custom applications",
        ));
    }

    Ok(CreateCustomApplicationRequest {
        cluster: require(&spec.cluster, "cluster")?,
        environment_variables: convert_map("environment_variables", &spec.environment_variables)?,
        hardware_package_name: require(&spec.hardware_package_name, "hardware_package_name")?,
        image_cmd_override: convert_list("image_cmd_override", &spec.image_cmd_override)?,
        image_repository: ImageRepository {
            hostname: require(&spec.image_repository_hostname, "image_repository_hostname")?,
            username: spec.image_repository_username.to_option(),
            password: spec.image_repository_password.to_option(),
        },
        image_url: require(&spec.image_url, "image_url")?,
        name: require(&spec.name, "name")?,
        persist_direct_attached_storage: spec.persist_direct_attached_storage.to_option(),
        personal_shared_storage: spec.personal_shared_storage.to_option(),
        proxy_port: spec.proxy_port.to_option(),
        readiness_watcher_port: spec.readiness_watcher_port.to_option(),
        resource_pool: spec.resource_pool.to_option(),
        security_context: security_context(spec),
        tenant_shared_storage: spec.tenant_shared_storage.to_option(),
    })
}

pub fn build_server_request(spec: &VmSpec) -> Result<CreateServerRequest> {
    Ok(CreateServerRequest {
        cluster: require(&spec.cluster, "cluster")?,
        configuration: require(&spec.configuration, "configuration")?,
        direct_storage_mount_path: spec.direct_storage_mount_path.to_option(),
        name: Some(require(&spec.name, "name")?),
        operating_system_image: spec.operating_system_image.to_option(),
        persist_storage: spec.persist_storage.to_option(),
        personal_storage_mount_path: spec.personal_storage_mount_path.to_option(),
        root_disk_size: spec.root_disk_size.to_option(),
        rpool: spec.rpool.to_option(),
        // Mandatory on the wire.
        ssh_keys: convert_list("ssh_keys", &spec.ssh_keys)?.unwrap_or_default(),
        tenant_shared_additional_storage: spec.tenant_shared_additional_storage.to_option(),
        vpc: require(&spec.vpc, "vpc")?,
    })
}

// =============================================================================
// Attribute conversion
// =============================================================================

/// Value of a required attribute.
pub fn require(attr: &Attr<String>, field: &str) -> Result<String> {
    attr.value()
        .cloned()
        .ok_or_else(|| LifecycleError::validation(format!("{field} is required")))
}

/// Convert a loosely typed list to strings. Unset stays absent, an empty
/// list stays empty.
pub fn convert_list(field: &'static str, attr: &Attr<Vec<Value>>) -> Result<Option<Vec<String>>> {
    let Some(values) = attr.value() else {
        return Ok(None);
    };

    values
        .iter()
        .enumerate()
        .map(|(i, value)| match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(LifecycleError::Conversion {
                field,
                reason: format!("element {i} is not a string: {other}"),
            }),
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

/// Convert a loosely typed map to nullable strings.
pub fn convert_map(
    field: &'static str,
    attr: &Attr<BTreeMap<String, Value>>,
) -> Result<Option<BTreeMap<String, Option<String>>>> {
    let Some(values) = attr.value() else {
        return Ok(None);
    };

    values
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key.clone(), Some(s.clone()))),
            Value::Null => Ok((key.clone(), None)),
            other => Err(LifecycleError::Conversion {
                field,
                reason: format!("value of {key:?} is not a string: {other}"),
            }),
        })
        .collect::<Result<BTreeMap<_, _>>>()
        .map(Some)
}

fn security_context(spec: &AppSpec) -> Option<SecurityContext> {
    let context = SecurityContext {
        run_as_root: spec.security_context_run_as_root.to_option(),
        container_uid: spec.security_context_container_uid.to_option(),
        container_gid: spec.security_context_container_gid.to_option(),
    };
    (context != SecurityContext::default()).then_some(context)
}

fn is_set(attr: &Attr<String>) -> bool {
    attr.value().is_some_and(|s| !s.is_empty())
}
