//! Folding control-plane responses into canonical state.
//!
//! Each call returns its own record shape. [`RawResponse`] lists the shapes
//! that are accepted; [`normalize`] merges one of them into a prior
//! [`CanonicalState`], writing only the fields the shape carries, plus the
//! status and address fallbacks.

use denvr_api::{ApplicationDetails, ApplicationOverview, InstanceDetails, ServerInfo};
use tracing::debug;

use crate::error::{LifecycleError, Result};
use crate::model::{Attr, CanonicalState, NOT_AVAILABLE};

/// Status written when the response has none and the prior status was
/// unknown.
pub const STATUS_UNKNOWN: &str = "UNKNOWN";
/// Status written when the response has none and the prior status was null.
pub const STATUS_NULL: &str = "NULL";

/// A response record from one of the control-plane calls.
#[derive(Debug, Clone, Copy)]
pub enum RawResponse<'a> {
    /// Application create calls.
    ApplicationOverview(&'a ApplicationOverview),
    /// Instance block of an application details call.
    InstanceDetails(&'a InstanceDetails),
    /// Full application details; must carry an instance block.
    ApplicationDetails(&'a ApplicationDetails),
    /// Virtual server create, get and destroy calls.
    Server(&'a ServerInfo),
}

impl<'a> From<&'a ApplicationOverview> for RawResponse<'a> {
    fn from(r: &'a ApplicationOverview) -> Self {
        RawResponse::ApplicationOverview(r)
    }
}

impl<'a> From<&'a InstanceDetails> for RawResponse<'a> {
    fn from(r: &'a InstanceDetails) -> Self {
        RawResponse::InstanceDetails(r)
    }
}

impl<'a> From<&'a ApplicationDetails> for RawResponse<'a> {
    fn from(r: &'a ApplicationDetails) -> Self {
        RawResponse::ApplicationDetails(r)
    }
}

impl<'a> From<&'a ServerInfo> for RawResponse<'a> {
    fn from(r: &'a ServerInfo) -> Self {
        RawResponse::Server(r)
    }
}

/// The logical fields a response shape carries.
#[derive(Default)]
struct Fields<'a> {
    id: Option<&'a String>,
    status: Option<&'a String>,
    ip: Option<&'a String>,
    private_ip: Option<&'a String>,
    dns: Option<&'a String>,
    username: Option<&'a String>,
    tenant: Option<&'a String>,
    cluster: Option<&'a String>,
    namespace: Option<&'a String>,
    persist_direct_attached_storage: Option<bool>,
    personal_shared_storage: Option<bool>,
    tenant_shared_storage: Option<bool>,
    server: Option<&'a ServerInfo>,
}

impl<'a> Fields<'a> {
    fn extract(response: RawResponse<'a>) -> Result<Self> {
        let fields = match response {
            RawResponse::ApplicationOverview(v) => Fields {
                id: v.id.as_ref(),
                status: v.status.as_ref(),
                ip: v.public_ip.as_ref(),
                private_ip: v.private_ip.as_ref(),
                dns: v.dns.as_ref(),
                username: v.created_by.as_ref(),
                tenant: v.tenant.as_ref(),
                cluster: v.cluster.as_ref(),
                persist_direct_attached_storage: v.persisted_direct_attached_storage,
                personal_shared_storage: v.personal_shared_storage,
                tenant_shared_storage: v.tenant_shared_storage,
                ..Default::default()
            },
            RawResponse::InstanceDetails(v) => Fields {
                id: v.id.as_ref(),
                status: v.status.as_ref(),
                ip: v.public_ip.as_ref(),
                private_ip: v.private_ip.as_ref(),
                dns: v.dns.as_ref(),
                username: v.created_by.as_ref(),
                tenant: v.tenant.as_ref(),
                cluster: v.cluster.as_ref(),
                persist_direct_attached_storage: v.persisted_direct_attached_storage,
                personal_shared_storage: v.personal_shared_storage,
                tenant_shared_storage: v.tenant_shared_storage,
                ..Default::default()
            },
            RawResponse::ApplicationDetails(v) => match v.instance_details.as_ref() {
                Some(instance) => Fields::extract(RawResponse::InstanceDetails(instance))?,
                None => {
                    return Err(LifecycleError::Normalize(
                        "application details without instance details".to_string(),
                    ));
                }
            },
            RawResponse::Server(v) => Fields {
                id: v.id.as_ref(),
                status: v.status.as_ref(),
                ip: v.ip.as_ref(),
                private_ip: v.private_ip.as_ref(),
                username: v.username.as_ref(),
                tenant: v.tenancy_name.as_ref(),
                cluster: v.cluster.as_ref(),
                namespace: v.namespace.as_ref(),
                // Servers omit the flag when storage is not persisted.
                persist_direct_attached_storage: Some(
                    v.direct_attached_storage_persisted.unwrap_or(false),
                ),
                server: Some(v),
                ..Default::default()
            },
        };
        Ok(fields)
    }
}

/// Merge `response` into `state`.
pub fn normalize(mut state: CanonicalState, response: RawResponse<'_>) -> Result<CanonicalState> {
    let fields = Fields::extract(response)?;

    state.id.merge(fields.id.cloned());

    state.status = match fields.status {
        Some(status) => {
            debug!(status = %status, "Resource status");
            Attr::Value(status.clone())
        }
        None => fallback_status(&state.status),
    };

    state.ip = or_not_available(fields.ip);
    state.private_ip = or_not_available(fields.private_ip);
    state.dns = or_not_available(fields.dns);

    state.username.merge(fields.username.cloned());
    state.tenant.merge(fields.tenant.cloned());
    state.cluster.merge(fields.cluster.cloned());
    state.namespace.merge(fields.namespace.cloned());

    state
        .storage
        .persist_direct_attached_storage
        .merge(fields.persist_direct_attached_storage);
    state
        .storage
        .personal_shared_storage
        .merge(fields.personal_shared_storage);
    state
        .storage
        .tenant_shared_storage
        .merge(fields.tenant_shared_storage);

    if let Some(server) = fields.server {
        let hw = &mut state.hardware;
        hw.gpu_type.merge(server.gpu_type.clone());
        hw.gpus.merge(server.gpus);
        hw.image.merge(server.image.clone());
        hw.memory.merge(server.memory);
        hw.storage.merge(server.storage);
        hw.storage_type.merge(server.storage_type.clone());
        hw.vcpus.merge(server.vcpus);
    }

    Ok(state)
}

/// Status to keep when the response carries none.
fn fallback_status(previous: &Attr<String>) -> Attr<String> {
    match previous {
        Attr::Unknown => {
            debug!("Resource status is UNKNOWN");
            STATUS_UNKNOWN.into()
        }
        Attr::Null => {
            debug!("Resource status is NULL");
            STATUS_NULL.into()
        }
        Attr::Value(s) if s.is_empty() => previous.clone(),
        Attr::Value(_) => "".into(),
    }
}

fn or_not_available(value: Option<&String>) -> Attr<String> {
    match value {
        Some(v) => Attr::Value(v.clone()),
        None => NOT_AVAILABLE.into(),
    }
}
