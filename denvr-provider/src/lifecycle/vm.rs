//! Virtual machine lifecycle controller.

use std::sync::Arc;

use async_trait::async_trait;
use denvr_api::{ServerApi, ServerKey};
use tracing::{debug, info};

use super::{
    Lifecycle, Operation, Outcome, Phase, Readiness, UpdateOutcome, accept_plan, from_client,
    required_field, transition,
};
use crate::dispatch;
use crate::error::{LifecycleError, Result};
use crate::model::{CanonicalState, Record, VmSpec};
use crate::normalize::{RawResponse, normalize};
use crate::poller;

const KIND: &str = "server";

/// Controller for virtual machines.
pub struct VmLifecycle<C> {
    client: Arc<C>,
    readiness: Readiness,
}

impl<C: ServerApi> VmLifecycle<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            readiness: Readiness::default(),
        }
    }

    pub fn with_ready_label(mut self, label: impl Into<String>) -> Self {
        self.readiness.ready_label = label.into();
        self
    }

    pub fn with_failure_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.readiness.failure_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    async fn fetch(&self, key: &ServerKey, prior: CanonicalState) -> Result<CanonicalState> {
        let server = self
            .client
            .get_server(key)
            .await
            .map_err(|e| from_client(e, &key.id))?
            .ok_or_else(|| {
                LifecycleError::validation(format!("no record returned for server {:?}", key.id))
            })?;
        normalize(prior, RawResponse::from(&server))
    }

    fn key(record: &Record<VmSpec>) -> Result<ServerKey> {
        let id = record.state.id();
        if id.is_empty() {
            return Err(LifecycleError::validation("server record has no id"));
        }
        let cluster = match record.state.cluster.as_str() {
            "" => record.desired.cluster.as_str(),
            cluster => cluster,
        };
        Ok(ServerKey::new(id, record.state.namespace.as_str(), cluster))
    }

    async fn try_create(&self, desired: VmSpec) -> Result<Record<VmSpec>> {
        let desired = desired.with_storage_defaults();
        let policy = self.readiness.apply(desired.wait_policy());
        let request = dispatch::build_server_request(&desired)?;
        info!(
            name = desired.name.as_str(),
            configuration = %request.configuration,
            "Creating server"
        );

        let server = self
            .client
            .create_server(&request)
            .await?
            .ok_or_else(|| LifecycleError::validation("create server returned no response"))?;
        let id = required_field(server.id.as_ref(), KIND, "id")?;
        let cluster = required_field(server.cluster.as_ref(), KIND, "cluster")?;
        transition(KIND, &id, Phase::Created);

        let mut state = normalize(CanonicalState::planned(), RawResponse::from(&server))?;

        if policy.wait {
            transition(KIND, &id, Phase::Waiting);
            let namespace = server.namespace.clone().unwrap_or_default();
            let key = ServerKey::new(&id, namespace, &cluster);
            let key = &key;
            state = poller::wait_until_ready(
                &policy,
                KIND,
                &self.readiness.ready_label,
                state,
                move |prior| self.fetch(key, prior),
            )
            .await?;
        }

        transition(KIND, &id, Phase::Ready);
        Ok(Record::new(desired.with_policy(&policy), state))
    }
}

#[async_trait]
impl<C: ServerApi> Lifecycle for VmLifecycle<C> {
    type Desired = VmSpec;

    fn error_title(&self, operation: Operation) -> &'static str {
        match operation {
            Operation::Create => "Error creating server",
            Operation::Read => "Error getting server",
            Operation::Update => "Error updating server",
            Operation::Delete => "Error deleting server",
        }
    }

    async fn create(&self, desired: VmSpec) -> Result<Record<VmSpec>> {
        let name = desired.name.as_str().to_string();
        let result = self.try_create(desired).await;
        if result.is_err() {
            transition(KIND, &name, Phase::Failed);
        }
        result
    }

    async fn read(&self, record: Record<VmSpec>) -> Result<Outcome<Record<VmSpec>>> {
        let key = Self::key(&record)?;
        debug!(id = %key.id, namespace = %key.namespace, cluster = %key.cluster, "Reading server");

        match self.fetch(&key, record.state.clone()).await {
            Ok(state) => Ok(Outcome::Persist(Record::new(record.desired, state))),
            Err(LifecycleError::NotFound { .. }) => {
                transition(KIND, &key.id, Phase::NotFound);
                Ok(Outcome::Remove)
            }
            Err(e) => {
                transition(KIND, &key.id, Phase::Failed);
                Err(e)
            }
        }
    }

    async fn update(&self, prior: Record<VmSpec>, plan: VmSpec) -> Result<UpdateOutcome<VmSpec>> {
        let plan = plan.with_storage_defaults();
        let unapplied = plan.changed_fields(&prior.desired);
        let policy = plan.wait_policy();
        let plan = plan.with_policy(&policy);
        Ok(accept_plan(KIND, prior, plan, unapplied))
    }

    async fn delete(&self, record: Record<VmSpec>) -> Result<Outcome<Record<VmSpec>>> {
        let key = Self::key(&record)?;
        info!(id = %key.id, namespace = %key.namespace, cluster = %key.cluster, "Deleting server");

        match self.client.destroy_server(&key).await {
            Ok(response) => {
                debug!(?response, "Destroy server response");
                Ok(Outcome::Remove)
            }
            Err(e) => match from_client(e, &key.id) {
                LifecycleError::NotFound { .. } => {
                    transition(KIND, &key.id, Phase::NotFound);
                    Ok(Outcome::Remove)
                }
                err => {
                    transition(KIND, &key.id, Phase::Failed);
                    Err(err)
                }
            },
        }
    }
}
