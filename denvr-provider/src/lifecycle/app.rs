//! Application lifecycle controller.

use std::sync::Arc;

use async_trait::async_trait;
use denvr_api::{ApplicationApi, ApplicationKey};
use tracing::{debug, info};

use super::{
    Lifecycle, Operation, Outcome, Phase, Readiness, UpdateOutcome, accept_plan, from_client,
    required_field, transition,
};
use crate::dispatch::{self, CreationRequest};
use crate::error::{LifecycleError, Result};
use crate::model::{AppSpec, CanonicalState, Record};
use crate::normalize::{RawResponse, normalize};
use crate::poller;

const KIND: &str = "application";

/// Controller for managed applications.
pub struct AppLifecycle<C> {
    client: Arc<C>,
    readiness: Readiness,
}

impl<C: ApplicationApi> AppLifecycle<C> {
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

    /// Query details for `key` and fold them onto `prior`.
    async fn fetch(&self, key: &ApplicationKey, prior: CanonicalState) -> Result<CanonicalState> {
        let details = self
            .client
            .get_application_details(key)
            .await
            .map_err(|e| from_client(e, &key.id))?
            .ok_or_else(|| {
                LifecycleError::validation(format!("no details returned for application {:?}", key.id))
            })?;
        if details.instance_details.is_none() {
            return Err(LifecycleError::validation(format!(
                "details for application {:?} have no instance block",
                key.id
            )));
        }
        normalize(prior, RawResponse::from(&details))
    }

    fn key(record: &Record<AppSpec>) -> Result<ApplicationKey> {
        let id = record.state.id();
        if id.is_empty() {
            return Err(LifecycleError::validation("application record has no id"));
        }
        let cluster = match record.state.cluster.as_str() {
            "" => record.desired.cluster.as_str(),
            cluster => cluster,
        };
        Ok(ApplicationKey::new(id, cluster))
    }

    async fn try_create(&self, desired: AppSpec) -> Result<Record<AppSpec>> {
        let policy = self.readiness.apply(desired.wait_policy());
        let request = dispatch::build_application_request(&desired)?;
        info!(
            name = desired.name.as_str(),
            strategy = ?request.strategy(),
            "Creating application"
        );

        let response = match &request {
            CreationRequest::Catalog(body) => self.client.create_catalog_application(body).await?,
            CreationRequest::Custom(body) => self.client.create_custom_application(body).await?,
        };
        let overview = response
            .ok_or_else(|| LifecycleError::validation("create application returned no response"))?;
        let id = required_field(overview.id.as_ref(), KIND, "id")?;
        let cluster = required_field(overview.cluster.as_ref(), KIND, "cluster")?;
        transition(KIND, &id, Phase::Created);

        let mut state = normalize(CanonicalState::planned(), RawResponse::from(&overview))?;

        if policy.wait {
            transition(KIND, &id, Phase::Waiting);
            let key = ApplicationKey::new(&id, &cluster);
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
impl<C: ApplicationApi> Lifecycle for AppLifecycle<C> {
    type Desired = AppSpec;

    fn error_title(&self, operation: Operation) -> &'static str {
        match operation {
            Operation::Create => "Error creating application",
            Operation::Read => "Error getting application",
            Operation::Update => "Error updating application",
            Operation::Delete => "Error deleting application",
        }
    }

    async fn create(&self, desired: AppSpec) -> Result<Record<AppSpec>> {
        let name = desired.name.as_str().to_string();
        let result = self.try_create(desired).await;
        if result.is_err() {
            transition(KIND, &name, Phase::Failed);
        }
        result
    }

    async fn read(&self, record: Record<AppSpec>) -> Result<Outcome<Record<AppSpec>>> {
        let key = Self::key(&record)?;
        debug!(id = %key.id, cluster = %key.cluster, "Reading application");

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

    async fn update(
        &self,
        prior: Record<AppSpec>,
        plan: AppSpec,
    ) -> Result<UpdateOutcome<AppSpec>> {
        let unapplied = plan.changed_fields(&prior.desired);
        let policy = plan.wait_policy();
        let plan = plan.with_policy(&policy);
        Ok(accept_plan(KIND, prior, plan, unapplied))
    }

    async fn delete(&self, record: Record<AppSpec>) -> Result<Outcome<Record<AppSpec>>> {
        let key = Self::key(&record)?;
        info!(id = %key.id, cluster = %key.cluster, "Deleting application");

        match self.client.destroy_application(&key).await {
            Ok(response) => {
                debug!(?response, "Destroy application response");
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
