//! Scripted control-plane client for controller tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use denvr_api::{
    ApplicationApi, ApplicationCommandResult, ApplicationDetails, ApplicationKey,
    ApplicationOverview, ClientError, CreateCatalogApplicationRequest,
    CreateCustomApplicationRequest, CreateServerRequest, InstanceDetails, Result, ServerApi,
    ServerInfo, ServerKey,
};

/// Queue of canned responses for one endpoint.
pub(crate) struct Script<T>(Mutex<VecDeque<Result<Option<T>>>>);

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self(Mutex::new(VecDeque::new()))
    }
}

impl<T> Script<T> {
    pub fn push(&self, response: Result<Option<T>>) {
        self.0.lock().unwrap().push_back(response);
    }

    pub fn ok(&self, value: T) {
        self.push(Ok(Some(value)));
    }

    fn next(&self) -> Result<Option<T>> {
        self.0
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Auth("unscripted call".into())))
    }
}

#[derive(Default)]
pub(crate) struct FakeClient {
    pub calls: Mutex<Vec<&'static str>>,

    pub catalog_created: Script<ApplicationOverview>,
    pub custom_created: Script<ApplicationOverview>,
    pub details: Script<ApplicationDetails>,
    pub app_destroyed: Script<ApplicationCommandResult>,
    pub catalog_requests: Mutex<Vec<CreateCatalogApplicationRequest>>,
    pub custom_requests: Mutex<Vec<CreateCustomApplicationRequest>>,
    pub app_keys: Mutex<Vec<ApplicationKey>>,

    pub server_created: Script<ServerInfo>,
    pub server_gets: Script<ServerInfo>,
    pub server_destroyed: Script<ServerInfo>,
    pub server_requests: Mutex<Vec<CreateServerRequest>>,
    pub server_keys: Mutex<Vec<ServerKey>>,
}

impl FakeClient {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Script one details response with the given instance status.
    pub fn details_with_status(&self, id: &str, status: Option<&str>) {
        self.details.ok(ApplicationDetails {
            instance_details: Some(InstanceDetails {
                id: Some(id.to_string()),
                cluster: Some("Msc1".into()),
                status: status.map(String::from),
                ..Default::default()
            }),
        });
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ApplicationApi for FakeClient {
    async fn create_catalog_application(
        &self,
        request: &CreateCatalogApplicationRequest,
    ) -> Result<Option<ApplicationOverview>> {
        self.record("create_catalog_application");
        self.catalog_requests.lock().unwrap().push(request.clone());
        self.catalog_created.next()
    }

    async fn create_custom_application(
        &self,
        request: &CreateCustomApplicationRequest,
    ) -> Result<Option<ApplicationOverview>> {
        self.record("create_custom_application");
        self.custom_requests.lock().unwrap().push(request.clone());
        self.custom_created.next()
    }

    async fn get_application_details(
        &self,
        key: &ApplicationKey,
    ) -> Result<Option<ApplicationDetails>> {
        self.record("get_application_details");
        self.app_keys.lock().unwrap().push(key.clone());
        self.details.next()
    }

    async fn destroy_application(
        &self,
        key: &ApplicationKey,
    ) -> Result<Option<ApplicationCommandResult>> {
        self.record("destroy_application");
        self.app_keys.lock().unwrap().push(key.clone());
        self.app_destroyed.next()
    }
}

#[async_trait]
impl ServerApi for FakeClient {
    async fn create_server(&self, request: &CreateServerRequest) -> Result<Option<ServerInfo>> {
        self.record("create_server");
        self.server_requests.lock().unwrap().push(request.clone());
        self.server_created.next()
    }

    async fn get_server(&self, key: &ServerKey) -> Result<Option<ServerInfo>> {
        self.record("get_server");
        self.server_keys.lock().unwrap().push(key.clone());
        self.server_gets.next()
    }

    async fn destroy_server(&self, key: &ServerKey) -> Result<Option<ServerInfo>> {
        self.record("destroy_server");
        self.server_keys.lock().unwrap().push(key.clone());
        self.server_destroyed.next()
    }
}
