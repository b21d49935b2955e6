//! REST implementation of the client traits.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::applications::{
    ApplicationApi, ApplicationCommandResult, ApplicationDetails, ApplicationKey,
    ApplicationOverview, CreateCatalogApplicationRequest, CreateCustomApplicationRequest,
};
use crate::config::{ConfigError, Credentials, DenvrConfig};
use crate::error::{ClientError, Result};
use crate::servers::{CreateServerRequest, ServerApi, ServerInfo, ServerKey};

const AUTHENTICATE_PATH: &str = "/api/TokenAuth/Authenticate";
const SERVERS_PATH: &str = "/api/v1/servers/virtual";
const APPLICATIONS_PATH: &str = "/api/v1/servers/applications";

/// Refresh the token this long before the server says it expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Success envelope: `{"result": ...}`.
#[derive(Deserialize)]
struct Envelope<T> {
    result: Option<T>,
}

/// Error envelope: `{"error": {"message": ...}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateRequest<'a> {
    user_name_or_email_address: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateResult {
    access_token: String,
    expire_in_seconds: Option<u64>,
}

struct Token {
    access: String,
    expires_at: Option<Instant>,
}

impl Token {
    fn is_fresh(&self) -> bool {
        self.expires_at
            .map(|at| Instant::now() + TOKEN_EXPIRY_MARGIN < at)
            .unwrap_or(true)
    }
}

/// HTTP client for the Denvr Cloud API.
///
/// Authenticates lazily on the first call and caches the bearer token until
/// it is about to expire.
pub struct HttpClient {
    http: reqwest::Client,
    server: String,
    credentials: Credentials,
    token: RwLock<Option<Token>>,
}

impl HttpClient {
    pub fn new(config: DenvrConfig) -> Result<Self> {
        let server = config.server().to_string();
        let credentials = config
            .credentials
            .ok_or(ClientError::Config(ConfigError::MissingCredentials))?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            server,
            credentials,
            token: RwLock::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server, path)
    }

    /// Current bearer token, authenticating if needed.
    async fn token(&self) -> Result<String> {
        {
            let token = self.token.read().await;
            if let Some(t) = token.as_ref().filter(|t| t.is_fresh()) {
                return Ok(t.access.clone());
            }
        }

        let mut token = self.token.write().await;
        if let Some(t) = token.as_ref().filter(|t| t.is_fresh()) {
            return Ok(t.access.clone());
        }

        debug!(server = %self.server, user = %self.credentials.username, "Authenticating");
        let response = self
            .http
            .post(self.url(AUTHENTICATE_PATH))
            .json(&AuthenticateRequest {
                user_name_or_email_address: &self.credentials.username,
                password: &self.credentials.password,
            })
            .send()
            .await?;

        let result: AuthenticateResult = match decode(response).await {
            Ok(Some(result)) => result,
            Ok(None) => return Err(ClientError::Auth("empty token response".to_string())),
            Err(ClientError::Api { status, message }) => {
                return Err(ClientError::Auth(format!("{}: {}", status, message)));
            }
            Err(e) => return Err(e),
        };

        let access = result.access_token.clone();
        *token = Some(Token {
            access: result.access_token,
            expires_at: result
                .expire_in_seconds
                .and_then(|secs| Instant::now().checked_add(Duration::from_secs(secs))),
        });
        Ok(access)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>> {
        let token = self.token().await?;
        let response = request.bearer_auth(token).send().await?;
        decode(response).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>> {
        debug!(path, "POST");
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    async fn get<Q: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Option<T>> {
        debug!(path, "GET");
        self.send(self.http.get(self.url(path)).query(query)).await
    }

    async fn delete<Q: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Option<T>> {
        debug!(path, "DELETE");
        self.send(self.http.delete(self.url(path)).query(query))
            .await
    }
}

/// Unwrap the result envelope, or turn an error envelope into
/// [`ClientError::Api`].
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<Option<T>> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorEnvelope>(&body)
            .ok()
            .and_then(|e| e.error.message)
            .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
        return Err(ClientError::Api { status, message });
    }

    let envelope: Envelope<T> = serde_json::from_slice(&body)?;
    Ok(envelope.result)
}

#[async_trait]
impl ServerApi for HttpClient {
    async fn create_server(&self, request: &CreateServerRequest) -> Result<Option<ServerInfo>> {
        self.post(&format!("{}/CreateServer", SERVERS_PATH), request)
            .await
    }

    async fn get_server(&self, key: &ServerKey) -> Result<Option<ServerInfo>> {
        self.get(&format!("{}/GetServer", SERVERS_PATH), key)
            .await
            .map_err(|e| e.classify(&key.id))
    }

    async fn destroy_server(&self, key: &ServerKey) -> Result<Option<ServerInfo>> {
        self.delete(&format!("{}/DestroyServer", SERVERS_PATH), key)
            .await
            .map_err(|e| e.classify(&key.id))
    }
}

#[async_trait]
impl ApplicationApi for HttpClient {
    async fn create_catalog_application(
        &self,
        request: &CreateCatalogApplicationRequest,
    ) -> Result<Option<ApplicationOverview>> {
        self.post(
            &format!("{}/CreateCatalogApplication", APPLICATIONS_PATH),
            request,
        )
        .await
    }

    async fn create_custom_application(
        &self,
        request: &CreateCustomApplicationRequest,
    ) -> Result<Option<ApplicationOverview>> {
        self.post(
            &format!("{}/CreateCustomApplication", APPLICATIONS_PATH),
            request,
        )
        .await
    }

    async fn get_application_details(
        &self,
        key: &ApplicationKey,
    ) -> Result<Option<ApplicationDetails>> {
        self.get(&format!("{}/GetApplicationDetails", APPLICATIONS_PATH), key)
            .await
            .map_err(|e| e.classify(&key.id))
    }

    async fn destroy_application(
        &self,
        key: &ApplicationKey,
    ) -> Result<Option<ApplicationCommandResult>> {
        self.delete(&format!("{}/DestroyApplication", APPLICATIONS_PATH), key)
            .await
            .map_err(|e| e.classify(&key.id))
    }
}
