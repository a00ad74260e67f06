//! Authenticated HTTP client for the catalog API

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{ApiError, SessionStore};
use crate::config::Config;
use crate::models::{Record, RecordId};

/// A request as handed to the transport, after the bearer token is resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base address, e.g. `Acteurs/3`
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

/// Raw response: status code plus the decoded body, if any
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// String field from a JSON object body
    pub fn field(&self, name: &str) -> Option<&str> {
        self.body.as_ref()?.get(name)?.as_str()
    }

    /// Decode a body that is not necessarily JSON
    fn from_text(status: u16, text: &str) -> Self {
        let body = if text.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
        };
        Self { status, body }
    }
}

/// Anything that can carry an [`ApiRequest`] to the server
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Production transport over reqwest
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(&config.http.user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = join_url(&self.base_url, &request.path);

        let mut builder = self.client.request(request.method, &url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        Ok(ApiResponse::from_text(status, &text))
    }
}

/// Join a base address and a relative path with exactly one slash
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Verb-shaped operations against one base address.
///
/// The current session token is read before every request and attached as a
/// bearer credential when present. Non-2xx responses become
/// [`ApiError::Status`]; nothing is retried or cached.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionStore,
}

impl ApiClient {
    /// Client over reqwest with the session file named in the config
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config)?;
        let session = SessionStore::open(&config.session_path);
        Ok(Self::new(Arc::new(transport), session))
    }

    pub fn new(transport: Arc<dyn Transport>, session: SessionStore) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// `GET {path}` returning every record of one entity type
    pub async fn read_collection(&self, path: &str) -> Result<Vec<Record>, ApiError> {
        let response = self.send(Method::GET, path.to_string(), None).await?;

        let items = match response.body {
            Some(Value::Array(items)) => items,
            None => Vec::new(),
            Some(_) => return Err(ApiError::UnexpectedBody { expected: "array" }),
        };

        let total = items.len();
        let records: Vec<Record> = items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(record) => Some(record),
                _ => None,
            })
            .collect();

        if records.len() != total {
            warn!(
                "Dropped {} non-object entries from {}",
                total - records.len(),
                path
            );
        }

        Ok(records)
    }

    /// `GET {path}/{id}`
    pub async fn read_one(&self, path: &str, id: RecordId) -> Result<Record, ApiError> {
        let response = self.send(Method::GET, item_path(path, id), None).await?;
        match response.body {
            Some(Value::Object(record)) => Ok(record),
            _ => Err(ApiError::UnexpectedBody { expected: "object" }),
        }
    }

    /// `POST {path}`
    pub async fn create(&self, path: &str, body: &Value) -> Result<ApiResponse, ApiError> {
        self.send(Method::POST, path.to_string(), Some(body.clone())).await
    }

    /// `PUT {path}/{id}`
    pub async fn update(
        &self,
        path: &str,
        id: RecordId,
        body: &Value,
    ) -> Result<ApiResponse, ApiError> {
        self.send(Method::PUT, item_path(path, id), Some(body.clone())).await
    }

    /// `DELETE {path}/{id}`
    pub async fn delete(&self, path: &str, id: RecordId) -> Result<ApiResponse, ApiError> {
        self.send(Method::DELETE, item_path(path, id), None).await
    }

    /// Plain `POST` for non-resource endpoints such as the account routes
    pub async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, ApiError> {
        self.send(Method::POST, path.to_string(), Some(body.clone())).await
    }

    async fn send(
        &self,
        method: Method,
        path: String,
        body: Option<Value>,
    ) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest {
            method,
            path,
            bearer: self.session.token(),
            body,
        };

        debug!(
            "{} {} (authenticated: {})",
            request.method,
            request.path,
            request.bearer.is_some()
        );

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let message = response.field("message").map(str::to_string);
            return Err(ApiError::Status {
                status: response.status,
                message,
            });
        }

        Ok(response)
    }
}

fn item_path(path: &str, id: RecordId) -> String {
    format!("{}/{}", path.trim_end_matches('/'), id)
}
