//! Recording transport used by unit tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::api::{ApiClient, ApiError, ApiRequest, ApiResponse, SessionStore, Transport};

/// Canned responses keyed by `"METHOD path"`; unknown routes answer 404
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<HashMap<String, ApiResponse>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, route: &str, status: u16, body: Value) -> Self {
        self.set(route, ApiResponse::new(status, Some(body)));
        self
    }

    pub fn respond_empty(self, route: &str, status: u16) -> Self {
        self.set(route, ApiResponse::new(status, None));
        self
    }

    pub fn set(&self, route: &str, response: ApiResponse) {
        self.routes.lock().unwrap().insert(route.to_string(), response);
    }

    /// Client over this transport with a fresh in-memory session
    pub fn client(&self) -> ApiClient {
        ApiClient::new(Arc::new(self.clone()), SessionStore::in_memory())
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let key = format!("{} {}", request.method, request.path);
        self.requests.lock().unwrap().push(request);

        Ok(self
            .routes
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| ApiResponse::new(404, None)))
    }
}
