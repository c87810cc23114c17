//!
//! alumnae HTTP client
//! -------------------
//! One request path for every call the app makes to the backend:
//! - the bearer token is read from durable storage right before dispatch and attached when present;
//! - every call is bounded by the configured timeout;
//! - a 401 drops the stored token and signs the attached session out, then the error is returned;
//! - no retries, no backoff, no response caching.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::api::{LOGIN_PATH, REGISTER_PATH};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionContext;
use crate::storage::{KeyValueStore, TokenStore};

pub type QueryParams = BTreeMap<String, String>;

/// Routes whose 401 means "these credentials are wrong", not "the stored token expired".
const CREDENTIAL_EXCHANGE_PATHS: [&str; 2] = [LOGIN_PATH, REGISTER_PATH];

/// Status and parsed body of a 2xx response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// Decode the whole body.
    pub fn json<T: DeserializeOwned>(self) -> ClientResult<T> {
        serde_json::from_value(self.body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Decode the `data` member of the `{ "data": ... }` envelope, or the whole body when
    /// the backend did not wrap it.
    pub fn data<T: DeserializeOwned>(self) -> ClientResult<T> {
        let inner = match self.body {
            Value::Object(mut m) if m.contains_key("data") => m.remove("data").unwrap_or(Value::Null),
            other => other,
        };
        serde_json::from_value(inner).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
    timeout: Duration,
    tokens: TokenStore,
    session: Option<Arc<SessionContext>>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, store: Arc<dyn KeyValueStore>) -> ClientResult<Self> {
        let base = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::Config(format!("invalid base URL '{}': {}", config.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::Config(format!("base URL '{}' cannot carry paths", config.base_url)));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base,
            http,
            timeout: config.timeout,
            tokens: TokenStore::new(store, config.token_key.as_str()),
            session: None,
        })
    }

    /// Report credential expiry to `session` from now on.
    pub fn with_session(mut self, session: Arc<SessionContext>) -> Self {
        self.session = Some(session);
        self
    }

    /// Durable token slot this client reads before each request.
    pub fn tokens(&self) -> &TokenStore { &self.tokens }

    fn url_for(&self, path: &str) -> ClientResult<Url> {
        let base = self.base.as_str().trim_end_matches('/');
        let joined = if path.starts_with('/') { format!("{}{}", base, path) } else { format!("{}/{}", base, path) };
        Url::parse(&joined).map_err(|e| ClientError::Config(format!("invalid request path '{}': {}", path, e)))
    }

    fn current_token(&self) -> Option<String> {
        match self.tokens.get() {
            Ok(t) => t,
            Err(e) => {
                warn!("token read failed, sending request without credentials: {}", e);
                None
            }
        }
    }

    /// Send one request. `path` is relative to the configured base URL.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: Option<&QueryParams>,
    ) -> ClientResult<ApiResponse> {
        let url = self.url_for(path)?;
        let mut req = self.http.request(method.clone(), url).header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            req = req.query(q);
        }
        if let Some(b) = body {
            req = req.json(b);
        }
        let sent = self.current_token();
        if let Some(token) = &sent {
            req = req.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        debug!(%method, path, "dispatching request");
        let resp = req.send().await.map_err(|e| self.transport_error(e))?;
        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(|e| self.transport_error(e))?;
        let body = parse_body(&text);

        if (200..300).contains(&status) {
            debug!(%method, path, status, "request succeeded");
            return Ok(ApiResponse { status, body });
        }

        let err = ClientError::from_status(status, body);
        if status == 401 && !CREDENTIAL_EXCHANGE_PATHS.contains(&path) {
            self.invalidate(path, sent.as_deref());
        } else {
            debug!(%method, path, status, "request rejected: {}", err);
        }
        Err(err)
    }

    pub async fn get(&self, path: &str) -> ClientResult<ApiResponse> {
        self.send(Method::GET, path, None, None).await
    }

    pub async fn get_with_query(&self, path: &str, query: &QueryParams) -> ClientResult<ApiResponse> {
        self.send(Method::GET, path, None, Some(query)).await
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> ClientResult<ApiResponse> {
        self.send(Method::POST, path, body, None).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> ClientResult<ApiResponse> {
        self.send(Method::PATCH, path, Some(body), None).await
    }

    /// Central 401 handling: `sent` is dead, in storage and in the session. A token that was
    /// replaced while the request was in flight is left alone.
    fn invalidate(&self, path: &str, sent: Option<&str>) {
        let Some(token) = sent else {
            debug!(path, "401 for a request sent without credentials");
            return;
        };
        match self.tokens.clear_if(token) {
            Ok(true) => info!(path, "401 from backend, dropped stored token"),
            Ok(false) => debug!(path, "401 for a token that has since been replaced"),
            Err(e) => error!("failed to clear stored token after 401: {}", e),
        }
        if let Some(session) = &self.session {
            session.expire(token);
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            warn!("request timed out after {}ms", self.timeout.as_millis());
            ClientError::Timeout(self.timeout)
        } else {
            warn!("request failed without a response: {}", e);
            ClientError::Network(e.to_string())
        }
    }
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
