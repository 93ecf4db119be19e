use async_trait::async_trait;
use reqwest::{header, Client, Method};
use serde_json::Value;
use tracing::{debug, error, info};

use super::error::SoarApiError;
use crate::config::SoarConfig;

/// A fully resolved call against the SOAR REST API.
///
/// `path` is relative to `<base>/rest` and already has every template
/// placeholder substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct SoarRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl SoarRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// Anything that can execute a [`SoarRequest`].
///
/// The dispatcher only talks to this trait; [`SoarClient`] is the real
/// implementation.
#[async_trait]
pub trait SoarApi: Send + Sync {
    async fn call(&self, request: SoarRequest) -> Result<Value, SoarApiError>;
}

#[derive(Debug, Clone)]
pub struct SoarClient {
    client: Client,
    config: SoarConfig,
}

impl SoarClient {
    pub fn new(config: &SoarConfig) -> Result<Self, SoarApiError> {
        debug!(
            base_url = %config.base_url,
            verify_ssl = %config.verify_ssl,
            timeout_secs = config.timeout.as_secs(),
            "Creating new SoarClient"
        );

        let client = Client::builder()
            .danger_accept_invalid_certs(!config.verify_ssl)
            .timeout(config.timeout)
            .user_agent(concat!("mcp-server-splunk-soar/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SoarApiError::HttpClientCreationError)?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn classify(&self, e: reqwest::Error) -> SoarApiError {
        if e.is_timeout() {
            SoarApiError::TimeoutError(self.config.timeout.as_secs())
        } else {
            SoarApiError::NetworkError(e.to_string())
        }
    }
}

#[async_trait]
impl SoarApi for SoarClient {
    async fn call(&self, request: SoarRequest) -> Result<Value, SoarApiError> {
        let url = self.config.rest_url(&request.path);
        info!(method = %request.method, path = %request.path, "Calling SOAR API");

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .bearer_auth(&self.config.token)
            .header("ph-auth-token", &self.config.token)
            .header(header::ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!(path = %request.path, "SOAR request failed: {}", e);
            self.classify(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            error!(
                path = %request.path,
                status = status.as_u16(),
                "SOAR API returned an error status"
            );
            return Err(SoarApiError::HttpError {
                status_code: status.as_u16(),
                body: text,
            });
        }

        debug!(path = %request.path, bytes = text.len(), "SOAR API call succeeded");

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}
