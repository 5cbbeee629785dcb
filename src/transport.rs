//! HTTP transport used by provider adapters.
//!
//! Adapters describe a call as an [`HttpRequest`] and get back the raw
//! [`HttpResponse`]. Status vocabularies, error strings and JSON shapes are
//! the adapter's business; the transport only moves bytes, injects
//! credentials and retries transient failures.

use crate::errors::RetryableError;
use crate::utils::retry::RetryConfig;
use backon::Retryable;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use secrecy::{ExposeSecret, SecretString};
use std::future::Future;
use thiserror::Error;
use url::Url;

#[cfg(feature = "tracing")]
use tracing::debug;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Credentials attached to a request.
#[derive(Debug, Clone)]
pub enum Auth {
    /// `Authorization: Bearer <token>` header.
    Bearer(SecretString),
    /// Query parameter carrying the key, e.g. `key=<token>`.
    Query {
        name: &'static str,
        value: SecretString,
    },
}

/// One HTTP call as described by an adapter.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub auth: Option<Auth>,
}

impl HttpRequest {
    /// Start a GET request.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            params: Vec::new(),
            headers: Vec::new(),
            auth: None,
        }
    }

    /// Append a query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    /// Append a query parameter only when `value` is present.
    pub fn optional_param<V: ToString>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(name, value),
            None => self,
        }
    }

    /// Append a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach credentials.
    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Final URL with parameters and query credentials applied.
    pub fn resolved_url(&self) -> Result<Url, TransportError> {
        let mut pairs: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        if let Some(Auth::Query { name, value }) = &self.auth {
            pairs.push((*name, value.expose_secret()));
        }

        let mut url = self.url.clone();
        if !pairs.is_empty() {
            let query = serde_urlencoded::to_string(&pairs).map_err(TransportError::BuildRequestUrl)?;
            url.set_query(Some(&query));
        }
        Ok(url)
    }
}

/// Status and body of a completed HTTP call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for 401 and 403.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, 401 | 403)
    }
}

/// Failure to complete an HTTP call.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to build HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// Error encoding request parameters.
    #[error("Error building request URL: {0}")]
    BuildRequestUrl(#[source] serde_urlencoded::ser::Error),

    /// Failed to send HTTP request.
    #[error("Failed to send HTTP request: {0}")]
    HttpRequest(#[from] reqwest_middleware::Error),

    /// Failed to read the response body.
    #[error("Failed to read response body: {0}")]
    ReadBody(#[source] reqwest::Error),

    /// The server answered with a 5xx status.
    #[error("Server error {status}: {body}")]
    Server { status: u16, body: String },
}

impl RetryableError for TransportError {
    fn is_retryable(&self) -> bool {
        match self {
            TransportError::HttpRequest(reqwest_middleware::Error::Reqwest(e)) => {
                e.is_connect() || e.is_timeout() || e.is_request()
            }
            TransportError::Server { .. } => true,
            TransportError::HttpRequest(reqwest_middleware::Error::Middleware(_))
            | TransportError::BuildHttpClient(_)
            | TransportError::BuildRequestUrl(_)
            | TransportError::ReadBody(_) => false,
        }
    }
}

/// Capability to perform one HTTP call.
///
/// Implementations must be safe to share between concurrently running
/// orders.
pub trait Transport: Send + Sync {
    /// Send `request` and return the response, or the failure that remained
    /// after any low-level retries.
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// [`Transport`] backed by a pooled reqwest client.
///
/// Clones share the same connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    client: ClientWithMiddleware,
    retry_config: RetryConfig,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("retry_config", &self.retry_config)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a transport with a fresh connection pool and default retries.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(TransportError::BuildHttpClient)?;
        Ok(Self::with_client(ClientBuilder::new(client).build()))
    }

    /// Create a transport around an existing client with middleware.
    pub fn with_client(client: ClientWithMiddleware) -> Self {
        Self {
            client,
            retry_config: RetryConfig::default(),
        }
    }

    /// Replace the retry configuration.
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Get reference to the retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    async fn send_once(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.resolved_url()?;
        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(Auth::Bearer(token)) = &request.auth {
            builder = builder.bearer_auth(token.expose_secret());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(TransportError::ReadBody)?;

        if status >= 500 {
            return Err(TransportError::Server { status, body });
        }
        Ok(HttpResponse { status, body })
    }
}

impl Transport for HttpTransport {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "HttpTransport::send",
            skip_all,
            fields(path = %request.url.path())
        )
    )]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let request = &request;
        (|| self.send_once(request))
            .retry(self.retry_config.build_strategy())
            .when(|err: &TransportError| err.is_retryable())
            .notify(|err, duration| {
                let _ = (err, duration);
                #[cfg(feature = "tracing")]
                debug!(
                    error = %err,
                    retry_after_ms = %duration.as_millis(),
                    "Retrying request after transient failure"
                );
            })
            .await
    }
}
