//! HTTP transport
//!
//! The engine performs every exchange through the [`Transport`] trait so the
//! request loop does not depend on a concrete HTTP stack. [`ReqwestTransport`]
//! is the production implementation.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION};
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

/// A single GET exchange to perform
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Absolute request URL
    pub url: Url,
    /// Value of the `Accept` header
    pub accept: String,
    /// Bearer token, when the target is the API's own host
    pub bearer: Option<String>,
}

impl TransportRequest {
    /// Create a request without authorization
    pub fn new(url: Url, accept: impl Into<String>) -> Self {
        Self {
            url,
            accept: accept.into(),
            bearer: None,
        }
    }

    /// Attach a bearer token
    #[must_use]
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// The raw result of an exchange
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Full response body
    pub body: Bytes,
}

impl TransportResponse {
    /// Create a response with empty headers
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Look up a header as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Canonical status text, e.g. "Not Found"
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown Status")
    }
}

/// Capability to perform HTTP GET exchanges.
///
/// Implementations must not follow redirects; the engine does that itself so
/// each hop is admitted, accounted and cached.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the exchange and read the full body
    async fn get(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// Transport backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with the given timeout and user agent
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(Policy::none())
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client. It should be built with `Policy::none()`.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut req = self
            .client
            .get(request.url.clone())
            .header(ACCEPT, request.accept.as_str());
        if let Some(token) = &request.bearer {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = req.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// Whether two URLs address the same host and port.
///
/// Decides both bearer scoping and cache eligibility.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(ha), Some(hb)) => {
            ha.eq_ignore_ascii_case(hb) && a.port_or_known_default() == b.port_or_known_default()
        }
        _ => false,
    }
}

/// Build the default transport, mapping build failures to config errors
pub(crate) fn default_transport(timeout: Duration, user_agent: &str) -> Result<ReqwestTransport> {
    ReqwestTransport::new(timeout, user_agent)
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))
}
