//! Request engine
//!
//! [`CanvasClient`] runs one logical call at a time per future: it serializes
//! the parameters, admits each exchange through the shared [`QuotaTracker`],
//! follows redirects, caches raw bodies, decodes each page and hands it to the
//! caller, then follows the `rel="next"` link until there is none.
//!
//! Pages of one call are fetched strictly in sequence. Nothing is retried: a
//! transport error, a non-success status, a decode failure or a callback
//! error ends the call. Quota accounting still runs on those paths.

mod types;

pub use types::{RawResponse, RequestStats};

use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::{essence, ResponseCache, REDIRECT_TYPE};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{
    default_transport, parse_remaining, same_host, QuotaTracker, Transport, TransportRequest,
    TransportResponse, RATE_LIMIT_REMAINING,
};
use crate::pagination::{last_page_hint, next_link};
use crate::params::{ParameterSerializer, Params};

/// `Accept` value for API calls
pub const JSON: &str = "application/json";

/// Client for the Canvas REST API
pub struct CanvasClient {
    config: ClientConfig,
    api_base: Url,
    transport: Arc<dyn Transport>,
    quota: QuotaTracker,
    parameters: ParameterSerializer,
    cache: Option<ResponseCache>,
}

impl CanvasClient {
    /// Create a client using the default `reqwest` transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = default_transport(config.timeout, &config.user_agent)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client on top of a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let api_base = config.api_base()?;
        let cache = config
            .cache_dir
            .as_ref()
            .map(|root| ResponseCache::new(root, &api_base));
        let quota = QuotaTracker::new(config.quota);

        Ok(Self {
            config,
            api_base,
            transport,
            quota,
            parameters: ParameterSerializer::new(),
            cache,
        })
    }

    /// Share a quota tracker with other clients talking to the same account
    #[must_use]
    pub fn with_quota_tracker(mut self, quota: QuotaTracker) -> Self {
        self.quota = quota;
        self
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The effective API base URL
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Get the quota tracker
    pub fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    /// Parameter rules; register custom rules here
    pub fn parameters(&self) -> &ParameterSerializer {
        &self.parameters
    }

    /// Get the response cache, if enabled
    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    /// Build the initial URL for an endpoint and its parameters
    pub fn endpoint_url(&self, endpoint: &str, params: &Params) -> Result<Url> {
        let mut url = self.api_base.join(endpoint.trim_start_matches('/'))?;
        let query = self.parameters.serialize_all(params)?;
        if !query.is_empty() {
            url.set_query(Some(&query));
        }
        Ok(url)
    }

    /// Fetch every page of `endpoint`, decoding each into `T` and passing it
    /// to `on_page`.
    ///
    /// An error from `on_page` stops the call before the next page is
    /// requested and is returned as [`Error::Callback`].
    pub async fn request<T, F, E>(
        &self,
        endpoint: &str,
        params: &Params,
        mut on_page: F,
    ) -> Result<RequestStats>
    where
        T: DeserializeOwned,
        F: FnMut(T) -> std::result::Result<(), E>,
        E: Into<anyhow::Error>,
    {
        let mut url = self.endpoint_url(endpoint, params)?;
        let mut stats = RequestStats::new();
        info!("Requesting {endpoint}");

        loop {
            let mut raw = self.fetch(url, JSON).await?;
            stats.add_response(&mut raw);

            let page: T = decode(&raw)?;
            stats.add_page();
            on_page(page).map_err(Error::callback)?;

            let links = raw.header("link").unwrap_or_default();
            if stats.pages == 1 {
                stats.expected_pages = last_page_hint(links);
            }
            debug!(
                "Page {}{} of {endpoint} done",
                stats.pages,
                stats
                    .expected_pages
                    .map(|n| format!("/{n}"))
                    .unwrap_or_default()
            );

            match next_link(links) {
                Some(next) => url = raw.url.join(&next)?,
                None => break,
            }
        }

        if !stats.cache_errors.is_empty() {
            warn!(
                "{endpoint}: {} cache write(s) failed",
                stats.cache_errors.len()
            );
        }
        Ok(stats)
    }

    /// Fetch every page of an array endpoint into one `Vec`
    pub async fn collect<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &Params,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        self.request(endpoint, params, |page: Vec<T>| -> anyhow::Result<()> {
            items.extend(page);
            Ok(())
        })
        .await?;
        Ok(items)
    }

    /// Fetch a single, unpaginated object
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &Params) -> Result<T> {
        let url = self.endpoint_url(endpoint, params)?;
        let raw = self.fetch(url, JSON).await?;
        decode(&raw)
    }

    /// Perform one exchange with an arbitrary `Accept` value, following
    /// redirects. Used for file downloads and non-JSON resources.
    pub async fn fetch_raw(&self, url: &str, accept: &str) -> Result<RawResponse> {
        let url = self.api_base.join(url)?;
        self.fetch(url, accept).await
    }

    async fn fetch(&self, url: Url, accept: &str) -> Result<RawResponse> {
        let origin = url.to_string();
        let mut current = url;
        let mut hops: Vec<(Url, Url)> = Vec::new();
        let mut cache_errors = Vec::new();

        loop {
            let response = self.exchange(&current, accept).await?;
            let status = response.status;

            if status.is_success() {
                // Redirect records are only written once the chain resolves.
                let record_type = format!("{accept}+{REDIRECT_TYPE}");
                for (from, to) in &hops {
                    let target = to.as_str().as_bytes();
                    self.cache_body(from, &record_type, target, &mut cache_errors)
                        .await;
                }
                let content_type = response
                    .header("content-type")
                    .map(essence)
                    .filter(|ct| !ct.is_empty())
                    .unwrap_or(accept)
                    .to_string();
                let cache_path = self
                    .cache_body(&current, &content_type, &response.body, &mut cache_errors)
                    .await;
                return Ok(RawResponse {
                    url: current,
                    status,
                    headers: response.headers,
                    body: response.body,
                    redirects: hops.len(),
                    cache_path,
                    cache_errors,
                });
            }

            if status.is_redirection() {
                let Some(location) = response.header("location") else {
                    return Err(Error::MissingRedirectLocation {
                        url: current.to_string(),
                    });
                };
                if hops.len() >= self.config.max_redirects as usize {
                    return Err(Error::TooManyRedirects {
                        url: origin,
                        limit: self.config.max_redirects,
                    });
                }
                let target = current.join(location)?;
                debug!("Following redirect {current} -> {target}");
                hops.push((current, target.clone()));
                current = target;
                continue;
            }

            return Err(Error::http_status(
                current.as_str(),
                status.as_u16(),
                response.status_text(),
                String::from_utf8_lossy(&response.body),
            ));
        }
    }

    /// Admit, perform and account for a single HTTP exchange
    async fn exchange(&self, url: &Url, accept: &str) -> Result<TransportResponse> {
        let admission = self.quota.admit().await;

        let mut request = TransportRequest::new(url.clone(), accept);
        if same_host(url, &self.api_base) {
            request = request.bearer(&self.config.token);
        }
        debug!("GET {url}");
        let result = self.transport.get(request).await;

        let observed = result
            .as_ref()
            .ok()
            .and_then(|response| response.header(RATE_LIMIT_REMAINING))
            .and_then(parse_remaining);
        admission.release(observed);
        result
    }

    async fn cache_body(
        &self,
        url: &Url,
        content_type: &str,
        body: &[u8],
        errors: &mut Vec<Error>,
    ) -> Option<PathBuf> {
        let cache = self.cache.as_ref()?;
        match cache.store(url, content_type, body).await {
            Ok(path) => path,
            Err(err) => {
                warn!("Failed to cache response for {url}: {err}");
                errors.push(err);
                None
            }
        }
    }
}

impl std::fmt::Debug for CanvasClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasClient")
            .field("config", &self.config)
            .field("api_base", &self.api_base.as_str())
            .field("quota", &self.quota)
            .field("has_cache", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

fn decode<T: DeserializeOwned>(raw: &RawResponse) -> Result<T> {
    serde_json::from_slice(&raw.body).map_err(|source| Error::Decode {
        url: raw.url.to_string(),
        source,
    })
}
