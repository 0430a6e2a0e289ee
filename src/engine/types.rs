//! Engine types
//!
//! Raw exchange results and per-call statistics.

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::path::PathBuf;
use url::Url;

use crate::cache::essence;
use crate::error::Error;

/// Outcome of one (redirect-resolved) exchange
#[derive(Debug)]
pub struct RawResponse {
    /// URL that produced the final response
    pub url: Url,
    /// Final response status
    pub status: StatusCode,
    /// Final response headers
    pub headers: HeaderMap,
    /// Full response body
    pub body: Bytes,
    /// Redirect hops followed to reach this response
    pub redirects: usize,
    /// Where the body was cached, if caching applied and succeeded
    pub cache_path: Option<PathBuf>,
    /// Cache write failures along the way; the response itself is still valid
    pub cache_errors: Vec<Error>,
}

impl RawResponse {
    /// Look up a header as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Response content type without parameters
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type").map(essence)
    }
}

/// Statistics from one logical request
#[derive(Debug, Default)]
pub struct RequestStats {
    /// Pages decoded and handed to the callback
    pub pages: usize,
    /// HTTP exchanges performed, redirect hops included
    pub exchanges: usize,
    /// Redirect hops followed
    pub redirects: usize,
    /// Response body bytes received
    pub bytes: u64,
    /// Page count advertised by the first page's `rel="last"` link
    pub expected_pages: Option<u32>,
    /// Cache writes that failed
    pub cache_errors: Vec<Error>,
}

impl RequestStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for a fetched response, taking over its cache failures
    pub fn add_response(&mut self, response: &mut RawResponse) {
        self.exchanges += response.redirects + 1;
        self.redirects += response.redirects;
        self.bytes += response.body.len() as u64;
        self.cache_errors.append(&mut response.cache_errors);
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages += 1;
    }
}
