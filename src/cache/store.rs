//! Raw response cache
//!
//! Persists response bodies under a root folder, keyed by request URL and
//! content type. Only responses from the API's own host are cached.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use super::mime::extension_for;
use crate::error::{Error, Result};
use crate::http::same_host;

/// File name used when the request has no query string
const DEFAULT_NAME: &str = "default";

/// Path segment escaping: unreserved characters and `$&+:=@` stay as they are
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b':')
    .remove(b'=')
    .remove(b'@');

/// Filesystem cache for raw response bodies
#[derive(Debug, Clone)]
pub struct ResponseCache {
    root: PathBuf,
    api_base: Url,
}

impl ResponseCache {
    /// Create a cache for responses from `api_base`'s host
    pub fn new(root: impl Into<PathBuf>, api_base: &Url) -> Self {
        Self {
            root: root.into(),
            api_base: api_base.clone(),
        }
    }

    /// Root folder of the cache
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `url` targets the API's own host
    pub fn is_own_host(&self, url: &Url) -> bool {
        same_host(url, &self.api_base)
    }

    /// Cache path for a request, or `None` for third-party hosts.
    ///
    /// Layout: `<root>/<url path><ext>/<escaped query><ext>`, with
    /// `default<ext>` as the file name when there is no query.
    pub fn locate(&self, url: &Url, content_type: &str) -> Option<PathBuf> {
        if !self.is_own_host(url) {
            return None;
        }

        let ext = extension_for(content_type);
        let mut path = self.root.clone();
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty() && *seg != "..").collect())
            .unwrap_or_default();
        match segments.split_last() {
            Some((last, parents)) => {
                path.extend(parents);
                path.push(format!("{last}{ext}"));
            }
            None => path.push(ext.clone()),
        }

        let file_name = match url.query().filter(|q| !q.is_empty()) {
            Some(query) => format!("{}{ext}", utf8_percent_encode(query, SEGMENT)),
            None => format!("{DEFAULT_NAME}{ext}"),
        };
        path.push(file_name);
        Some(path)
    }

    /// Write `body` to `path`, creating parent directories and replacing
    /// any existing file
    pub async fn persist(&self, path: &Path, body: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| Error::CacheWrite {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(path, body)
            .await
            .map_err(|source| Error::CacheWrite {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Cached {} bytes at {}", body.len(), path.display());
        Ok(())
    }

    /// Locate and persist in one step; returns the path written, if any
    pub async fn store(
        &self,
        url: &Url,
        content_type: &str,
        body: &[u8],
    ) -> Result<Option<PathBuf>> {
        match self.locate(url, content_type) {
            Some(path) => {
                self.persist(&path, body).await?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }
}
