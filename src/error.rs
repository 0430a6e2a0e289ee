//! Error types for the Canvas API client
//!
//! Every public API returns `Result<T, Error>` where Error is defined here.
//! Nothing in the client retries; a caller that needs resilience wraps the
//! call itself.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the Canvas API client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // Parameter Errors
    // ============================================================================
    #[error("Unknown parameter type {type_name} for parameter '{name}'")]
    UnknownParameterType { name: String, type_name: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport failure for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Invalid status code at URL {url}: {status} {status_text}")]
    HttpStatus {
        url: String,
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("Too many redirects ({limit}) starting at {url}")]
    TooManyRedirects { url: String, limit: u32 },

    #[error("Redirect requested with no target location at {url}")]
    MissingRedirectLocation { url: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Response Processing Errors
    // ============================================================================
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Page callback failed: {0}")]
    Callback(#[source] anyhow::Error),

    // ============================================================================
    // Cache Errors
    // ============================================================================
    #[error("Failed to write cached response to {}: {source}", path.display())]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an unknown parameter type error
    pub fn unknown_type(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnknownParameterType {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    /// Create a transport error from a message
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(
        url: impl Into<String>,
        status: u16,
        status_text: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// Create a callback error
    pub fn callback(err: impl Into<anyhow::Error>) -> Self {
        Self::Callback(err.into())
    }

    /// Whether this error aborts the logical call it occurred in.
    ///
    /// Cache writes are a side channel; everything else is terminal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::CacheWrite { .. })
    }

    /// HTTP status code, if this is a status error
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for the Canvas API client
pub type Result<T> = std::result::Result<T, Error>;
