//! # Canvas API client
//!
//! Async client for the Canvas LMS REST API. Translates calls into
//! authenticated GET requests, serializes typed parameters into query
//! strings, follows `Link` header pagination, and throttles itself against
//! the quota the server reports in `X-Rate-Limit-Remaining`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use canvas_api::{CanvasClient, ClientConfig, Params, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::builder("school", "1234~token").build()?;
//!     let client = CanvasClient::new(config)?;
//!
//!     let mut params = Params::new();
//!     params.insert("enrollment_state".into(), "active".into());
//!     params.insert("include".into(), vec!["term", "teachers"].into());
//!
//!     let courses: Vec<serde_json::Value> = client.collect("courses", &params).await?;
//!     println!("{} courses", courses.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! caller ─► CanvasClient::request
//!             │ params ─► ParameterSerializer ─► initial URL
//!             ▼
//!           ┌───────────────────────── per page ──────────────────────────┐
//!           │ QuotaTracker::admit ─► Transport::get ─► Admission::release │
//!           │ (3xx: follow Location, each hop admitted)                    │
//!           │ ResponseCache::store (optional, non-fatal)                   │
//!           │ serde_json decode ─► on_page(T)                              │
//!           │ Link rel="next" ─► loop                                      │
//!           └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Client configuration
pub mod config;

/// Query parameter serialization
pub mod params;

/// Transport and quota-based admission control
pub mod http;

/// Link header pagination
pub mod pagination;

/// Raw response caching
pub mod cache;

/// Request engine
pub mod engine;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{ClientConfig, ClientConfigBuilder};
pub use engine::{CanvasClient, RawResponse, RequestStats};
pub use error::{Error, Result};
pub use http::{QuotaConfig, QuotaTracker, ReqwestTransport, Transport};
pub use params::{ParamKind, ParamValue, ParameterRule, ParameterSerializer, Params};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
