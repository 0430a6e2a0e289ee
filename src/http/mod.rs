//! HTTP layer
//!
//! Provides the transport capability and quota-based admission control.
//!
//! # Features
//!
//! - **Transport**: Pluggable GET exchange, `reqwest` by default
//! - **Quota Tracking**: Extrapolates the server's `X-Rate-Limit-Remaining`
//!   feedback and holds requests back until enough quota is projected

mod quota;
mod transport;

pub use quota::{parse_remaining, Admission, QuotaConfig, QuotaTracker, MAX_ADMISSION_WAIT};
pub use transport::{
    same_host, ReqwestTransport, Transport, TransportRequest, TransportResponse,
};

pub(crate) use transport::default_transport;

/// Header carrying the server's remaining quota
pub const RATE_LIMIT_REMAINING: &str = "x-rate-limit-remaining";
