//! Response cache module
//!
//! Optional side channel that writes raw response bytes to disk. A failed
//! write is reported but never invalidates a response that was already
//! decoded.

mod mime;
mod store;

pub use mime::{essence, extension_for, DEFAULT_TYPE, REDIRECT_TYPE};
pub use store::ResponseCache;
