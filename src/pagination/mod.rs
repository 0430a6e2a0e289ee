//! Pagination module
//!
//! Canvas paginates through the `Link` response header. Only `rel="next"`
//! drives the request loop; `rel="last"` is read once for a page-count hint.
//! Next-page URLs are followed verbatim, never rebuilt from the original
//! parameters.

mod link;
mod types;

pub use link::{last_page_hint, next_link, parse_link_header};
pub use types::PageLink;

#[cfg(test)]
mod tests;
