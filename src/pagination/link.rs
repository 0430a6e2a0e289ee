//! Link header parsing (RFC 5988)
//!
//! Format: `Link: <https://school.instructure.com/api/v1/courses?page=2>; rel="next", ...`

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use super::types::PageLink;

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([^>]+)>;\s*rel="([^"]+)""#).expect("link header pattern is valid")
});

/// Parse every `<url>; rel="relation"` entry in a Link header, in order
pub fn parse_link_header(header: &str) -> Vec<PageLink> {
    LINK_RE
        .captures_iter(header)
        .map(|caps| PageLink::new(&caps[2], &caps[1]))
        .collect()
}

/// URL of the first `rel="next"` link, verbatim
pub fn next_link(header: &str) -> Option<String> {
    find_rel(header, "next")
}

/// Page count advertised by the `rel="last"` link's `page` query parameter
pub fn last_page_hint(header: &str) -> Option<u32> {
    let last = find_rel(header, "last")?;
    let url = Url::parse(&last).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}

fn find_rel(header: &str, relation: &str) -> Option<String> {
    parse_link_header(header)
        .into_iter()
        .find(|link| link.relation == relation)
        .map(|link| link.url)
}
