//! Pagination types

/// One entry of a Link header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// Relation name, e.g. "next", "last"
    pub relation: String,
    /// Target URL exactly as the server sent it
    pub url: String,
}

impl PageLink {
    /// Create a new page link
    pub fn new(relation: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            url: url.into(),
        }
    }

    /// Check if this link points at the next page
    pub fn is_next(&self) -> bool {
        self.relation == "next"
    }
}
