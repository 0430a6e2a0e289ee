//! Content type to file extension mapping

/// MIME type recorded for a followed redirect
pub const REDIRECT_TYPE: &str = "application/x-http-redirect";

/// MIME type used when nothing else matches
pub const DEFAULT_TYPE: &str = "application/octet-stream";

const FILE_ASSOCIATIONS: &[(&str, &str)] = &[
    ("application/json", ".json"),
    ("text/html", ".html"),
    (REDIRECT_TYPE, ".url"),
    (DEFAULT_TYPE, ".bin"),
];

fn association(mime: &str) -> Option<&'static str> {
    FILE_ASSOCIATIONS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(mime))
        .map(|(_, ext)| *ext)
}

/// Map a content type to a file extension.
///
/// Composite types joined with `+` are mapped segment by segment and the
/// extensions concatenated; unknown segments map to `.bin`. Parameters such
/// as `; charset=utf-8` are ignored.
pub fn extension_for(content_type: &str) -> String {
    essence(content_type)
        .split('+')
        .map(|part| {
            association(part.trim())
                .or_else(|| association(DEFAULT_TYPE))
                .unwrap_or(".bin")
        })
        .collect()
}

/// Strip parameters from a content type value
pub fn essence(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
}
