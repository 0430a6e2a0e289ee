//! Tests for pagination module

use super::*;

const CANVAS_LINKS: &str = concat!(
    r#"<https://school.instructure.com/api/v1/courses?page=2&per_page=10>; rel="current","#,
    r#"<https://school.instructure.com/api/v1/courses?page=3&per_page=10>; rel="next","#,
    r#"<https://school.instructure.com/api/v1/courses?page=1&per_page=10>; rel="prev","#,
    r#"<https://school.instructure.com/api/v1/courses?page=1&per_page=10>; rel="first","#,
    r#"<https://school.instructure.com/api/v1/courses?page=7&per_page=10>; rel="last""#,
);

#[test]
fn test_parse_link_header_all_entries() {
    let links = parse_link_header(CANVAS_LINKS);
    let relations: Vec<_> = links.iter().map(|l| l.relation.as_str()).collect();
    assert_eq!(relations, vec!["current", "next", "prev", "first", "last"]);
    assert!(links[1].is_next());
    assert!(!links[0].is_next());
}

#[test]
fn test_next_link_is_verbatim() {
    assert_eq!(
        next_link(CANVAS_LINKS).as_deref(),
        Some("https://school.instructure.com/api/v1/courses?page=3&per_page=10")
    );
}

#[test]
fn test_next_link_with_whitespace_variants() {
    let header = r#"<https://a.example/x?page=2>;   rel="next" , <https://a.example/x?page=9>;rel="last""#;
    assert_eq!(
        next_link(header).as_deref(),
        Some("https://a.example/x?page=2")
    );
    assert_eq!(last_page_hint(header), Some(9));
}

#[test]
fn test_no_next_link() {
    let header = r#"<https://a.example/x?page=1>; rel="first", <https://a.example/x?page=1>; rel="last""#;
    assert!(next_link(header).is_none());
    assert!(next_link("").is_none());
    assert!(parse_link_header("garbage").is_empty());
}

#[test]
fn test_last_page_hint() {
    assert_eq!(last_page_hint(CANVAS_LINKS), Some(7));
    assert_eq!(last_page_hint(r#"<https://a.example/x?cursor=abc>; rel="last""#), None);
    assert_eq!(last_page_hint(r#"<https://a.example/x?page=first>; rel="last""#), None);
    assert_eq!(last_page_hint(r#"</relative?page=2>; rel="last""#), None);
}

#[test]
fn test_page_link_new() {
    let link = PageLink::new("next", "https://a.example/2");
    assert_eq!(link.relation, "next");
    assert_eq!(link.url, "https://a.example/2");
}
