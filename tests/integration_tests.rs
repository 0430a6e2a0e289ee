//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: typed parameters → paginated HTTP
//! requests → decoded pages, quota feedback and on-disk cache

use canvas_api::{CanvasClient, ClientConfig, Error, ParamKind, ParamValue, Params};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct Course {
    id: u64,
    name: String,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::builder("school", "test-token")
        .base_url(format!("{}/api/v1", server.uri()))
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

// ============================================================================
// Request Flow
// ============================================================================

#[tokio::test]
async fn test_collect_follows_link_pagination() {
    init_tracing();
    let server = MockServer::start().await;
    let base = format!("{}/api/v1/courses", server.uri());

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 3, "name": "Physics"}]))
                .insert_header("Link", format!("<{base}?page=1>; rel=\"first\"").as_str()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param("enrollment_state", "active"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([
                    {"id": 1, "name": "Algebra"},
                    {"id": 2, "name": "Biology"}
                ]))
                .insert_header(
                    "Link",
                    format!("<{base}?page=2>; rel=\"next\", <{base}?page=2>; rel=\"last\"")
                        .as_str(),
                ),
        )
        .mount(&server)
        .await;

    let client = CanvasClient::new(config_for(&server)).unwrap();
    let mut params = Params::new();
    params.insert("enrollment_state".into(), "active".into());

    let mut pages = Vec::new();
    let stats = client
        .request("courses", &params, |page: Vec<Course>| -> anyhow::Result<()> {
            pages.push(page);
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(stats.pages, 2);
    assert_eq!(stats.exchanges, 2);
    assert_eq!(stats.expected_pages, Some(2));
    assert_eq!(pages[0].len(), 2);
    assert_eq!(
        pages[1],
        vec![Course {
            id: 3,
            name: "Physics".into()
        }]
    );
}

#[tokio::test]
async fn test_auth_and_accept_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/self"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let client = CanvasClient::new(config_for(&server)).unwrap();
    let user: serde_json::Value = client.get("users/self", &Params::new()).await.unwrap();

    assert_eq!(user["id"], 7);
}

#[tokio::test]
async fn test_sequence_and_date_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/assignments"))
        .and(query_param("include[]", "submission"))
        .and(query_param("due_after", "2024-03-05"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = CanvasClient::new(config_for(&server)).unwrap();
    let mut params = Params::new();
    params.insert("include".into(), vec!["submission"].into());
    params.insert(
        "due_after".into(),
        chrono::NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().into(),
    );

    let items: Vec<serde_json::Value> = client
        .collect("courses/1/assignments", &params)
        .await
        .unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_custom_parameter_rule() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param("near", "1.5,2.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = CanvasClient::new(config_for(&server)).unwrap();
    let mut params = Params::new();
    params.insert(
        "near".into(),
        ParamValue::custom("Point", json!({"x": 1.5, "y": 2.5})),
    );

    // Unregistered type fails before anything is sent
    let err = client
        .collect::<serde_json::Value>("courses", &params)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownParameterType { .. }));

    client
        .parameters()
        .register_kind(ParamKind::Custom("Point"), |value| match value {
            ParamValue::Custom { value, .. } => Ok(format!("{},{}", value["x"], value["y"])),
            _ => unreachable!(),
        });

    let items: Vec<serde_json::Value> = client.collect("courses", &params).await.unwrap();
    assert!(items.is_empty());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_status_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .expect(1)
        .mount(&server)
        .await;

    let client = CanvasClient::new(config_for(&server)).unwrap();
    let err = client
        .collect::<serde_json::Value>("accounts", &Params::new())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_callback_error_stops_pagination() {
    let server = MockServer::start().await;
    let base = format!("{}/api/v1/courses", server.uri());

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 1, "name": "Algebra"}]))
                .insert_header("Link", format!("<{base}?page=2>; rel=\"next\"").as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = CanvasClient::new(config_for(&server)).unwrap();
    let err = client
        .request("courses", &Params::new(), |_: Vec<Course>| {
            Err(anyhow::anyhow!("stop"))
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Callback(_)));
}

// ============================================================================
// Quota And Cache
// ============================================================================

#[tokio::test]
async fn test_rate_limit_header_feeds_quota() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header("X-Rate-Limit-Remaining", "250.0"),
        )
        .mount(&server)
        .await;

    let client = CanvasClient::new(config_for(&server)).unwrap();
    let _: Vec<serde_json::Value> = client.collect("courses", &Params::new()).await.unwrap();

    let estimate = client.quota().estimate_available();
    assert!(estimate >= 250.0 && estimate < 700.0, "estimate {estimate}");
    assert_eq!(client.quota().pending(), 0);
}

#[tokio::test]
async fn test_responses_are_cached_on_disk() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"[{"id":1,"name":"Algebra"}]"#, "application/json"),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::builder("school", "test-token")
        .base_url(format!("{}/api/v1", server.uri()))
        .cache_dir(dir.path())
        .build()
        .unwrap();
    let client = CanvasClient::new(config).unwrap();

    let mut params = Params::new();
    params.insert("per_page".into(), ParamValue::Integer(50));
    let courses: Vec<Course> = client.collect("courses", &params).await.unwrap();
    assert_eq!(courses.len(), 1);

    let cached = dir
        .path()
        .join("api")
        .join("v1")
        .join("courses.json")
        .join("per_page=50.json");
    let body = std::fs::read_to_string(&cached).unwrap();
    assert_eq!(body, r#"[{"id":1,"name":"Algebra"}]"#);
}

#[tokio::test]
async fn test_fetch_raw_follows_redirect() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/files/9/download"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/blobs/9", server.uri()).as_str()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blobs/9"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("PDF", "application/pdf"))
        .mount(&server)
        .await;

    let client = CanvasClient::new(config_for(&server)).unwrap();
    let raw = client
        .fetch_raw("files/9/download", "application/pdf")
        .await
        .unwrap();

    assert_eq!(raw.redirects, 1);
    assert_eq!(raw.url.path(), "/blobs/9");
    assert_eq!(raw.content_type(), Some("application/pdf"));
    assert_eq!(&raw.body[..], b"PDF");
}
