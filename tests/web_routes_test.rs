//! Integration tests for web routes.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{forum_config, mount_thread, TOPIC_ID};
use forum_thread_rss::web::{create_app, AppState};
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_app(server: &MockServer) -> Router {
    let state = AppState::new(&forum_config(server)).expect("Failed to create state");
    create_app(state)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = MockServer::start().await;
    let (status, _, body) = get(create_test_app(&server), "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_topic_feed() {
    let server = MockServer::start().await;
    mount_thread(&server, "Тема про телефон", 3).await;

    let (status, content_type, body) =
        get(create_test_app(&server), &format!("/rss/4pda/{TOPIC_ID}")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("application/rss+xml"));
    assert!(body.contains("<rss version=\"2.0\""));
    assert!(body.contains("<title>Тема про телефон</title>"));
    assert!(body.contains(&format!("<atom:id>4pda-{TOPIC_ID}</atom:id>")));
    assert!(body.contains("<description><![CDATA[Message number 1 😄]]></description>"));
    assert_eq!(body.matches("<item>").count(), 3);
    assert!(body.contains("<title>Message number 1 😄</title>"));
    assert!(body.contains(&format!(
        "<guid isPermaLink=\"false\">http://forum.test/forum/index.php?showtopic={TOPIC_ID}&amp;view=findpost&amp;p=1</guid>"
    )));
}

#[tokio::test]
async fn test_non_integer_topic_is_bad_request() {
    let server = MockServer::start().await;
    let (status, _, body) = get(create_test_app(&server), "/rss/4pda/abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("invalid topic id 'abc'"));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_zero_or_negative_topic_is_bad_request() {
    let server = MockServer::start().await;

    for raw in ["0", "-5"] {
        let (status, _, body) =
            get(create_test_app(&server), &format!("/rss/4pda/{raw}")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains(&format!("invalid topic id '{raw}'")));
    }
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_forum_failure_is_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (status, _, body) = get(create_test_app(&server), &format!("/rss/4pda/{TOPIC_ID}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("unexpected status code 503"));
    assert!(body.contains(&format!("showtopic={TOPIC_ID}")));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = MockServer::start().await;
    let (status, _, _) = get(create_test_app(&server), "/rss/other/1").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
