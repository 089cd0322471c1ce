use crate::common::{create_test_config, create_test_pipeline, ARTICLE_HTML};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sumi_quill::server::{build_app, AppState};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_app(max_retries: u32) -> Router {
    let config = create_test_config(max_retries, &[]);
    build_app(AppState::new(create_test_pipeline(&config), &config))
}

async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request");

    let response = app.oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = serde_json::from_slice(&bytes).expect("Response is not JSON");
    (status, value)
}

async fn mount_article(mock_server: &MockServer, page: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ARTICLE_HTML)
                .insert_header("content-type", "text/html"),
        )
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app(1);

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_extract_success() {
    let mock_server = MockServer::start().await;
    mount_article(&mock_server, "/markets").await;

    let body = json!({"url": format!("{}/markets", mock_server.uri())}).to_string();
    let (status, value) = post_json(create_test_app(1), "/extract", &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        value,
        json!({
            "title": "Markets rally on rate hopes",
            "authors": ["Jane Doe", "John Roe"],
            "publish_date": "2024-06-03T07:30:00+02:00",
            "text": "Stocks climbed on Monday.\n\nAnalysts expect further gains."
        })
    );
}

#[tokio::test]
async fn test_extract_missing_url() {
    for body in ["{}", r#"{"url": ""}"#, r#"{"url": null}"#, "not json", ""] {
        let (status, value) = post_json(create_test_app(1), "/extract", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(value, json!({"error": "No URL provided"}), "body {:?}", body);
    }
}

#[tokio::test]
async fn test_extract_invalid_url_is_client_error() {
    let (status, value) =
        post_json(create_test_app(1), "/extract", r#"{"url": "not a url"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["error"].as_str().unwrap().starts_with("Invalid URL"));
}

#[tokio::test]
async fn test_extract_failure_is_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let body = json!({"url": format!("{}/broken", mock_server.uri())}).to_string();
    let (status, value) = post_json(create_test_app(2), "/extract", &body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(value["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed after 2 attempts"));
}

#[tokio::test]
async fn test_batch_mixed_results() {
    let mock_server = MockServer::start().await;
    mount_article(&mock_server, "/one").await;
    mount_article(&mock_server, "/three").await;

    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let urls = vec![
        format!("{}/one", mock_server.uri()),
        format!("{}/two", mock_server.uri()),
        format!("{}/three", mock_server.uri()),
    ];
    let body = json!({"urls": urls}).to_string();
    let (status, value) = post_json(create_test_app(1), "/extract/batch", &body).await;

    assert_eq!(status, StatusCode::OK);
    let entries = value.as_array().expect("Batch response is an array");
    assert_eq!(entries.len(), 3);

    assert_eq!(entries[0]["url"], urls[0].as_str());
    assert_eq!(entries[0]["title"], "Markets rally on rate hopes");

    assert_eq!(entries[1]["url"], urls[1].as_str());
    assert!(entries[1]["error"].as_str().unwrap().contains("404"));
    assert!(entries[1].get("title").is_none());

    assert_eq!(entries[2]["url"], urls[2].as_str());
    assert_eq!(entries[2]["authors"], json!(["Jane Doe", "John Roe"]));
}

#[tokio::test]
async fn test_batch_non_string_items_fail_individually() {
    let mock_server = MockServer::start().await;
    mount_article(&mock_server, "/one").await;

    let good = format!("{}/one", mock_server.uri());
    let body = json!({"urls": [good, 42]}).to_string();
    let (status, value) = post_json(create_test_app(1), "/extract/batch", &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value[0]["title"], "Markets rally on rate hopes");
    assert_eq!(value[1]["url"], "42");
    assert!(value[1]["error"].as_str().unwrap().starts_with("Invalid URL"));
}

#[tokio::test]
async fn test_batch_requires_url_list() {
    for body in [r#"{"urls": []}"#, "{}", r#"{"urls": "https://example.com"}"#, "nope"] {
        let (status, value) = post_json(create_test_app(1), "/extract/batch", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(
            value,
            json!({"error": "Please provide a list of URLs"}),
            "body {:?}",
            body
        );
    }
}
