use crate::common::ARTICLE_HTML;
use std::time::Duration;
use sumi_quill::config::StrategyKind;
use sumi_quill::fetch::DirectFetcher;
use sumi_quill::{FetchError, FetchIdentity, Fetcher};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_identity() -> FetchIdentity {
    FetchIdentity {
        user_agent: "QuillTest/1.0".to_string(),
        proxy: None,
        headers: vec![
            ("Accept".to_string(), "text/html".to_string()),
            ("Accept-Language".to_string(), "fr-FR".to_string()),
            ("Referer".to_string(), "https://www.google.com/".to_string()),
        ],
    }
}

fn page_url(server: &MockServer, page: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), page)).expect("Failed to parse page URL")
}

#[tokio::test]
async fn test_direct_fetch_sends_identity_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/story"))
        .and(header("user-agent", "QuillTest/1.0"))
        .and(header("accept-language", "fr-FR"))
        .and(header("referer", "https://www.google.com/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ARTICLE_HTML)
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = DirectFetcher::new(Duration::from_secs(5));
    let page = fetcher
        .fetch(&page_url(&mock_server, "/story"), &create_test_identity())
        .await
        .expect("Fetch should succeed");

    assert_eq!(page.html, ARTICLE_HTML);
    assert_eq!(page.strategy, StrategyKind::Direct);
    assert!(!page.degraded);
}

#[tokio::test]
async fn test_direct_fetch_maps_status_codes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let fetcher = DirectFetcher::new(Duration::from_secs(5));
    let identity = create_test_identity();

    let missing_url = page_url(&mock_server, "/missing");
    let missing = fetcher.fetch(&missing_url, &identity).await.unwrap_err();
    assert_eq!(missing.status(), Some(404));
    assert_eq!(
        missing.to_string(),
        format!("HTTP error: 404 Not Found for url: {}", missing_url)
    );

    let blocked = fetcher
        .fetch(&page_url(&mock_server, "/blocked"), &identity)
        .await
        .unwrap_err();
    assert_eq!(blocked.status(), Some(403));
}

#[tokio::test]
async fn test_direct_fetch_passes_empty_body_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let fetcher = DirectFetcher::new(Duration::from_secs(5));
    let page = fetcher
        .fetch(&page_url(&mock_server, "/empty"), &create_test_identity())
        .await
        .expect("Empty 200 is still a successful fetch");

    assert!(page.html.is_empty());
}

#[tokio::test]
async fn test_direct_fetch_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ARTICLE_HTML)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let fetcher = DirectFetcher::new(Duration::from_secs(1));
    let error = fetcher
        .fetch(&page_url(&mock_server, "/slow"), &create_test_identity())
        .await
        .unwrap_err();

    assert!(matches!(error, FetchError::Timeout { .. }), "got {:?}", error);
}

#[tokio::test]
async fn test_direct_fetch_connection_refused() {
    // Bind and drop a listener to get a port with nothing behind it
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
        listener.local_addr().expect("Failed to get address").port()
    };
    let url = Url::parse(&format!("http://127.0.0.1:{}/story", port)).unwrap();

    let fetcher = DirectFetcher::new(Duration::from_secs(2));
    let error = fetcher.fetch(&url, &create_test_identity()).await.unwrap_err();

    assert_eq!(error.kind(), "http");
    assert_eq!(error.status(), None);
}
