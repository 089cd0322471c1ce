use crate::common::{create_test_config, create_test_pipeline, ARTICLE_HTML};
use sumi_quill::ExtractionError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn article_response() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(ARTICLE_HTML)
        .insert_header("content-type", "text/html")
}

#[tokio::test]
async fn test_extract_article_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/markets"))
        .respond_with(article_response())
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(3, &[]);
    let pipeline = create_test_pipeline(&config);

    let record = pipeline
        .extract(&format!("{}/markets", mock_server.uri()))
        .await
        .expect("Extraction should succeed");

    assert_eq!(record.title, "Markets rally on rate hopes");
    assert_eq!(record.authors, vec!["Jane Doe", "John Roe"]);
    assert_eq!(
        record.publish_date.as_deref(),
        Some("2024-06-03T07:30:00+02:00")
    );
    assert_eq!(
        record.text,
        "Stocks climbed on Monday.\n\nAnalysts expect further gains."
    );
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let mock_server = MockServer::start().await;

    // First request fails, later ones succeed
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(article_response())
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(3, &[]);
    let pipeline = create_test_pipeline(&config);

    let result = pipeline
        .extract(&format!("{}/flaky", mock_server.uri()))
        .await;
    assert!(result.is_ok(), "got {:?}", result);
}

#[tokio::test]
async fn test_persistent_failure_exhausts_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(2, &[]);
    let pipeline = create_test_pipeline(&config);

    let error = pipeline
        .extract(&format!("{}/gone", mock_server.uri()))
        .await
        .unwrap_err();

    assert!(!error.is_client_error());
    assert!(matches!(
        error,
        ExtractionError::RetriesExhausted { attempts: 2, .. }
    ));
    assert!(error.to_string().starts_with("Failed after 2 attempts: HTTP error: 404"));
}

#[tokio::test]
async fn test_forbidden_escalates_through_proxy() {
    let origin = MockServer::start().await;
    let proxy = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/paywalled"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&origin)
        .await;

    // The proxy sees the same path and answers on the origin's behalf
    Mock::given(method("GET"))
        .and(path("/paywalled"))
        .respond_with(article_response())
        .expect(1)
        .mount(&proxy)
        .await;

    let config = create_test_config(3, &[proxy.uri()]);
    let pipeline = create_test_pipeline(&config);

    let record = pipeline
        .extract(&format!("{}/paywalled", origin.uri()))
        .await
        .expect("Proxied retry should succeed");

    assert_eq!(record.title, "Markets rally on rate hopes");
}

#[tokio::test]
async fn test_failed_escalation_reports_forbidden() {
    let origin = MockServer::start().await;
    let proxy = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(2)
        .mount(&origin)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&proxy)
        .await;

    let config = create_test_config(2, &[proxy.uri()]);
    let pipeline = create_test_pipeline(&config);

    let error = pipeline
        .extract(&format!("{}/paywalled", origin.uri()))
        .await
        .unwrap_err();

    match error {
        ExtractionError::RetriesExhausted { attempts, last } => {
            assert_eq!(attempts, 2);
            match *last {
                ExtractionError::Fetch(fetch) => assert_eq!(fetch.status(), Some(403)),
                other => panic!("expected fetch error, got {:?}", other),
            }
        }
        other => panic!("expected RetriesExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_html_response_is_parse_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\": true}"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(1, &[]);
    let pipeline = create_test_pipeline(&config);

    let error = pipeline
        .extract(&format!("{}/api", mock_server.uri()))
        .await
        .unwrap_err();

    match error {
        ExtractionError::RetriesExhausted { last, .. } => {
            assert_eq!(last.kind(), "malformed_document");
        }
        other => panic!("expected RetriesExhausted, got {:?}", other),
    }
}
