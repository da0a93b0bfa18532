use std::time::Duration;

use notifier_engine::{ArticleFetcher, FailureKind, FetchSettings, ReqwestArticleFetcher};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetcher_returns_articles_in_api_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/2.0/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": 3, "title": "Third", "message": { "content": "<p>c</p>" } },
                { "id": 2, "title": "Second", "message": { "content": "<p>b</p>" } }
            ]
        })))
        .mount(&server)
        .await;

    let url = format!("{}/api/2.0/articles", server.uri());
    let fetcher = ReqwestArticleFetcher::new(&url, FetchSettings::default()).unwrap();

    let articles = fetcher.fetch().await.expect("fetch ok");
    let ids: Vec<&str> = articles.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "2"]);
    assert_eq!(articles[0].content, "<p>c</p>");
}

#[tokio::test]
async fn missing_data_field_is_empty_not_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 0 })))
        .mount(&server)
        .await;

    let url = format!("{}/articles", server.uri());
    let fetcher = ReqwestArticleFetcher::new(&url, FetchSettings::default()).unwrap();

    assert!(fetcher.fetch().await.unwrap().is_empty());
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let url = format!("{}/missing", server.uri());
    let fetcher = ReqwestArticleFetcher::new(&url, FetchSettings::default()).unwrap();

    let err = fetcher.fetch().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn fetcher_rejects_non_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let url = format!("{}/html", server.uri());
    let fetcher = ReqwestArticleFetcher::new(&url, FetchSettings::default()).unwrap();

    let err = fetcher.fetch().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidPayload);
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({ "data": [] })),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let url = format!("{}/slow", server.uri());
    let fetcher = ReqwestArticleFetcher::new(&url, settings).unwrap();

    let err = fetcher.fetch().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"data\": [1, 2, 3]}"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let url = format!("{}/large", server.uri());
    let fetcher = ReqwestArticleFetcher::new(&url, settings).unwrap();

    let err = fetcher.fetch().await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 10, .. }));
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    // Nothing listens on the discard port.
    let fetcher =
        ReqwestArticleFetcher::new("http://127.0.0.1:9/articles", FetchSettings::default())
            .unwrap();

    let err = fetcher.fetch().await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::Network | FailureKind::Timeout));
}

#[test]
fn invalid_url_is_rejected_up_front() {
    let err = ReqwestArticleFetcher::new("not a url", FetchSettings::default()).unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[test]
fn configured_url_is_normalized() {
    let fetcher =
        ReqwestArticleFetcher::new("HTTPS://Jotihunt.nl/api/2.0/articles", FetchSettings::default())
            .unwrap();
    assert_eq!(fetcher.url(), "https://jotihunt.nl/api/2.0/articles");
}
