// HttpPageSource against a mock server: plain fetches, status handling, rendering waits

use std::time::Duration;

use mockito::{Matcher, Server};
use station_weather_collector::fetch_error::FetchError;
use station_weather_collector::page_source::{HttpPageSource, PageSource};

const TABLE_HTML: &str = r#"<html><body><table id="hourly-forecast-table"><tbody><tr><td>1 am</td></tr></tbody></table></body></html>"#;
const READY: &str = "#hourly-forecast-table tbody tr";

#[tokio::test]
async fn test_fetch_html_sends_user_agent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/station")
        .match_header("user-agent", "weather-test-agent")
        .with_status(200)
        .with_body("<html>ok</html>")
        .create_async()
        .await;

    let source = HttpPageSource::new().with_user_agent("weather-test-agent");
    let html = source
        .fetch_html(&format!("{}/station", server.url()))
        .await
        .unwrap();

    assert_eq!(html, "<html>ok</html>");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_html_non_success_status() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/missing")
        .with_status(404)
        .create_async()
        .await;

    let source = HttpPageSource::new();
    let result = source.fetch_html(&format!("{}/missing", server.url())).await;

    match result {
        Err(FetchError::Status { status, url }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/missing"));
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_render_html_returns_ready_page() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/hourly")
        .with_status(200)
        .with_body(TABLE_HTML)
        .create_async()
        .await;

    let source = HttpPageSource::new();
    let html = source
        .render_html(
            &format!("{}/hourly", server.url()),
            READY,
            Duration::from_secs(2),
        )
        .await
        .unwrap();

    assert!(html.contains("hourly-forecast-table"));
}

#[tokio::test]
async fn test_render_html_times_out_when_selector_missing() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/hourly")
        .with_status(200)
        .with_body("<html><body>Loading...</body></html>")
        .create_async()
        .await;

    let source = HttpPageSource::new().with_poll_interval(Duration::from_millis(50));
    let result = source
        .render_html(
            &format!("{}/hourly", server.url()),
            READY,
            Duration::from_millis(250),
        )
        .await;

    match result {
        Err(FetchError::RenderTimeout {
            selector,
            timeout_ms,
            ..
        }) => {
            assert_eq!(selector, READY);
            assert_eq!(timeout_ms, 250);
        }
        other => panic!("Expected RenderTimeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_render_html_through_render_endpoint() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/render")
        .match_query(Matcher::UrlEncoded(
            "url".into(),
            "https://example.test/hourly/date/2024-06-02".into(),
        ))
        .with_status(200)
        .with_body(TABLE_HTML)
        .create_async()
        .await;

    let source =
        HttpPageSource::new().with_render_endpoint(Some(format!("{}/render", server.url())));
    let html = source
        .render_html(
            "https://example.test/hourly/date/2024-06-02",
            READY,
            Duration::from_secs(2),
        )
        .await
        .unwrap();

    assert!(html.contains("<td>1 am</td>"));
    mock.assert_async().await;
}
