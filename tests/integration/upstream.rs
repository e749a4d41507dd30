//! The real Gold-API client against a local stand-in server.

use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use rust_decimal_macros::dec;
use secrecy::SecretString;
use std::sync::{Arc, Mutex};
use tokio_test::assert_ok;

use gold_tracker::config::UpstreamConfig;
use gold_tracker::data::gold_api::GoldApiClient;
use gold_tracker::data::PriceSource;
use gold_tracker::error::FetchError;

/// Tokens seen in `x-access-token` headers, one entry per request.
type SeenTokens = Arc<Mutex<Vec<Option<String>>>>;

/// Serve `/price/XAU` with a fixed status and body on an ephemeral port.
async fn spawn_upstream(status: StatusCode, body: &'static str) -> (String, SeenTokens) {
    let seen: SeenTokens = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();

    let app = Router::new().route(
        "/price/XAU",
        get(move |headers: HeaderMap| {
            let recorder = recorder.clone();
            async move {
                let token = headers
                    .get("x-access-token")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                recorder.lock().unwrap().push(token);
                (status, [(header::CONTENT_TYPE, "application/json")], body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), seen)
}

fn client(base_url: String, key: Option<&str>) -> GoldApiClient {
    let cfg = UpstreamConfig {
        base_url,
        timeout_secs: 5,
        ..UpstreamConfig::default()
    };
    GoldApiClient::new(&cfg, key.map(|k| SecretString::new(k.to_string()))).unwrap()
}

#[tokio::test]
async fn test_fetch_sends_token_and_parses_quote() {
    let (url, seen) = spawn_upstream(
        StatusCode::OK,
        r#"{"name":"Gold","price":2650.55,"symbol":"XAU","updatedAt":"2026-10-16T04:00:00Z"}"#,
    )
    .await;

    let quote = assert_ok!(client(url, Some("secret-token")).fetch_spot().await);
    assert_eq!(quote.price_per_ounce_usd, dec!(2650.55));
    assert_eq!(quote.updated_at.as_deref(), Some("2026-10-16T04:00:00Z"));
    assert_eq!(*seen.lock().unwrap(), vec![Some("secret-token".to_string())]);
}

#[tokio::test]
async fn test_fetch_without_key_omits_header() {
    let (url, seen) = spawn_upstream(StatusCode::OK, r#"{"price":2400}"#).await;

    assert_ok!(client(url, None).fetch_spot().await);
    assert_eq!(*seen.lock().unwrap(), vec![None]);
}

#[tokio::test]
async fn test_fetch_reports_http_status() {
    let (url, _seen) =
        spawn_upstream(StatusCode::TOO_MANY_REQUESTS, r#"{"error":"rate limited"}"#).await;

    let err = client(url, Some("k")).fetch_spot().await.unwrap_err();
    match err {
        FetchError::Status { status, body } => {
            assert_eq!(status, 429);
            assert!(body.contains("rate limited"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_rejects_missing_price() {
    let (url, _seen) = spawn_upstream(StatusCode::OK, r#"{"symbol":"XAU"}"#).await;

    let err = client(url, None).fetch_spot().await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidPrice(_)));
}

#[tokio::test]
async fn test_fetch_unreachable_host() {
    // Bind then drop to get a port nothing is listening on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(format!("http://{addr}"), None).fetch_spot().await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}
