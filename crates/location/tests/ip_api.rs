//! Integration tests for `IpApiLocator` against a loopback HTTP server.

use assert_matches::assert_matches;
use pawalert_core::Coordinates;
use pawalert_location::{IpApiLocator, IpLocator, LocateError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Serve a single response with the given status line and JSON body, and
/// return the URL to request.
async fn serve_json(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");

        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.expect("read request");
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket
            .write_all(response.as_bytes())
            .await
            .expect("write response");
    });

    format!("http://{addr}/json/")
}

fn locator(url: String) -> IpApiLocator {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("build client");
    IpApiLocator::with_client(client, url)
}

// ---------------------------------------------------------------------------
// Test: a successful lookup yields the reported coordinates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn success_body_yields_coordinates() {
    let url = serve_json(
        "200 OK",
        r#"{"ip":"203.0.113.7","city":"Porto","latitude":41.15,"longitude":-8.61}"#,
    )
    .await;

    let coords = locator(url).locate().await.expect("coordinates");
    assert_eq!(coords, Coordinates::new(41.15, -8.61));
}

// ---------------------------------------------------------------------------
// Test: a non-2xx status maps to LocateError::Status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rate_limited_status_is_reported() {
    let url = serve_json("429 Too Many Requests", r#"{"error":true}"#).await;

    assert_matches!(locator(url).locate().await, Err(LocateError::Status(429)));
}

// ---------------------------------------------------------------------------
// Test: an error body with a 200 status maps to LocateError::Service
// ---------------------------------------------------------------------------

#[tokio::test]
async fn service_error_body_is_reported() {
    let url = serve_json("200 OK", r#"{"error":true,"reason":"RateLimited"}"#).await;

    assert_matches!(
        locator(url).locate().await,
        Err(LocateError::Service(reason)) if reason == "RateLimited"
    );
}
