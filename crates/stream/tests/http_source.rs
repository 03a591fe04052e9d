//! Integration tests for `HttpEventSource`.
//!
//! Each test serves one canned HTTP response from a loopback listener,
//! so the real reqwest path runs without leaving the machine.

use std::time::Duration;

use futures::StreamExt;
use pawalert_stream::{EventSource, HttpEventSource, SseEvent, StreamError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SSE_HEADERS: &[u8] =
    b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\nconnection: close\r\n\r\n";

/// One-shot server. `request` resolves to the lowercased request head.
struct CannedServer {
    base_url: String,
    request: JoinHandle<String>,
}

/// Accept one connection and write `parts` with a pause between each,
/// so the client sees them as separate body chunks.
async fn serve(parts: Vec<&'static [u8]>) -> CannedServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");

    let request = tokio::spawn(async move {
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

        for part in parts {
            socket.write_all(part).await.expect("write response");
            socket.flush().await.expect("flush");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        String::from_utf8_lossy(&head).to_lowercase()
    });

    CannedServer {
        base_url: format!("http://{addr}"),
        request,
    }
}

fn source(base_url: &str) -> HttpEventSource {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("build client");
    HttpEventSource::with_client(client, base_url).with_auth_token("secret-token")
}

// ---------------------------------------------------------------------------
// Test: a non-2xx answer is an open error carrying the status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unauthorized_response_is_status_error() {
    let server = serve(vec![
        &b"HTTP/1.1 401 Unauthorized\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"[..],
    ])
    .await;

    let Err(err) = source(&server.base_url).open().await else {
        panic!("401 must not open a stream");
    };
    assert_eq!(err, StreamError::Status(401));
}

// ---------------------------------------------------------------------------
// Test: request targets the stream path with SSE and bearer headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn request_carries_stream_headers() {
    let server = serve(vec![SSE_HEADERS, &b"event: connected\n\n"[..]]).await;

    let mut events = source(&server.base_url).open().await.expect("stream opens");
    let first = events.next().await.expect("one event").expect("decoded");
    assert_eq!(first, SseEvent::new("connected", ""));

    let head = server.request.await.expect("server task");
    assert!(head.starts_with("get /api/notifications/stream http/1.1"), "{head}");
    assert!(head.contains("accept: text/event-stream"), "{head}");
    assert!(head.contains("authorization: bearer secret-token"), "{head}");
    assert!(!head.contains("last-event-id"), "{head}");
}

// ---------------------------------------------------------------------------
// Test: body chunks split mid-line are reassembled into events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chunked_body_is_decoded() {
    let server = serve(vec![
        SSE_HEADERS,
        &b": keep-alive\n\nevent: connected\n\nevent: notif"[..],
        &b"ication\ndata: {\"id\":\"n-1\",\"type\":\"NEW_"[..],
        &b"ALERT\",\"alertId\":\"4\"}\n\n"[..],
    ])
    .await;

    let events: Vec<_> = source(&server.base_url)
        .open()
        .await
        .expect("stream opens")
        .take(2)
        .collect()
        .await;

    assert_eq!(
        events,
        vec![
            Ok(SseEvent::new("connected", "")),
            Ok(SseEvent::new(
                "notification",
                r#"{"id":"n-1","type":"NEW_ALERT","alertId":"4"}"#
            )),
        ]
    );
}
