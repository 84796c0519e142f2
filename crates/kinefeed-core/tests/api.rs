//! Recording client against a minimal local HTTP responder

use kinefeed_core::api::{ApiError, RecordingClient};
use kinefeed_core::feed::Sample;
use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Answer one request with `status` and `body`; yields the request line
async fn respond_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let request = String::from_utf8_lossy(&request);
        let _ = tx.send(request.lines().next().unwrap_or_default().to_string());

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    (format!("http://{addr}/"), rx)
}

#[tokio::test]
async fn test_fetch_recording() {
    let (base, request) = respond_once(
        "200 OK",
        r#"{"id":"r1","patient_id":"1","times":[0,0.1,0.2],"angles":[45,null,50]}"#,
    )
    .await;
    let client = RecordingClient::new(base).unwrap();

    let recording = client.fetch_recording("r1").await.unwrap();

    assert_eq!(request.await.unwrap(), "GET /recordings/r1 HTTP/1.1");
    assert_eq!(recording.patient_id.as_deref(), Some("1"));
    assert_eq!(
        recording.chart_points(),
        vec![Sample::new(0.0, 45.0), Sample::new(0.2, 50.0)]
    );
}

#[tokio::test]
async fn test_missing_recording() {
    let (base, _) = respond_once("404 Not Found", r#"{"detail":"Recording not found"}"#).await;
    let client = RecordingClient::new(base).unwrap();

    let err = client.fetch_recording("nope").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(id) if id == "nope"));
}

#[tokio::test]
async fn test_server_error() {
    let (base, _) = respond_once("500 Internal Server Error", "{}").await;
    let client = RecordingClient::new(base).unwrap();

    let err = client.fetch_recording("r1").await.unwrap_err();
    assert!(matches!(err, ApiError::Http(_)));
}

#[tokio::test]
async fn test_unreachable_backend() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = RecordingClient::new(format!("http://{addr}")).unwrap();

    let err = client.fetch_recording("r1").await.unwrap_err();
    assert!(matches!(err, ApiError::Http(_)));
}
