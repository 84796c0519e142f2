//! Feed against a real WebSocket endpoint on localhost

use futures_util::{SinkExt, StreamExt};
use kinefeed_core::feed::{open, FeedConfig, FeedError, FeedState, Sample};
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

/// Accept one client, send `messages`, then close the connection
async fn serve_once(messages: Vec<Message>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        for message in messages {
            ws.send(message).await.unwrap();
        }
        let _ = ws.close(None).await;
        while let Some(Ok(_)) = ws.next().await {}
    });

    format!("ws://{addr}/ws")
}

fn json(text: &str) -> Message {
    Message::Text(text.to_string())
}

#[tokio::test]
async fn test_websocket_scenario() {
    let url = serve_once(vec![
        json(r#"{"id":"r1","angle_deg":45}"#),
        Message::Ping(vec![1, 2, 3]),
        json(r#"{"id":"other","angle_deg":99}"#),
        Message::Binary(vec![0xff, 0x00]),
        json(r#"{"id":"r1","time_s":0.5,"angle_deg":50}"#),
    ])
    .await;

    let handle = open("r1", FeedConfig::default().with_url(url)).unwrap();
    let mut updates = handle.updates();

    let state = handle.wait_for(FeedState::is_terminal).await;
    assert_eq!(state, FeedState::Closed);
    assert_eq!(
        handle.snapshot().samples(),
        &[Sample::new(0.0, 45.0), Sample::new(0.5, 50.0)]
    );

    let stats = handle.stats();
    assert_eq!(stats.accepted, 2);
    assert_eq!(stats.ignored, 1);
    assert_eq!(stats.malformed, 1);

    assert_eq!(updates.next().await.unwrap().len(), 1);
    assert_eq!(updates.next().await.unwrap().len(), 2);
    assert!(updates.next().await.is_none());
}

#[tokio::test]
async fn test_websocket_binary_json_frame() {
    let url = serve_once(vec![Message::Binary(
        br#"{"time_s":1.5,"angle_deg":12.5}"#.to_vec(),
    )])
    .await;

    let handle = open("live", FeedConfig::default().with_url(url)).unwrap();
    handle.wait_for(FeedState::is_terminal).await;

    assert_eq!(handle.snapshot().samples(), &[Sample::new(1.5, 12.5)]);
}

#[tokio::test]
async fn test_websocket_refused() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let handle = open("live", FeedConfig::default().with_url(format!("ws://{addr}/ws"))).unwrap();

    assert_eq!(handle.wait_for(FeedState::is_terminal).await, FeedState::Failed);
    assert!(matches!(handle.last_error(), Some(FeedError::Connection(_))));
    assert!(handle.snapshot().is_empty());
}
