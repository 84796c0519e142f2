//! Transport abstraction
//!
//! A [`Connector`] turns an endpoint URL into a stream of inbound frames. The
//! feed only ever reads from the stream; dropping it tears the connection down.

use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use futures_util::{FutureExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use super::FeedError;

/// Inbound message payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text frame
    Text(String),
    /// Binary frame
    Binary(Vec<u8>),
}

/// Stream of frames from an open connection
///
/// An `Err` item reports a transport failure; the stream ending means the
/// remote side closed the connection.
pub type FrameStream = BoxStream<'static, Result<Frame, FeedError>>;

/// Abstraction for streaming telemetry sources
pub trait Connector: Send + Sync + 'static {
    /// Establish a connection to `url`
    fn connect(&self, url: &str) -> BoxFuture<'static, Result<FrameStream, FeedError>>;
}

/// WebSocket client transport
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    fn connect(&self, url: &str) -> BoxFuture<'static, Result<FrameStream, FeedError>> {
        let url = url.to_string();
        async move {
            let (ws, _response) = tokio_tungstenite::connect_async(url.as_str())
                .await
                .map_err(|e| FeedError::Connection(format!("{url}: {e}")))?;

            // Ping/pong is answered by tungstenite; a close frame ends the stream
            let frames = ws.filter_map(|msg| async move {
                match msg {
                    Ok(Message::Text(text)) => Some(Ok(Frame::Text(text))),
                    Ok(Message::Binary(bytes)) => Some(Ok(Frame::Binary(bytes))),
                    Ok(_) => None,
                    Err(e) => Some(Err(FeedError::Transport(e.to_string()))),
                }
            });
            Ok(frames.boxed())
        }
        .boxed()
    }
}
