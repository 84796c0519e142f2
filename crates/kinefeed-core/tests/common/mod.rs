#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use futures_util::{stream, FutureExt, StreamExt};
use kinefeed_core::feed::{Connector, FeedError, Frame, FrameStream};
use tokio::sync::mpsc;

pub type FrameSender = mpsc::UnboundedSender<Result<Frame, FeedError>>;

enum Queued {
    Stream(mpsc::UnboundedReceiver<Result<Frame, FeedError>>),
    Fail(FeedError),
    Hang,
}

/// In-memory transport: each connect pops the next queued outcome
#[derive(Default)]
pub struct ChannelConnector {
    queue: Mutex<VecDeque<Queued>>,
    connects: AtomicUsize,
}

impl ChannelConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a successful connection; dropping the sender closes it remotely
    pub fn push_stream(&self) -> FrameSender {
        let (tx, rx) = mpsc::unbounded_channel();
        self.queue.lock().unwrap().push_back(Queued::Stream(rx));
        tx
    }

    /// Queue a refused connection
    pub fn push_failure(&self, err: FeedError) {
        self.queue.lock().unwrap().push_back(Queued::Fail(err));
    }

    /// Queue a handshake that never completes
    pub fn push_hang(&self) {
        self.queue.lock().unwrap().push_back(Queued::Hang);
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Connector for ChannelConnector {
    fn connect(&self, _url: &str) -> BoxFuture<'static, Result<FrameStream, FeedError>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let next = self.queue.lock().unwrap().pop_front();
        async move {
            match next {
                Some(Queued::Stream(rx)) => {
                    let frames = stream::unfold(rx, |mut rx| async move {
                        rx.recv().await.map(|frame| (frame, rx))
                    });
                    Ok(frames.boxed())
                }
                Some(Queued::Fail(err)) => Err(err),
                Some(Queued::Hang) => futures_util::future::pending().await,
                None => Err(FeedError::Connection("connection refused".into())),
            }
        }
        .boxed()
    }
}

/// Text frame from a JSON value
pub fn text(value: serde_json::Value) -> Result<Frame, FeedError> {
    Ok(Frame::Text(value.to_string()))
}

/// Raw text frame
pub fn raw(payload: &str) -> Result<Frame, FeedError> {
    Ok(Frame::Text(payload.to_string()))
}
