//! Feed handles
//!
//! Handles the connection lifecycle of a single feed: one task per handle
//! connects, reads frames and runs each one through the [`FeedProcessor`].
//! The window is updated under the handle's state lock; the consumer callback
//! then runs under a separate callback lock, so it may read the handle.
//! Closing takes the callback lock, so once [`FeedHandle::close`] returns no
//! further update can be delivered.
//!
//! Lock order is callback slot, then state. The state lock is never held
//! while acquiring the callback slot.

use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{
    Connector, FeedConfig, FeedError, FeedProcessor, FeedSnapshot, FeedState, FeedStats, Frame,
    Ingest, RecordingFilter, WebSocketConnector,
};

type UpdateCallback = Box<dyn FnMut(&FeedSnapshot) + Send + 'static>;

/// State shared between a handle and its connection task
struct Inner {
    state: FeedState,
    state_tx: watch::Sender<FeedState>,
    processor: FeedProcessor,
    last_error: Option<FeedError>,
}

impl Inner {
    fn transition(&mut self, next: FeedState) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::debug!(
                "Ignoring feed transition {} -> {}",
                self.state.name(),
                next.name()
            );
            return false;
        }
        self.state = next;
        self.state_tx.send_replace(next);
        true
    }

    /// Run one frame through the pipeline; the new window if it changed
    fn handle_frame(&mut self, frame: &Frame) -> Option<FeedSnapshot> {
        match self.processor.ingest_frame(frame) {
            Ingest::Accepted(_) => Some(self.processor.snapshot()),
            _ => None,
        }
    }
}

#[derive(Clone)]
struct Shared {
    inner: Arc<Mutex<Inner>>,
    callback: Arc<Mutex<Option<UpdateCallback>>>,
}

impl Shared {
    // A panicking callback must not wedge the feed
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self) -> MutexGuard<'_, Option<UpdateCallback>> {
        self.callback.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move to a terminal state and drop the consumer
    ///
    /// Returns false if the feed had already ended.
    fn finish(&self, state: FeedState, err: Option<FeedError>) -> bool {
        let mut slot = self.slot();
        let finished = {
            let mut inner = self.lock();
            if let Some(err) = err {
                inner.last_error = Some(err);
            }
            !inner.state.is_terminal() && inner.transition(state)
        };
        // The callback may own the last reference to its handle
        let callback = slot.take();
        drop(slot);
        drop(callback);
        finished
    }

    /// Deliver a window to the consumer, if one is still registered
    fn notify(&self, snapshot: &FeedSnapshot) {
        if let Some(callback) = self.slot().as_mut() {
            callback(snapshot);
        }
    }
}

/// Open a feed for `recording_id` over WebSocket
///
/// Returns immediately; the connection is established on the current tokio
/// runtime. Connection failures are reported through [`FeedHandle::state`],
/// not as an error here.
pub fn open(recording_id: &str, config: FeedConfig) -> Result<FeedHandle, FeedError> {
    open_with(recording_id, config, Arc::new(WebSocketConnector))
}

/// Open a feed using a custom transport
pub fn open_with(
    recording_id: &str,
    config: FeedConfig,
    connector: Arc<dyn Connector>,
) -> Result<FeedHandle, FeedError> {
    let filter = RecordingFilter::new(recording_id)?;
    config.validate()?;
    let runtime = tokio::runtime::Handle::try_current().map_err(|_| FeedError::NoRuntime)?;

    let (state_tx, state_rx) = watch::channel(FeedState::Idle);
    let processor = FeedProcessor::new(filter, config.capacity, config.synthetic_step_s);
    let shared = Shared {
        inner: Arc::new(Mutex::new(Inner {
            state: FeedState::Idle,
            state_tx,
            processor,
            last_error: None,
        })),
        callback: Arc::new(Mutex::new(None)),
    };
    shared.lock().transition(FeedState::Connecting);

    tracing::info!(recording = recording_id, url = %config.url, "Opening live feed");

    let cancel = CancellationToken::new();
    let task = runtime.spawn(run_feed(shared.clone(), connector, config, cancel.clone()));

    Ok(FeedHandle {
        recording_id: recording_id.to_string(),
        shared,
        state_rx,
        cancel,
        task,
    })
}

/// Exclusive handle to one live feed connection
///
/// Dropping the handle closes the connection.
pub struct FeedHandle {
    recording_id: String,
    shared: Shared,
    state_rx: watch::Receiver<FeedState>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl FeedHandle {
    /// Register the consumer invoked after every accepted packet
    ///
    /// Replaces any previous registration. The callback runs on the feed's
    /// task after the window has been updated; it may read the handle
    /// ([`FeedHandle::state`], [`FeedHandle::stats`] and so on) but must not
    /// call [`FeedHandle::close`] or [`FeedHandle::on_update`] on this handle.
    /// Registrations on a closed handle are ignored.
    pub fn on_update<F>(&self, callback: F)
    where
        F: FnMut(&FeedSnapshot) + Send + 'static,
    {
        let mut slot = self.shared.slot();
        if self.shared.lock().state.is_terminal() {
            return;
        }
        let previous = slot.replace(Box::new(callback));
        drop(slot);
        drop(previous);
    }

    /// Receive snapshots as an async sequence
    ///
    /// Installs the handle's single update consumer. The sequence ends once
    /// the feed reaches `Closed` or `Failed`.
    ///
    /// Every accepted packet queues one snapshot; nothing is coalesced or
    /// dropped. The queue is unbounded, so a consumer that stops polling
    /// holds up to one window copy per packet until the feed is closed.
    pub fn updates(&self) -> FeedUpdates {
        let (tx, rx) = mpsc::unbounded_channel();
        self.on_update(move |snapshot| {
            let _ = tx.send(snapshot.clone());
        });
        FeedUpdates { rx }
    }

    /// Terminate the connection
    ///
    /// Idempotent. After this returns no callback is invoked, even for frames
    /// already in flight.
    pub fn close(&self) {
        let was_active = self.shared.finish(FeedState::Closed, None);
        self.cancel.cancel();
        self.task.abort();
        if was_active {
            tracing::info!(recording = %self.recording_id, "Live feed closed");
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> FeedState {
        self.shared.lock().state
    }

    /// Watch lifecycle changes
    pub fn state_changes(&self) -> watch::Receiver<FeedState> {
        self.state_rx.clone()
    }

    /// Wait until the state satisfies `pred` and return it
    pub async fn wait_for<P>(&self, mut pred: P) -> FeedState
    where
        P: FnMut(FeedState) -> bool,
    {
        let mut rx = self.state_rx.clone();
        let reached = rx.wait_for(|state| pred(*state)).await.map(|state| *state);
        reached.unwrap_or_else(|_| self.state())
    }

    /// Copy of the current window
    pub fn snapshot(&self) -> FeedSnapshot {
        self.shared.lock().processor.snapshot()
    }

    /// Frame counters
    pub fn stats(&self) -> FeedStats {
        self.shared.lock().processor.stats()
    }

    /// Most recent connection or transport error
    pub fn last_error(&self) -> Option<FeedError> {
        self.shared.lock().last_error.clone()
    }

    /// Recording this feed was opened for
    pub fn recording_id(&self) -> &str {
        &self.recording_id
    }

    /// Check if the feed can still deliver samples
    pub fn is_active(&self) -> bool {
        !self.state().is_terminal()
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for FeedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedHandle")
            .field("recording_id", &self.recording_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Async sequence of window snapshots from one handle
#[derive(Debug)]
pub struct FeedUpdates {
    rx: mpsc::UnboundedReceiver<FeedSnapshot>,
}

impl FeedUpdates {
    /// Wait for the next snapshot; `None` once the feed has ended
    pub async fn next(&mut self) -> Option<FeedSnapshot> {
        self.rx.recv().await
    }

    /// Take a snapshot that is already queued
    pub fn try_next(&mut self) -> Option<FeedSnapshot> {
        self.rx.try_recv().ok()
    }
}

impl Stream for FeedUpdates {
    type Item = FeedSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<FeedSnapshot>> {
        self.rx.poll_recv(cx)
    }
}

/// Sleep for `delay` unless cancelled first
async fn backoff(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

async fn run_feed(
    shared: Shared,
    connector: Arc<dyn Connector>,
    config: FeedConfig,
    cancel: CancellationToken,
) {
    let policy = &config.reconnect;
    let mut retries = 0u32;
    let mut reconnecting = false;

    loop {
        let attempt = tokio::time::timeout(config.connect_timeout(), connector.connect(&config.url));
        let connected = tokio::select! {
            _ = cancel.cancelled() => return,
            result = attempt => match result {
                Ok(connected) => connected,
                Err(_) => Err(FeedError::ConnectTimeout(config.connect_timeout_ms)),
            },
        };

        let mut frames = match connected {
            Ok(frames) => frames,
            Err(err) => {
                tracing::error!(url = %config.url, "Live feed connection failed: {err}");
                if reconnecting && policy.should_retry(retries) {
                    shared.lock().last_error = Some(err);
                    if !backoff(policy.delay(retries), &cancel).await {
                        return;
                    }
                    retries += 1;
                    continue;
                }
                // A feed that was open once keeps its window and ends Closed
                let end = if reconnecting {
                    FeedState::Closed
                } else {
                    FeedState::Failed
                };
                shared.finish(end, Some(err));
                return;
            }
        };

        if !shared.lock().transition(FeedState::Open) {
            return;
        }
        tracing::info!(url = %config.url, "Live feed open");
        retries = 0;
        reconnecting = false;

        let outcome = loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                next = frames.next() => next,
            };
            match next {
                Some(Ok(frame)) => {
                    let updated = {
                        let mut inner = shared.lock();
                        if !inner.state.accepts_packets() {
                            return;
                        }
                        inner.handle_frame(&frame)
                    };
                    if let Some(snapshot) = updated {
                        shared.notify(&snapshot);
                    }
                }
                Some(Err(err)) => break Some(err),
                None => break None,
            }
        };
        drop(frames);

        match &outcome {
            Some(err) => tracing::warn!(url = %config.url, "Live feed dropped: {err}"),
            None => tracing::info!(url = %config.url, "Live feed closed by remote"),
        }

        if policy.should_retry(retries) {
            {
                let mut inner = shared.lock();
                if let Some(err) = outcome {
                    inner.last_error = Some(err);
                }
                if !inner.transition(FeedState::Connecting) {
                    return;
                }
            }
            tracing::info!(
                attempt = retries + 1,
                max = policy.max_retries,
                "Reconnecting live feed"
            );
            if !backoff(policy.delay(retries), &cancel).await {
                return;
            }
            retries += 1;
            reconnecting = true;
            continue;
        }

        shared.finish(FeedState::Closed, outcome);
        return;
    }
}
