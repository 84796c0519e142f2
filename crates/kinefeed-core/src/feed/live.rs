//! Consumer-side feed owner
//!
//! [`LiveSampleFeed`] stands in for the view that shows the live chart. It
//! owns at most one [`FeedHandle`] and replaces it whenever the recording
//! identifier changes.

use std::sync::Arc;

use super::{open_with, Connector, FeedConfig, FeedError, FeedHandle, FeedSnapshot, WebSocketConnector};

type Renderer = Arc<dyn Fn(&FeedSnapshot) + Send + Sync + 'static>;

/// Live feed bound to the currently displayed recording
pub struct LiveSampleFeed {
    config: FeedConfig,
    connector: Arc<dyn Connector>,
    renderer: Option<Renderer>,
    handle: Option<FeedHandle>,
}

impl LiveSampleFeed {
    /// Create an unmounted feed using the WebSocket transport
    pub fn new(config: FeedConfig) -> Self {
        Self::with_connector(config, Arc::new(WebSocketConnector))
    }

    /// Create an unmounted feed using a custom transport
    pub fn with_connector(config: FeedConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            renderer: None,
            handle: None,
        }
    }

    /// Start streaming `recording_id`
    pub fn mount(&mut self, recording_id: &str) -> Result<(), FeedError> {
        self.set_recording_id(recording_id)
    }

    /// Switch to another recording
    ///
    /// The same identifier keeps the current connection. A different one
    /// closes the current connection before the new one is opened.
    pub fn set_recording_id(&mut self, recording_id: &str) -> Result<(), FeedError> {
        let unchanged = self
            .handle
            .as_ref()
            .is_some_and(|h| h.recording_id() == recording_id);
        if unchanged {
            return Ok(());
        }

        if let Some(old) = self.handle.take() {
            tracing::debug!(
                from = old.recording_id(),
                to = recording_id,
                "Switching live feed recording"
            );
            old.close();
        }

        let handle = open_with(recording_id, self.config.clone(), self.connector.clone())?;
        if let Some(renderer) = &self.renderer {
            let renderer = renderer.clone();
            handle.on_update(move |snapshot| renderer(snapshot));
        }
        self.handle = Some(handle);
        Ok(())
    }

    /// Register the renderer for this and every later connection
    pub fn on_update<F>(&mut self, renderer: F)
    where
        F: Fn(&FeedSnapshot) + Send + Sync + 'static,
    {
        let renderer: Renderer = Arc::new(renderer);
        if let Some(handle) = &self.handle {
            let renderer = renderer.clone();
            handle.on_update(move |snapshot| renderer(snapshot));
        }
        self.renderer = Some(renderer);
    }

    /// Close the connection permanently
    pub fn unmount(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
    }

    /// The active connection, if mounted
    pub fn handle(&self) -> Option<&FeedHandle> {
        self.handle.as_ref()
    }

    /// Recording currently streamed
    pub fn recording_id(&self) -> Option<&str> {
        self.handle.as_ref().map(|h| h.recording_id())
    }

    /// Copy of the current window, empty when unmounted
    pub fn snapshot(&self) -> FeedSnapshot {
        self.handle
            .as_ref()
            .map(|h| h.snapshot())
            .unwrap_or_default()
    }

    /// The feed configuration
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }
}

impl Drop for LiveSampleFeed {
    fn drop(&mut self) {
        self.unmount();
    }
}
