//! Log playback
//!
//! Replays a recorded angle file as if it were streamed live.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::{stream, FutureExt, StreamExt};

use super::{read_csv, DatalogError};
use crate::feed::{Connector, FeedError, Frame, FrameStream, Packet, Sample};

/// Transport that streams recorded samples at a fixed interval
#[derive(Debug, Clone)]
pub struct ReplayConnector {
    samples: Arc<[Sample]>,
    interval: Duration,
    id: Option<String>,
    looped: bool,
}

impl ReplayConnector {
    /// Replay `samples` with `interval` between packets
    pub fn new(samples: Vec<Sample>, interval: Duration) -> Self {
        Self {
            samples: samples.into(),
            interval,
            id: None,
            looped: false,
        }
    }

    /// Replay a CSV angle file
    pub fn from_csv<P: AsRef<Path>>(path: P, interval: Duration) -> Result<Self, DatalogError> {
        Ok(Self::new(read_csv(path)?, interval))
    }

    /// Tag every packet with a recording id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Restart from the first sample instead of ending the stream
    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    /// Skip samples recorded before `time_s`
    pub fn seek_to_time(mut self, time_s: f64) -> Self {
        let start = self
            .samples
            .iter()
            .position(|s| s.time_s >= time_s)
            .unwrap_or(self.samples.len());
        self.samples = self.samples[start..].into();
        self
    }

    /// Number of samples per pass
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if there is nothing to replay
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn frame(&self, index: usize) -> Option<Frame> {
        let sample = self.samples.get(index)?;
        let mut packet = Packet::new(sample.angle_deg).with_time(sample.time_s);
        packet.id = self.id.clone();
        Some(Frame::Text(packet.to_json()))
    }
}

impl Connector for ReplayConnector {
    fn connect(&self, url: &str) -> BoxFuture<'static, Result<FrameStream, FeedError>> {
        tracing::debug!(%url, samples = self.samples.len(), "Replaying angle log");
        let replay = self.clone();
        async move {
            // `sent` counts frames across passes so every wrap is paced too
            let frames = stream::unfold(0usize, move |sent| {
                let replay = replay.clone();
                async move {
                    let index = if replay.looped && !replay.samples.is_empty() {
                        sent % replay.samples.len()
                    } else {
                        sent
                    };
                    let frame = replay.frame(index)?;
                    if sent > 0 {
                        tokio::time::sleep(replay.interval).await;
                    }
                    Some((Ok(frame), sent + 1))
                }
            });
            Ok(frames.boxed())
        }
        .boxed()
    }
}
