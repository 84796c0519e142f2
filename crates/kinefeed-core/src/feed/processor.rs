//! Packet acceptance
//!
//! Runs the per-frame pipeline: decode, relevance check, timestamping and
//! windowing. The processor is synchronous and owns the rolling buffer; the
//! connection task drives it one frame at a time.

use serde::Serialize;

use super::{Frame, FeedBuffer, FeedSnapshot, Packet, PacketError, RecordingFilter, Sample};

/// Result of feeding one frame to the processor
#[derive(Debug, Clone, PartialEq)]
pub enum Ingest {
    /// The sample was appended to the window
    Accepted(Sample),
    /// The packet belongs to another recording
    Irrelevant,
    /// The frame could not be decoded
    Malformed,
}

/// Counters for frames seen by a processor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    /// Frames handed to the processor
    pub received: u64,
    /// Samples appended to the window
    pub accepted: u64,
    /// Packets for other recordings
    pub ignored: u64,
    /// Frames dropped as malformed
    pub malformed: u64,
    /// Samples pushed out of the window
    pub evicted: u64,
}

/// Per-feed packet pipeline
#[derive(Debug, Clone)]
pub struct FeedProcessor {
    filter: RecordingFilter,
    buffer: FeedBuffer,
    synthetic_step_s: f64,
    stats: FeedStats,
}

impl FeedProcessor {
    /// Create a processor with an empty window
    pub fn new(filter: RecordingFilter, capacity: usize, synthetic_step_s: f64) -> Self {
        Self {
            filter,
            buffer: FeedBuffer::new(capacity),
            synthetic_step_s,
            stats: FeedStats::default(),
        }
    }

    /// Process a transport frame
    pub fn ingest_frame(&mut self, frame: &Frame) -> Ingest {
        match frame {
            Frame::Text(text) => self.ingest_text(text),
            Frame::Binary(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => self.ingest_text(text),
                Err(_) => {
                    self.stats.received += 1;
                    self.reject(PacketError::InvalidUtf8)
                }
            },
        }
    }

    /// Process a text payload
    pub fn ingest_text(&mut self, text: &str) -> Ingest {
        self.stats.received += 1;
        match Packet::decode(text) {
            Ok(packet) => self.accept(packet),
            Err(e) => self.reject(e),
        }
    }

    /// Process an already decoded packet
    pub fn ingest_packet(&mut self, packet: Packet) -> Ingest {
        self.stats.received += 1;
        match packet.validate() {
            Ok(()) => self.accept(packet),
            Err(e) => self.reject(e),
        }
    }

    fn accept(&mut self, packet: Packet) -> Ingest {
        if !self.filter.accepts(packet.id.as_deref()) {
            self.stats.ignored += 1;
            return Ingest::Irrelevant;
        }

        let time_s = packet
            .time_s
            .unwrap_or(self.buffer.len() as f64 * self.synthetic_step_s);
        let sample = Sample::new(time_s, packet.angle_deg);

        if self.buffer.push(sample).is_some() {
            self.stats.evicted += 1;
        }
        self.stats.accepted += 1;
        Ingest::Accepted(sample)
    }

    fn reject(&mut self, err: PacketError) -> Ingest {
        tracing::warn!(recording = %self.filter, "Dropping malformed packet: {err}");
        self.stats.malformed += 1;
        Ingest::Malformed
    }

    /// The rolling window
    pub fn buffer(&self) -> &FeedBuffer {
        &self.buffer
    }

    /// Copy of the rolling window
    pub fn snapshot(&self) -> FeedSnapshot {
        self.buffer.snapshot()
    }

    /// Frame counters
    pub fn stats(&self) -> FeedStats {
        self.stats
    }

    /// The relevance filter
    pub fn filter(&self) -> &RecordingFilter {
        &self.filter
    }
}
