//! Demo Mode - Simulated IMU knee-angle source for testing
//!
//! Generates a plausible knee flexion signal for UI testing without a sensor
//! connection. The simulated patient alternates between standing still and
//! walking bouts; while walking, each stride shows the small loading-response
//! bump followed by the large swing-phase flexion peak.

use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::{stream, FutureExt, StreamExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::feed::{Connector, FeedError, Frame, FrameStream, Packet, Sample};

/// Demo IMU simulator that generates knee angle samples
pub struct DemoSimulator {
    /// Time when simulation started (ms)
    start_time_ms: Option<u64>,
    /// Current gait state
    gait: GaitState,
    /// Time the current state ends (ms from start)
    state_ends_at_ms: u64,
    /// Stride duration of the current walking bout (ms)
    stride_ms: f64,
    /// Random number generator
    rng: StdRng,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GaitState {
    /// Standing still, knee nearly extended
    Standing,
    /// Walking, strides counted from `start_ms`
    Walking { start_ms: u64 },
}

/// Knee angle while standing
const STANDING_ANGLE_DEG: f64 = 3.0;

impl Default for DemoSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoSimulator {
    /// Create a new demo simulator
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a simulator with a fixed seed for reproducible output
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(mut rng: StdRng) -> Self {
        let first_walk = rng.gen_range(1000..3000);
        Self {
            start_time_ms: None,
            gait: GaitState::Standing,
            state_ends_at_ms: first_walk,
            stride_ms: 1100.0,
            rng,
        }
    }

    /// Advance the simulation and produce the sample at `elapsed_ms`
    ///
    /// The first call defines time zero.
    pub fn update(&mut self, elapsed_ms: u64) -> Sample {
        let start = *self.start_time_ms.get_or_insert(elapsed_ms);
        let sim_time = elapsed_ms.saturating_sub(start);

        self.update_gait_state(sim_time);

        let noise = self.rng.gen_range(-0.4..0.4);
        let angle = match self.gait {
            GaitState::Standing => {
                let t = sim_time as f64 / 1000.0;
                STANDING_ANGLE_DEG + 0.5 * (t * 0.8).sin()
            }
            GaitState::Walking { start_ms } => {
                let phase = (sim_time.saturating_sub(start_ms) as f64 / self.stride_ms).fract();
                stride_angle(phase)
            }
        };

        Sample::new(sim_time as f64 / 1000.0, (angle + noise).max(0.0))
    }

    /// Produce a wire packet for `elapsed_ms`
    pub fn packet(&mut self, elapsed_ms: u64, id: Option<&str>) -> Packet {
        let sample = self.update(elapsed_ms);
        Packet {
            time_s: Some(sample.time_s),
            angle_deg: sample.angle_deg,
            id: id.map(str::to_string),
        }
    }

    /// Check if the simulated patient is walking
    pub fn is_walking(&self) -> bool {
        matches!(self.gait, GaitState::Walking { .. })
    }

    /// Update the gait state machine
    fn update_gait_state(&mut self, sim_time: u64) {
        if sim_time < self.state_ends_at_ms {
            return;
        }
        match self.gait {
            GaitState::Standing => {
                self.gait = GaitState::Walking { start_ms: sim_time };
                self.stride_ms = self.rng.gen_range(950.0..1250.0);
                self.state_ends_at_ms = sim_time + self.rng.gen_range(8000..20000);
            }
            GaitState::Walking { .. } => {
                self.gait = GaitState::Standing;
                self.state_ends_at_ms = sim_time + self.rng.gen_range(3000..6000);
            }
        }
    }
}

/// Knee flexion over one stride, `phase` in [0, 1) starting at heel strike
fn stride_angle(phase: f64) -> f64 {
    let bump = |center: f64, width: f64| (-((phase - center) / width).powi(2)).exp();
    5.0 + 15.0 * bump(0.15, 0.07) + 55.0 * bump(0.72, 0.12)
}

/// Transport that streams simulated packets at a fixed rate
#[derive(Debug, Clone)]
pub struct DemoConnector {
    interval: Duration,
    id: Option<String>,
    seed: Option<u64>,
    timestamps: bool,
}

impl DemoConnector {
    /// Stream one packet every `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            id: None,
            seed: None,
            timestamps: true,
        }
    }

    /// Tag every packet with a recording id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Use a fixed simulator seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Omit `time_s` so the feed stamps packets itself
    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }
}

impl Connector for DemoConnector {
    fn connect(&self, url: &str) -> BoxFuture<'static, Result<FrameStream, FeedError>> {
        tracing::info!(%url, "Demo mode: streaming simulated knee angles");
        let config = self.clone();
        async move {
            let sim = match config.seed {
                Some(seed) => DemoSimulator::with_seed(seed),
                None => DemoSimulator::new(),
            };
            let step_ms = config.interval.as_millis() as u64;
            let frames = stream::unfold((sim, 0u64), move |(mut sim, elapsed_ms)| {
                let interval = config.interval;
                let id = config.id.clone();
                let timestamps = config.timestamps;
                async move {
                    if elapsed_ms > 0 {
                        tokio::time::sleep(interval).await;
                    }
                    let mut packet = sim.packet(elapsed_ms, id.as_deref());
                    if !timestamps {
                        packet.time_s = None;
                    }
                    let frame = Frame::Text(packet.to_json());
                    Some((Ok(frame), (sim, elapsed_ms + step_ms.max(1))))
                }
            });
            Ok(frames.boxed())
        }
        .boxed()
    }
}
