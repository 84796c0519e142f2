//! Wire packets and buffered samples

use serde::{Deserialize, Serialize};

use super::PacketError;

/// One joint-angle measurement held in the rolling window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Time of the measurement in seconds
    pub time_s: f64,
    /// Joint angle in degrees
    pub angle_deg: f64,
}

impl Sample {
    /// Create a new sample
    pub fn new(time_s: f64, angle_deg: f64) -> Self {
        Self { time_s, angle_deg }
    }
}

/// Packet as received from the telemetry endpoint
///
/// `time_s` and `id` are optional on the wire; `null` counts as absent.
/// Unknown fields are ignored so devices can attach extra diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    /// Source timestamp in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_s: Option<f64>,
    /// Joint angle in degrees
    pub angle_deg: f64,
    /// Recording the packet belongs to; absent means the live channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Packet {
    /// Create a packet without timestamp or recording id
    pub fn new(angle_deg: f64) -> Self {
        Self {
            time_s: None,
            angle_deg,
            id: None,
        }
    }

    /// Attach a source timestamp
    pub fn with_time(mut self, time_s: f64) -> Self {
        self.time_s = Some(time_s);
        self
    }

    /// Attach a recording id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Decode and validate a text payload
    pub fn decode(text: &str) -> Result<Self, PacketError> {
        let packet: Packet = serde_json::from_str(text)?;
        packet.validate()?;
        Ok(packet)
    }

    /// Reject non-finite numbers
    pub fn validate(&self) -> Result<(), PacketError> {
        if !self.angle_deg.is_finite() {
            return Err(PacketError::NonFinite {
                field: "angle_deg",
                value: self.angle_deg,
            });
        }
        if let Some(t) = self.time_s {
            if !t.is_finite() {
                return Err(PacketError::NonFinite {
                    field: "time_s",
                    value: t,
                });
            }
        }
        Ok(())
    }

    /// Encode as a JSON text payload
    pub fn to_json(&self) -> String {
        // Only fails for non-string map keys, which this type cannot contain
        serde_json::to_string(self).unwrap_or_default()
    }
}
