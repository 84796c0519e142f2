//! One-line text rendering of a feed window

use kinefeed_core::feed::{FeedSnapshot, Sample};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Samples shown in the sparkline
pub const CHART_WIDTH: usize = 60;

/// Sparkline of the last `width` angles, scaled to their own range
pub fn sparkline(samples: &[Sample], width: usize) -> String {
    let tail = &samples[samples.len().saturating_sub(width)..];
    let (min, max) = tail.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
        (lo.min(s.angle_deg), hi.max(s.angle_deg))
    });
    let span = max - min;

    tail.iter()
        .map(|s| {
            if span <= f64::EPSILON {
                return BARS[0];
            }
            let level = ((s.angle_deg - min) / span * (BARS.len() - 1) as f64).round() as usize;
            BARS[level.min(BARS.len() - 1)]
        })
        .collect()
}

/// Status line for the latest window
pub fn status_line(snapshot: &FeedSnapshot) -> String {
    let Some(last) = snapshot.last() else {
        return "no live data yet".to_string();
    };
    let (min, max) = snapshot.angle_range().unwrap_or((last.angle_deg, last.angle_deg));
    format!(
        "{:>7.2}s {:>6.1}° [{:.1}..{:.1}] n={:<4} {}",
        last.time_s,
        last.angle_deg,
        min,
        max,
        snapshot.len(),
        sparkline(snapshot, CHART_WIDTH)
    )
}

/// Summary of a stored recording's chart
pub fn recording_summary(points: &[Sample]) -> String {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return "recording has no chart data".to_string();
    };
    let peak = points.iter().map(|s| s.angle_deg).fold(f64::NEG_INFINITY, f64::max);
    format!(
        "{} points, {:.1}s..{:.1}s, peak {:.1}° {}",
        points.len(),
        first.time_s,
        last.time_s,
        peak,
        sparkline(points, CHART_WIDTH)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn samples(angles: &[f64]) -> Vec<Sample> {
        angles
            .iter()
            .enumerate()
            .map(|(i, &a)| Sample::new(i as f64 * 0.1, a))
            .collect()
    }

    #[test]
    fn test_sparkline_scales_to_range() {
        assert_eq!(sparkline(&samples(&[0.0, 35.0, 70.0]), 10), "▁▅█");
        assert_eq!(sparkline(&samples(&[5.0, 5.0]), 10), "▁▁");
        assert_eq!(sparkline(&[], 10), "");
    }

    #[test]
    fn test_sparkline_keeps_newest() {
        let line = sparkline(&samples(&[70.0, 0.0, 70.0]), 2);
        assert_eq!(line, "▁█");
    }

    #[test]
    fn test_status_line() {
        let empty = FeedSnapshot::default();
        assert_eq!(status_line(&empty), "no live data yet");

        let snapshot = FeedSnapshot::from_samples(samples(&[40.0, 50.0]));
        let line = status_line(&snapshot);
        assert!(line.contains("50.0°"), "{line}");
        assert!(line.contains("[40.0..50.0]"), "{line}");
        assert!(line.contains("n=2"), "{line}");
    }

    #[test]
    fn test_recording_summary() {
        assert_eq!(recording_summary(&[]), "recording has no chart data");
        let summary = recording_summary(&samples(&[10.0, 60.0, 20.0]));
        assert!(summary.starts_with("3 points, 0.0s..0.2s, peak 60.0°"), "{summary}");
    }
}
