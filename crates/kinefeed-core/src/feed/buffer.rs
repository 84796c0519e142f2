//! Rolling sample window

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::Arc;

use super::Sample;

/// Fixed-capacity FIFO window of the most recent samples
///
/// Samples stay in arrival order. Pushing into a full buffer evicts the
/// oldest sample first.
#[derive(Debug, Clone)]
pub struct FeedBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl FeedBuffer {
    /// Create an empty buffer holding at most `capacity` samples (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, returning the evicted sample if the window was full
    pub fn push(&mut self, sample: Sample) -> Option<Sample> {
        self.samples.push_back(sample);
        let mut evicted = None;
        while self.samples.len() > self.capacity {
            evicted = self.samples.pop_front();
        }
        evicted
    }

    /// Number of buffered samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if the next push will evict
    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    /// Iterate in arrival order
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Most recent sample
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Drop all samples
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Copy the current contents into an immutable snapshot
    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            samples: self.samples.iter().copied().collect(),
        }
    }
}

impl Default for FeedBuffer {
    fn default() -> Self {
        Self::new(super::DEFAULT_CAPACITY)
    }
}

/// Read-only copy of the rolling window handed to consumers
///
/// Clones share the same allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    samples: Arc<[Sample]>,
}

impl FeedSnapshot {
    /// Build a snapshot from samples in arrival order
    pub fn from_samples(samples: impl IntoIterator<Item = Sample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }

    /// The samples in arrival order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Timestamps in arrival order
    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time_s).collect()
    }

    /// Angles in arrival order
    pub fn angles(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.angle_deg).collect()
    }

    /// Smallest and largest angle in the window
    pub fn angle_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.samples.iter().map(|s| s.angle_deg);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), a| (lo.min(a), hi.max(a))))
    }
}

impl Default for FeedSnapshot {
    fn default() -> Self {
        Self::from_samples(std::iter::empty())
    }
}

impl Deref for FeedSnapshot {
    type Target = [Sample];

    fn deref(&self) -> &[Sample] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(i: usize) -> Sample {
        Sample::new(i as f64, i as f64 * 2.0)
    }

    #[test]
    fn test_push_below_capacity() {
        let mut buffer = FeedBuffer::new(3);
        assert_eq!(buffer.push(sample(0)), None);
        assert_eq!(buffer.push(sample(1)), None);
        assert_eq!(buffer.len(), 2);
        assert!(!buffer.is_full());
    }

    #[test]
    fn test_fifo_eviction() {
        let mut buffer = FeedBuffer::new(3);
        for i in 0..3 {
            buffer.push(sample(i));
        }
        let before = buffer.snapshot();

        assert_eq!(buffer.push(sample(3)), Some(sample(0)));

        let mut expected = before.samples()[1..].to_vec();
        expected.push(sample(3));
        assert_eq!(buffer.snapshot().samples(), expected.as_slice());
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let mut buffer = FeedBuffer::new(5);
        for i in 0..50 {
            buffer.push(sample(i));
            assert!(buffer.len() <= 5);
        }
        assert_eq!(buffer.latest(), Some(&sample(49)));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut buffer = FeedBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
        buffer.push(sample(1));
        buffer.push(sample(2));
        assert_eq!(buffer.snapshot().samples(), &[sample(2)]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut buffer = FeedBuffer::new(4);
        buffer.push(sample(1));
        let snapshot = buffer.snapshot();
        buffer.push(sample(2));
        buffer.clear();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0], sample(1));
    }

    #[test]
    fn test_snapshot_accessors() {
        let snapshot = FeedSnapshot::from_samples(vec![
            Sample::new(0.0, 45.0),
            Sample::new(0.1, 12.0),
            Sample::new(0.2, 60.0),
        ]);
        assert_eq!(snapshot.times(), vec![0.0, 0.1, 0.2]);
        assert_eq!(snapshot.angles(), vec![45.0, 12.0, 60.0]);
        assert_eq!(snapshot.angle_range(), Some((12.0, 60.0)));
        assert_eq!(FeedSnapshot::default().angle_range(), None);
    }
}
