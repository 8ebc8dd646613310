// Bounded in-memory history of per-poll metrics samples

use crate::models::MetricsSample;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Ring of recent samples, shared by the worker (push) and routes (query).
///
/// On every push, samples older than `max_age` (measured against the newest timestamp) are
/// evicted first, then the oldest samples until at most `capacity` remain.
pub struct MetricsHistory {
    samples: Mutex<VecDeque<MetricsSample>>,
    capacity: usize,
    max_age_ms: u64,
}

impl MetricsHistory {
    pub fn new(capacity: usize, max_age: Duration) -> Self {
        Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            max_age_ms: max_age.as_millis() as u64,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&self, sample: MetricsSample) {
        let mut samples = match self.samples.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let cutoff = sample.timestamp.saturating_sub(self.max_age_ms);
        samples.push_back(sample);
        while samples.front().is_some_and(|s| s.timestamp < cutoff) {
            samples.pop_front();
        }
        while samples.len() > self.capacity {
            samples.pop_front();
        }
    }

    /// Up to `limit` most recent samples, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<MetricsSample> {
        let samples = match self.samples.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let skip = samples.len().saturating_sub(limit);
        samples.iter().skip(skip).cloned().collect()
    }

    pub fn latest(&self) -> Option<MetricsSample> {
        self.samples.lock().ok().and_then(|s| s.back().cloned())
    }

    pub fn len(&self) -> usize {
        self.samples.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OverallHealth;

    fn sample(timestamp: u64) -> MetricsSample {
        MetricsSample {
            timestamp,
            cpu_percent: 1.0,
            memory_percent: 2.0,
            disk_percent: 3.0,
            healthy_count: 1,
            total_count: 1,
            overall: OverallHealth::Healthy,
        }
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let history = MetricsHistory::new(3, Duration::from_secs(3600));
        for ts in 1..=5 {
            history.push(sample(ts * 1000));
        }
        let ts: Vec<_> = history.recent(10).iter().map(|s| s.timestamp).collect();
        assert_eq!(ts, [3000, 4000, 5000]);
    }

    #[test]
    fn evicts_samples_older_than_max_age() {
        let history = MetricsHistory::new(100, Duration::from_secs(10));
        history.push(sample(1_000));
        history.push(sample(5_000));
        history.push(sample(15_000));
        let ts: Vec<_> = history.recent(10).iter().map(|s| s.timestamp).collect();
        assert_eq!(ts, [5_000, 15_000]);
    }

    #[test]
    fn recent_limits_to_newest_oldest_first() {
        let history = MetricsHistory::new(10, Duration::from_secs(3600));
        for ts in 1..=4 {
            history.push(sample(ts));
        }
        let ts: Vec<_> = history.recent(2).iter().map(|s| s.timestamp).collect();
        assert_eq!(ts, [3, 4]);
        assert_eq!(history.latest().unwrap().timestamp, 4);
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn empty_history() {
        let history = MetricsHistory::new(5, Duration::from_secs(60));
        assert!(history.is_empty());
        assert!(history.latest().is_none());
        assert!(history.recent(5).is_empty());
    }
}
