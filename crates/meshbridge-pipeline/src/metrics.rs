//! Pipeline run metrics.
//!
//! Thread-safe via atomics for counters and a mutex for the bounded
//! duration sample buffer.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Maximum number of duration samples kept in memory.
const MAX_DURATION_SAMPLES: usize = 256;

/// Metrics collector for pipeline runs.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Total runs started.
    pub runs_started: AtomicU64,
    /// Total runs that completed successfully.
    pub runs_succeeded: AtomicU64,
    /// Total runs that failed.
    pub runs_failed: AtomicU64,
    /// Recent run durations.
    duration_samples: Mutex<Vec<Duration>>,
}

/// Point-in-time view of the collected metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    /// Total runs started.
    pub runs_started: u64,
    /// Total runs that completed successfully.
    pub runs_succeeded: u64,
    /// Total runs that failed.
    pub runs_failed: u64,
    /// Mean duration over the retained samples, if any.
    pub mean_duration_ms: Option<u64>,
}

impl PipelineMetrics {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a run start.
    pub fn record_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful run with its duration.
    pub fn record_success(&self, duration: Duration) {
        self.runs_succeeded.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut samples) = self.duration_samples.lock() {
            if samples.len() >= MAX_DURATION_SAMPLES {
                samples.remove(0);
            }
            samples.push(duration);
        }
    }

    /// Record a failed run.
    pub fn record_failure(&self) {
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mean_duration_ms = self
            .duration_samples
            .lock()
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| {
                let total: u128 = s.iter().map(|d| d.as_millis()).sum();
                (total / s.len() as u128) as u64
            });

        MetricsSnapshot {
            runs_started: self.runs_started.load(Ordering::Relaxed),
            runs_succeeded: self.runs_succeeded.load(Ordering::Relaxed),
            runs_failed: self.runs_failed.load(Ordering::Relaxed),
            mean_duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        let metrics = PipelineMetrics::new();
        let snap = metrics.snapshot();
        assert_eq!(snap.runs_started, 0);
        assert_eq!(snap.mean_duration_ms, None);
    }

    #[test]
    fn test_counters_and_mean() {
        let metrics = PipelineMetrics::new();
        metrics.record_started();
        metrics.record_started();
        metrics.record_success(Duration::from_millis(100));
        metrics.record_success(Duration::from_millis(300));
        metrics.record_failure();

        let snap = metrics.snapshot();
        assert_eq!(snap.runs_started, 2);
        assert_eq!(snap.runs_succeeded, 2);
        assert_eq!(snap.runs_failed, 1);
        assert_eq!(snap.mean_duration_ms, Some(200));
    }

    #[test]
    fn test_sample_buffer_is_bounded() {
        let metrics = PipelineMetrics::new();
        for _ in 0..(MAX_DURATION_SAMPLES + 10) {
            metrics.record_success(Duration::from_millis(1));
        }
        let len = metrics.duration_samples.lock().expect("lock").len();
        assert_eq!(len, MAX_DURATION_SAMPLES);
    }
}
