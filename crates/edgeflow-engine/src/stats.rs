//! Running performance statistics.
//!
//! Frame count and timings are updated together under one short lock, so a
//! monitoring thread always sees a snapshot where `average = total / count`.
//! Backend faults are an independent counter.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

#[derive(Debug, Default, Clone, Copy)]
struct Timing {
    frames: u64,
    total_us: u64,
    last_us: u64,
}

/// Cumulative frame timing counters.
#[derive(Debug, Default)]
pub struct StatisticsTracker {
    timing: Mutex<Timing>,
    backend_faults: AtomicU64,
}

/// Point-in-time copy of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatisticsSnapshot {
    pub frame_count: u64,
    /// `total_ms / frame_count`, 0.0 before the first frame
    pub average_ms: f64,
    pub last_ms: f64,
    pub total_ms: f64,
    /// Frames where the optimized backend failed and the fallback served
    pub backend_faults: u64,
}

/// Snapshot plus backend availability, formatted for humans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticsReport {
    pub snapshot: StatisticsSnapshot,
    pub optimized_available: bool,
}

#[inline]
fn us_to_ms(us: u64) -> f64 {
    us as f64 / 1000.0
}

/// True when the `frame_count`-th frame should emit a periodic report.
///
/// An interval of 0 disables periodic reports.
pub fn report_due(frame_count: u64, interval: u64) -> bool {
    interval > 0 && frame_count > 0 && frame_count % interval == 0
}

impl StatisticsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one processed frame and return the new frame count.
    pub fn update(&self, duration: Duration) -> u64 {
        let us = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        let mut timing = self.timing.lock();
        timing.frames += 1;
        timing.total_us = timing.total_us.saturating_add(us);
        timing.last_us = us;
        timing.frames
    }

    pub fn record_backend_fault(&self) {
        self.backend_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        let timing = *self.timing.lock();
        let average_ms = if timing.frames > 0 {
            us_to_ms(timing.total_us) / timing.frames as f64
        } else {
            0.0
        };

        StatisticsSnapshot {
            frame_count: timing.frames,
            average_ms,
            last_ms: us_to_ms(timing.last_us),
            total_ms: us_to_ms(timing.total_us),
            backend_faults: self.backend_faults.load(Ordering::Relaxed),
        }
    }

    /// Zero all counters.
    pub(crate) fn reset(&self) {
        *self.timing.lock() = Timing::default();
        self.backend_faults.store(0, Ordering::Relaxed);
    }
}

impl fmt::Display for StatisticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frames: {}, Avg Time: {:.2}ms, Last Time: {:.2}ms, Optimized: {}",
            self.snapshot.frame_count,
            self.snapshot.average_ms,
            self.snapshot.last_ms,
            if self.optimized_available { "Yes" } else { "No" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_empty_snapshot() {
        let snapshot = StatisticsTracker::new().snapshot();
        assert_eq!(snapshot.frame_count, 0);
        assert_eq!(snapshot.average_ms, 0.0);
        assert_eq!(snapshot.last_ms, 0.0);
    }

    #[test]
    fn test_update_accumulates() {
        let tracker = StatisticsTracker::new();
        assert_eq!(tracker.update(Duration::from_millis(2)), 1);
        assert_eq!(tracker.update(Duration::from_millis(4)), 2);

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.frame_count, 2);
        assert!((snapshot.total_ms - 6.0).abs() < 1e-9);
        assert!((snapshot.average_ms - 3.0).abs() < 1e-9);
        assert!((snapshot.last_ms - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_sub_millisecond_durations_are_kept() {
        let tracker = StatisticsTracker::new();
        tracker.update(Duration::from_micros(250));
        assert!((tracker.snapshot().last_ms - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_reset() {
        let tracker = StatisticsTracker::new();
        tracker.update(Duration::from_millis(1));
        tracker.record_backend_fault();
        tracker.reset();
        assert_eq!(tracker.snapshot(), StatisticsSnapshot::default());
    }

    #[test]
    fn test_concurrent_updates() {
        let tracker = Arc::new(StatisticsTracker::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || {
                    for _ in 0..250 {
                        tracker.update(Duration::from_micros(10));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.frame_count, 1000);
        assert!((snapshot.total_ms - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshots_are_consistent_under_updates() {
        let tracker = Arc::new(StatisticsTracker::new());
        let writers: Vec<_> = (0..2)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || {
                    for _ in 0..2000 {
                        tracker.update(Duration::from_micros(10));
                    }
                })
            })
            .collect();

        for _ in 0..2000 {
            let snapshot = tracker.snapshot();
            assert!((snapshot.total_ms - snapshot.frame_count as f64 * 0.01).abs() < 1e-6);
            if snapshot.frame_count > 0 {
                assert!((snapshot.average_ms - 0.01).abs() < 1e-9);
            }
        }
        for handle in writers {
            handle.join().unwrap();
        }
        assert_eq!(tracker.snapshot().frame_count, 4000);
    }

    #[test]
    fn test_report_due() {
        assert!(!report_due(100, 0));
        assert!(!report_due(0, 100));
        assert!(!report_due(99, 100));
        assert!(report_due(100, 100));
        assert!(report_due(200, 100));
        assert!(report_due(1, 1));
    }

    #[test]
    fn test_report_format() {
        let report = StatisticsReport {
            snapshot: StatisticsSnapshot {
                frame_count: 3,
                average_ms: 1.5,
                last_ms: 2.0,
                total_ms: 4.5,
                backend_faults: 0,
            },
            optimized_available: false,
        };
        assert_eq!(
            report.to_string(),
            "Frames: 3, Avg Time: 1.50ms, Last Time: 2.00ms, Optimized: No"
        );
    }
}
