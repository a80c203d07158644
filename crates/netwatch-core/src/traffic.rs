// ── Cumulative-counter rate derivation ──
//
// The backend reports monotonically increasing byte totals per interface.
// Throughput is the forward difference between two samples divided by the
// elapsed time. No smoothing — charts apply their own visual smoothing, so
// sample-to-sample jitter is expected.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Instantaneous throughput derived from two counter samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throughput {
    pub sent_bps: f64,
    pub recv_bps: f64,
}

/// One recorded counter reading for an interface.
#[derive(Debug, Clone, Copy)]
struct CounterSample {
    bytes_sent: u64,
    bytes_recv: u64,
    sampled_at: DateTime<Utc>,
}

/// Per-interface memory of the last-seen cumulative counters.
///
/// Every interface present in a metrics response gets recorded on every
/// poll — not just the currently displayed one — so switching the displayed
/// interface reads against a fresh baseline instead of a stale counter
/// (which would render as a huge fake spike).
#[derive(Debug, Default)]
pub struct TrafficTracker {
    samples: HashMap<String, CounterSample>,
}

impl TrafficTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a counter sample and derive the throughput since the prior one.
    ///
    /// Returns `None` when no rate can be derived: no prior sample for this
    /// interface, or non-positive elapsed time. The new sample is stored as
    /// the baseline in every case, exactly once per call.
    ///
    /// Counters that decreased (device reset, counter wrap) clamp the
    /// affected direction to zero rather than going negative.
    #[allow(clippy::cast_precision_loss)]
    pub fn record(
        &mut self,
        interface: &str,
        bytes_sent: u64,
        bytes_recv: u64,
        now: DateTime<Utc>,
    ) -> Option<Throughput> {
        let current = CounterSample {
            bytes_sent,
            bytes_recv,
            sampled_at: now,
        };
        let prior = self.samples.insert(interface.to_owned(), current)?;

        let elapsed_ms = (now - prior.sampled_at).num_milliseconds();
        if elapsed_ms <= 0 {
            return None;
        }
        let elapsed_secs = elapsed_ms as f64 / 1000.0;

        Some(Throughput {
            sent_bps: bytes_sent.saturating_sub(prior.bytes_sent) as f64 / elapsed_secs,
            recv_bps: bytes_recv.saturating_sub(prior.bytes_recv) as f64 / elapsed_secs,
        })
    }

    /// Whether a baseline exists for `interface`.
    pub fn has_baseline(&self, interface: &str) -> bool {
        self.samples.contains_key(interface)
    }

    /// Drop the stored baseline for `interface`, if any. The next `record`
    /// call for it returns `None`.
    pub fn forget(&mut self, interface: &str) {
        self.samples.remove(interface);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;

    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn first_sample_stores_baseline_and_yields_no_rate() {
        let mut tracker = TrafficTracker::new();

        assert!(tracker.record("eth0", 1000, 2000, t0()).is_none());
        assert!(tracker.has_baseline("eth0"));
    }

    #[test]
    fn forward_difference_over_one_second() {
        let mut tracker = TrafficTracker::new();
        tracker.record("eth0", 1000, 2000, t0());

        let rate = tracker
            .record("eth0", 2000, 2500, t0() + TimeDelta::milliseconds(1000))
            .unwrap();

        assert_eq!(rate.sent_bps, 1000.0);
        assert_eq!(rate.recv_bps, 500.0);
    }

    #[test]
    fn sub_second_interval_scales_rate() {
        let mut tracker = TrafficTracker::new();
        tracker.record("eth0", 0, 0, t0());

        let rate = tracker
            .record("eth0", 500, 250, t0() + TimeDelta::milliseconds(500))
            .unwrap();

        assert_eq!(rate.sent_bps, 1000.0);
        assert_eq!(rate.recv_bps, 500.0);
    }

    #[test]
    fn zero_elapsed_yields_no_rate_but_replaces_baseline() {
        let mut tracker = TrafficTracker::new();
        tracker.record("eth0", 1000, 1000, t0());

        assert!(tracker.record("eth0", 9999, 9999, t0()).is_none());

        // The rejected sample still became the new baseline.
        let rate = tracker
            .record("eth0", 9999, 9999, t0() + TimeDelta::seconds(1))
            .unwrap();
        assert_eq!(rate.sent_bps, 0.0);
    }

    #[test]
    fn counter_regression_clamps_to_zero() {
        let mut tracker = TrafficTracker::new();
        tracker.record("eth0", 10_000, 20_000, t0());

        // Device reset: counters restart from a lower value.
        let rate = tracker
            .record("eth0", 100, 25_000, t0() + TimeDelta::seconds(1))
            .unwrap();

        assert_eq!(rate.sent_bps, 0.0);
        assert_eq!(rate.recv_bps, 5000.0);
    }

    #[test]
    fn non_decreasing_counters_never_go_negative() {
        let mut tracker = TrafficTracker::new();
        let samples = [(0u64, 0u64), (10, 5), (10, 5), (4000, 9000)];

        let mut now = t0();
        for (sent, recv) in samples {
            if let Some(rate) = tracker.record("wlan0", sent, recv, now) {
                assert!(rate.sent_bps >= 0.0);
                assert!(rate.recv_bps >= 0.0);
            }
            now += TimeDelta::seconds(2);
        }
    }

    #[test]
    fn interfaces_are_tracked_independently() {
        let mut tracker = TrafficTracker::new();
        tracker.record("eth0", 1000, 1000, t0());
        tracker.record("wlan0", 500, 500, t0());

        let rate = tracker
            .record("eth0", 2000, 2000, t0() + TimeDelta::seconds(1))
            .unwrap();
        assert_eq!(rate.sent_bps, 1000.0);

        // wlan0's baseline was untouched by eth0 traffic.
        let rate = tracker
            .record("wlan0", 600, 700, t0() + TimeDelta::seconds(1))
            .unwrap();
        assert_eq!(rate.sent_bps, 100.0);
        assert_eq!(rate.recv_bps, 200.0);
    }

    #[test]
    fn forget_resets_to_unavailable() {
        let mut tracker = TrafficTracker::new();
        tracker.record("eth0", 1000, 1000, t0());
        tracker.forget("eth0");

        assert!(!tracker.has_baseline("eth0"));
        assert!(
            tracker
                .record("eth0", 2000, 2000, t0() + TimeDelta::seconds(1))
                .is_none()
        );
    }
}
