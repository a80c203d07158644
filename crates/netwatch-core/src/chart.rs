// ── Bounded sliding-window chart data ──
//
// Fixed-capacity FIFO of (label, values) points shared by one or more
// parallel series. The network chart carries two series (sent, recv) on one
// label axis; the ping chart carries one.

use std::collections::VecDeque;

/// A bounded sliding window of chart points.
///
/// `push` appends exactly one point per series; once the window is full the
/// oldest point is evicted first. No aggregation, decimation, or
/// interpolation happens here — the render surface draws what it reads.
#[derive(Debug)]
pub struct ChartBuffer {
    capacity: usize,
    labels: VecDeque<String>,
    series: Vec<VecDeque<f64>>,
}

impl ChartBuffer {
    /// Create a buffer holding up to `capacity` points across `series_count`
    /// parallel series.
    pub fn new(capacity: usize, series_count: usize) -> Self {
        assert!(capacity > 0, "chart window capacity must be positive");
        assert!(series_count > 0, "chart needs at least one series");

        Self {
            capacity,
            labels: VecDeque::with_capacity(capacity),
            series: vec![VecDeque::with_capacity(capacity); series_count],
        }
    }

    /// Append one point per series, evicting the oldest point first when the
    /// window is full.
    ///
    /// # Panics
    ///
    /// Panics when `values.len()` differs from the registered series count —
    /// that is a caller bug, not a runtime condition.
    pub fn push(&mut self, label: impl Into<String>, values: &[f64]) {
        assert_eq!(
            values.len(),
            self.series.len(),
            "push requires one value per registered series"
        );

        if self.labels.len() == self.capacity {
            self.labels.pop_front();
            for series in &mut self.series {
                series.pop_front();
            }
        }

        self.labels.push_back(label.into());
        for (series, value) in self.series.iter_mut().zip(values) {
            series.push_back(*value);
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Labels in insertion order, oldest first.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Values of one series in insertion order, oldest first.
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of range for the registered series.
    pub fn series(&self, index: usize) -> impl Iterator<Item = f64> + '_ {
        self.series[index].iter().copied()
    }

    /// Most recent value of one series.
    pub fn latest(&self, index: usize) -> Option<f64> {
        self.series.get(index).and_then(|s| s.back()).copied()
    }

    /// Largest value across all series, for axis scaling. Zero when empty.
    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flatten()
            .copied()
            .fold(0.0_f64, f64::max)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn fills_up_to_capacity() {
        let mut buf = ChartBuffer::new(3, 1);
        buf.push("a", &[1.0]);
        buf.push("b", &[2.0]);

        assert_eq!(buf.len(), 2);
        assert_eq!(buf.labels().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(buf.series(0).collect::<Vec<_>>(), [1.0, 2.0]);
    }

    #[test]
    fn fifo_eviction_at_capacity() {
        let mut buf = ChartBuffer::new(30, 2);
        for i in 0..31 {
            #[allow(clippy::cast_precision_loss)]
            buf.push(format!("t{i}"), &[i as f64, (i * 10) as f64]);
        }

        // Capacity + 1 pushes: length pinned at capacity, the first point
        // evicted, the newest present.
        assert_eq!(buf.len(), 30);
        assert_eq!(buf.labels().next(), Some("t1"));
        assert_eq!(buf.labels().last(), Some("t30"));
        assert_eq!(buf.series(0).next(), Some(1.0));
        assert_eq!(buf.latest(0), Some(30.0));
        assert_eq!(buf.latest(1), Some(300.0));
    }

    #[test]
    fn eviction_keeps_series_aligned() {
        let mut buf = ChartBuffer::new(2, 2);
        buf.push("a", &[1.0, 10.0]);
        buf.push("b", &[2.0, 20.0]);
        buf.push("c", &[3.0, 30.0]);

        assert_eq!(buf.labels().collect::<Vec<_>>(), ["b", "c"]);
        assert_eq!(buf.series(0).collect::<Vec<_>>(), [2.0, 3.0]);
        assert_eq!(buf.series(1).collect::<Vec<_>>(), [20.0, 30.0]);
    }

    #[test]
    #[should_panic(expected = "one value per registered series")]
    fn push_with_wrong_arity_panics() {
        let mut buf = ChartBuffer::new(4, 2);
        buf.push("a", &[1.0]);
    }

    #[test]
    fn max_value_spans_all_series() {
        let mut buf = ChartBuffer::new(4, 2);
        assert_eq!(buf.max_value(), 0.0);

        buf.push("a", &[5.0, 80.0]);
        buf.push("b", &[12.0, 3.0]);

        assert_eq!(buf.max_value(), 80.0);
    }
}
