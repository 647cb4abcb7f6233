use serde::Serialize;
use std::collections::VecDeque;

/// Statistical snapshot of the history window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowStats {
    pub mean: f64,
    pub std_dev: f64,
    pub count: usize,
}

impl WindowStats {
    /// Calculates mean and population standard deviation of `values`.
    /// Returns None if there are no values.
    pub fn from_values<'a, I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a f64>,
        I::IntoIter: Clone,
    {
        let values = values.into_iter();
        let mut iter = values.clone();
        let first = *iter.next()?;

        // A flat window must report exactly zero spread, otherwise rounding in
        // the mean leaves a tiny sigma that turns every z-score into noise.
        if iter.all(|v| *v == first) {
            return Some(WindowStats {
                mean: first,
                std_dev: 0.0,
                count: values.count(),
            });
        }

        let count = values.clone().count();
        let (mut mean, mut std_dev) = moments(values.clone(), count, 1.0);

        // Sums of values near f64::MAX overflow; redo the pass scaled down.
        if !mean.is_finite() || !std_dev.is_finite() {
            let scale = values.clone().fold(0.0f64, |max, v| max.max(v.abs()));
            let (scaled_mean, scaled_std_dev) = moments(values, count, scale);
            mean = scaled_mean * scale;
            std_dev = scaled_std_dev * scale;
        }

        Some(WindowStats {
            mean,
            std_dev,
            count,
        })
    }

    /// Number of standard deviations `value` lies from the mean.
    /// A zero-spread window yields `0.0` instead of dividing by zero.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.std_dev == 0.0 {
            return 0.0;
        }
        let distance = value - self.mean;
        if distance.is_finite() {
            distance / self.std_dev
        } else {
            value / self.std_dev - self.mean / self.std_dev
        }
    }
}

/// Mean and population standard deviation of `values / scale`.
fn moments<'a>(
    values: impl Iterator<Item = &'a f64> + Clone,
    count: usize,
    scale: f64,
) -> (f64, f64) {
    let n = count as f64;
    let mean = values.clone().map(|v| v / scale).sum::<f64>() / n;

    // \sigma = \sqrt{ \frac{\sum (x - \mu)^2}{N} }
    let variance_sum: f64 = values.map(|v| (v / scale - mean).powi(2)).sum();
    (mean, (variance_sum / n).sqrt())
}

/// Bounded FIFO of the values the detector has learned from.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    capacity: usize,
    values: VecDeque<f64>,
}

impl HistoryWindow {
    /// Creates an empty window. `capacity` must be positive; the detector
    /// validates this before building one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends `value`, evicting the oldest entry when the window is full.
    pub fn admit(&mut self, value: f64) {
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn mean(&self) -> Option<f64> {
        self.stats().map(|s| s.mean)
    }

    /// Population standard deviation of the window.
    pub fn std_dev(&self) -> Option<f64> {
        self.stats().map(|s| s.std_dev)
    }

    pub fn stats(&self) -> Option<WindowStats> {
        WindowStats::from_values(&self.values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates the retained values, oldest first.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_population_std_dev() {
        let mut window = HistoryWindow::new(5);
        for v in [1.0, 3.0, 5.0] {
            window.admit(v);
        }

        let stats = window.stats().unwrap();
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.count, 3);
        // Variance = (4 + 0 + 4) / 3
        assert!((stats.std_dev - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_empty_window_has_no_stats() {
        let window = HistoryWindow::new(3);
        assert!(window.is_empty());
        assert!(window.stats().is_none());
        assert!(window.mean().is_none());
        assert!(window.std_dev().is_none());
    }

    #[test]
    fn test_flat_window_is_exactly_zero_spread() {
        let mut window = HistoryWindow::new(20);
        for _ in 0..20 {
            window.admit(0.1);
        }

        let stats = window.stats().unwrap();
        assert_eq!(stats.mean, 0.1);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.z_score(55.0), 0.0);
    }

    #[test]
    fn test_admit_evicts_oldest() {
        let mut window = HistoryWindow::new(3);
        for v in 1..=5 {
            window.admit(v as f64);
        }

        assert_eq!(window.len(), 3);
        assert!(window.is_full());
        assert_eq!(window.values().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_huge_values_keep_finite_stats() {
        let mut window = HistoryWindow::new(5);
        for v in [1.7e308, 1.7e308, 1.0] {
            window.admit(v);
        }

        let stats = window.stats().unwrap();
        assert!(stats.mean.is_finite());
        assert!(stats.std_dev.is_finite());
        assert!((stats.mean / 1.7e308 - 2.0 / 3.0).abs() < 1e-12);

        let z = stats.z_score(-1e308);
        assert!(z.is_finite());
        assert!((z + 2.662).abs() < 1e-3);
    }

    #[test]
    fn test_z_score_sign() {
        let stats = WindowStats {
            mean: 10.0,
            std_dev: 2.0,
            count: 4,
        };
        assert_eq!(stats.z_score(16.0), 3.0);
        assert_eq!(stats.z_score(4.0), -3.0);
    }
}
