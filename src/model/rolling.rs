//! Rolling mean and variance of a price stream
//!
//! Two-phase estimator: exact Welford accumulation while the first window
//! fills, then an exponentially-weighted update that tracks regime change
//! with O(1) state.

/// Below this standard deviation the z-score is reported as zero
const MIN_STDDEV: f64 = 1e-10;

/// Online rolling statistics with constant-time updates
#[derive(Debug, Clone)]
pub struct RollingStatistics {
    window: u64,
    /// EWMA decay factor, 2 / (window + 1)
    alpha: f64,
    count: u64,
    mean: f64,
    variance: f64,
    /// Welford second-moment accumulator, used during the fill phase
    m2: f64,
}

impl RollingStatistics {
    /// Create an estimator over the given window size
    pub fn new(window: u64) -> Self {
        Self {
            window,
            alpha: 2.0 / (window as f64 + 1.0),
            count: 0,
            mean: 0.0,
            variance: 0.0,
            m2: 0.0,
        }
    }

    /// Absorb one sample. Constant time, no allocation.
    pub fn update(&mut self, value: f64) {
        let old_count = self.count;
        self.count += 1;

        if old_count < self.window {
            if old_count == 0 {
                self.mean = value;
                self.variance = 0.0;
                self.m2 = 0.0;
            } else {
                // Welford's recurrence; denominator is the post-update count
                let delta = value - self.mean;
                self.mean += delta / (old_count as f64 + 1.0);
                let delta2 = value - self.mean;
                self.m2 += delta * delta2;
                self.variance = self.m2 / (old_count as f64 + 1.0);
            }
        } else {
            self.update_ewma(value);
        }
    }

    fn update_ewma(&mut self, value: f64) {
        // The variance update needs the pre-update mean
        let old_mean = self.mean;
        self.mean = self.alpha * value + (1.0 - self.alpha) * old_mean;

        let delta = value - old_mean;
        self.variance = (1.0 - self.alpha) * (self.variance + self.alpha * delta * delta);

        if self.variance < 0.0 {
            self.variance = 0.0;
        }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn stddev(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Standardized deviation of `value` from the rolling mean; zero while
    /// the standard deviation is degenerate.
    pub fn zscore(&self, value: f64) -> f64 {
        let sd = self.stddev();
        if sd > MIN_STDDEV {
            (value - self.mean) / sd
        } else {
            0.0
        }
    }

    /// Number of samples absorbed
    pub fn count(&self) -> u64 {
        self.count
    }

    /// True once a full window of samples has been seen
    pub fn is_ready(&self) -> bool {
        self.count >= self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_input() {
        let mut stats = RollingStatistics::new(100);
        for _ in 0..150 {
            stats.update(100.0);
        }

        assert!((stats.mean() - 100.0).abs() < 0.1);
        assert!(stats.variance() < 1.0);
        assert!(stats.is_ready());
    }

    #[test]
    fn test_fill_phase_matches_sample_variance() {
        let mut stats = RollingStatistics::new(10);
        let samples = [100.0, 102.0, 98.0, 104.0, 96.0];
        for s in samples {
            stats.update(s);
        }

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

        assert!((stats.mean() - mean).abs() < 1e-12);
        assert!((stats.variance() - variance).abs() < 1e-12);
        assert!(!stats.is_ready());
    }

    #[test]
    fn test_zscore_of_mean_is_zero() {
        let mut stats = RollingStatistics::new(100);
        for i in 0..150 {
            stats.update(100.0 + ((i % 10) as f64 - 5.0));
        }

        assert!(stats.zscore(stats.mean()).abs() < 1e-9);

        // Z-score grows with distance from the mean
        let z1 = stats.zscore(stats.mean() + stats.stddev());
        let z2 = stats.zscore(stats.mean() + 2.0 * stats.stddev());
        assert!(z2.abs() > z1.abs());
    }

    #[test]
    fn test_zscore_zero_when_degenerate() {
        let mut stats = RollingStatistics::new(10);
        for _ in 0..20 {
            stats.update(42.0);
        }
        assert_eq!(stats.zscore(1000.0), 0.0);
    }

    #[test]
    fn test_ready_exactly_at_window() {
        let mut stats = RollingStatistics::new(50);
        for i in 0..49 {
            stats.update(i as f64);
            assert!(!stats.is_ready());
        }
        stats.update(49.0);
        assert!(stats.is_ready());
        assert_eq!(stats.count(), 50);
    }

    #[test]
    fn test_variance_non_negative() {
        let mut stats = RollingStatistics::new(100);
        for i in 0..300 {
            stats.update((i % 50) as f64);
            assert!(stats.variance() >= 0.0);
        }
    }

    #[test]
    fn test_ewma_tracks_level_shift() {
        let mut stats = RollingStatistics::new(50);
        for _ in 0..50 {
            stats.update(100.0);
        }
        // Regime change: the EW mean should move toward the new level
        for _ in 0..200 {
            stats.update(110.0);
        }
        assert!(stats.mean() > 109.0);
        assert!(stats.mean() <= 110.0);
    }
}
