//! Signal state machine
//!
//! Enters against large z-score excursions, exits when the z-score crosses
//! back through zero. At most one transition per invocation.

use super::Signal;
use crate::model::RollingStatistics;

/// Three-state mean-reversion signal generator.
///
/// Entries use strict threshold comparisons; exits are non-strict so the
/// exact sign-crossing point closes the trade. While the statistics are not
/// ready the generator stays flat.
pub struct SignalGenerator {
    threshold: f64,
    current: Signal,
    last_zscore: f64,
}

impl SignalGenerator {
    /// Create a generator with the given entry threshold, in units of
    /// rolling standard deviation. Non-positive thresholds are accepted but
    /// produce undefined signal sequences.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            current: Signal::Flat,
            last_zscore: 0.0,
        }
    }

    /// Advance the state machine on one price observation
    pub fn generate(&mut self, price: f64, stats: &RollingStatistics) -> Signal {
        if !stats.is_ready() {
            return Signal::Flat;
        }

        let zscore = stats.zscore(price);
        self.last_zscore = zscore;

        match self.current {
            Signal::Flat => {
                if zscore < -self.threshold {
                    self.current = Signal::Long;
                } else if zscore > self.threshold {
                    self.current = Signal::Short;
                }
            }
            Signal::Long => {
                if zscore >= 0.0 {
                    self.current = Signal::Flat;
                }
            }
            Signal::Short => {
                if zscore <= 0.0 {
                    self.current = Signal::Flat;
                }
            }
        }

        self.current
    }

    /// Current state
    pub fn current(&self) -> Signal {
        self.current
    }

    /// Z-score observed by the most recent `generate` call
    pub fn last_zscore(&self) -> f64 {
        self.last_zscore
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
    }
}
