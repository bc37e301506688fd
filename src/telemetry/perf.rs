//! Wall-clock throughput monitor

use std::time::{Duration, Instant};

/// Measures one processing window and the per-tick latency over it
#[derive(Debug, Default)]
pub struct PerfMonitor {
    started_at: Option<Instant>,
    elapsed: Duration,
    tick_count: u64,
}

impl PerfMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin the measurement window
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// End the measurement window
    pub fn stop(&mut self) {
        if let Some(started_at) = self.started_at.take() {
            self.elapsed = started_at.elapsed();
        }
    }

    pub fn record_tick(&mut self) {
        self.tick_count += 1;
    }

    pub fn record_ticks(&mut self, count: u64) {
        self.tick_count += count;
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Seconds between start and stop
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Mean wall-clock cost per tick; zero while running or without ticks
    pub fn avg_latency_micros(&self) -> f64 {
        if self.started_at.is_none() && self.tick_count > 0 {
            self.elapsed.as_micros() as f64 / self.tick_count as f64
        } else {
            0.0
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_requires_stopped_window() {
        let mut monitor = PerfMonitor::new();
        monitor.start();
        monitor.record_ticks(100);
        // Still running: no latency yet
        assert_eq!(monitor.avg_latency_micros(), 0.0);

        monitor.stop();
        assert!(monitor.avg_latency_micros() >= 0.0);
        assert!(monitor.elapsed_secs() >= 0.0);
    }

    #[test]
    fn test_no_ticks_means_no_latency() {
        let mut monitor = PerfMonitor::new();
        monitor.start();
        monitor.stop();
        assert_eq!(monitor.avg_latency_micros(), 0.0);
    }

    #[test]
    fn test_record_and_reset() {
        let mut monitor = PerfMonitor::new();
        monitor.record_tick();
        monitor.record_ticks(9);
        assert_eq!(monitor.tick_count(), 10);

        monitor.reset();
        assert_eq!(monitor.tick_count(), 0);
        assert_eq!(monitor.elapsed_secs(), 0.0);
    }
}
