//! Backtesting module
//!
//! Replays quote files through the signal pipeline with simulated execution

mod analytics;
mod engine;
mod report;

pub use analytics::PerformanceMetrics;
pub use engine::{Backtester, EquityPoint, Trade};

/// Execution assumptions and run parameters.
///
/// Defaults model ES futures: $2.10 commission per side, one tick of
/// adverse slippage per fill, $50 per point per contract.
#[derive(Debug, Clone)]
pub struct BacktestConfig {
    /// Commission charged on each leg
    pub commission: f64,
    /// Adverse fill offset, in ticks
    pub slippage_ticks: f64,
    /// Minimum price increment
    pub tick_size: f64,
    /// Dollar value per point per contract
    pub multiplier: f64,
    /// Starting capital
    pub initial_capital: f64,
    /// Rolling statistics window
    pub window: u64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            commission: 2.10,
            slippage_ticks: 1.0,
            tick_size: 0.25,
            multiplier: 50.0,
            initial_capital: 100_000.0,
            window: 20_000,
        }
    }
}
