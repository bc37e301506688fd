//! Backtest analytics and reporting

use super::{EquityPoint, Trade};

/// Annualization factor for equity-sample volatility, treating samples as
/// one-second bars
const SECONDS_PER_TRADING_YEAR: f64 = 252.0 * 24.0 * 60.0 * 60.0;

/// Guard below which volatility is treated as zero
const MIN_VOLATILITY: f64 = 1e-10;

/// Aggregate performance of one backtest run
#[derive(Debug, Clone, Default)]
pub struct PerformanceMetrics {
    /// Fractional return on starting capital
    pub total_return: f64,
    /// Annualized volatility of equity-sample returns
    pub volatility: f64,
    /// Annualized risk-adjusted return, zero risk-free rate
    pub sharpe_ratio: f64,
    /// Largest fractional decline from the running equity peak
    pub max_drawdown: f64,
    /// Fraction of closed trades with positive PnL
    pub win_rate: f64,
    /// Mean holding period, in seconds
    pub avg_trade_length: f64,
    /// Data-time throughput of the replay
    pub ticks_per_second: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub total_ticks: u64,
}

impl PerformanceMetrics {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn compute(
        trades: &[Trade],
        equity_curve: &[EquityPoint],
        final_equity: f64,
        initial_capital: f64,
        max_drawdown: f64,
        start_time: i64,
        end_time: i64,
        tick_count: u64,
    ) -> Self {
        let ticks_per_second = if end_time > start_time {
            let seconds = (end_time - start_time) as f64 / 1e6;
            tick_count as f64 / seconds
        } else {
            0.0
        };

        let mut metrics = Self {
            max_drawdown,
            ticks_per_second,
            total_ticks: tick_count,
            ..Self::default()
        };

        if trades.is_empty() {
            return metrics;
        }

        metrics.total_return = (final_equity - initial_capital) / initial_capital;

        metrics.total_trades = trades.len();
        metrics.winning_trades = trades.iter().filter(|t| t.pnl > 0.0).count();
        metrics.win_rate = metrics.winning_trades as f64 / metrics.total_trades as f64;

        let total_duration: f64 = trades.iter().map(|t| t.duration as f64).sum();
        metrics.avg_trade_length = total_duration / metrics.total_trades as f64 / 1e6;

        metrics.volatility = annualized_volatility(equity_curve);

        if metrics.volatility > MIN_VOLATILITY {
            metrics.sharpe_ratio = metrics.total_return / metrics.volatility * 252.0_f64.sqrt();
        }

        metrics
    }

    /// Render the stdout summary
    pub fn format_table(&self, processing_secs: f64, avg_latency_us: f64) -> String {
        format!(
            "\n=== Backtest Results ===\n\
             Total Return: {:.4}%\n\
             Volatility: {:.4}%\n\
             Sharpe Ratio: {:.4}\n\
             Max Drawdown: {:.4}%\n\
             Win Rate: {:.4}%\n\
             Avg Trade Length: {:.4} seconds\n\
             Ticks Processed: {}\n\
             Ticks/Second: {:.4}\n\
             Total Trades: {}\n\
             Winning Trades: {}\n\
             Processing Time: {:.4} seconds\n\
             Avg Latency: {:.4} µs/tick\n",
            self.total_return * 100.0,
            self.volatility * 100.0,
            self.sharpe_ratio,
            self.max_drawdown * 100.0,
            self.win_rate * 100.0,
            self.avg_trade_length,
            self.total_ticks,
            self.ticks_per_second,
            self.total_trades,
            self.winning_trades,
            processing_secs,
            avg_latency_us,
        )
    }
}

/// Population standard deviation of adjacent equity-sample returns, scaled
/// as if the samples were one-second bars.
fn annualized_volatility(equity_curve: &[EquityPoint]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let mut returns = Vec::with_capacity(equity_curve.len() - 1);
    for pair in equity_curve.windows(2) {
        if pair[0].equity > 0.0 {
            returns.push((pair[1].equity - pair[0].equity) / pair[0].equity);
        }
    }
    if returns.is_empty() {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

    variance.sqrt() * SECONDS_PER_TRADING_YEAR.sqrt()
}
