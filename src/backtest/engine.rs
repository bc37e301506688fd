//! Backtest execution engine
//!
//! Consumes ticks, maintains the position, realizes PnL on signal
//! transitions and records trades and the equity curve.

use super::{report, BacktestConfig, PerformanceMetrics};
use crate::data::{Tick, TickReader};
use crate::model::RollingStatistics;
use crate::pipeline;
use crate::signal::{Signal, SignalGenerator};
use chrono::DateTime;
use std::path::Path;

/// A closed round trip
#[derive(Debug, Clone)]
pub struct Trade {
    pub entry_time: i64,
    pub exit_time: i64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub direction: Signal,
    /// Net of exit commission
    pub pnl: f64,
    /// Microseconds held
    pub duration: i64,
}

/// Equity sampled at a position transition
#[derive(Debug, Clone, Copy)]
pub struct EquityPoint {
    pub timestamp: i64,
    pub equity: f64,
}

/// Totals accumulated over one replay pass
#[derive(Debug, Clone, Copy, Default)]
struct RunTotals {
    start_time: i64,
    end_time: i64,
    tick_count: u64,
    last_mid: f64,
    last_timestamp: i64,
}

/// Drives the tick pipeline and accounts for fills, commission and slippage.
pub struct Backtester {
    config: BacktestConfig,
    /// Slippage in price units
    slippage: f64,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,
    position: Signal,
    entry_price: f64,
    entry_time: i64,
    equity: f64,
    peak_equity: f64,
    max_drawdown: f64,
}

impl Backtester {
    /// Create an engine with the given execution assumptions
    pub fn new(config: BacktestConfig) -> Self {
        let mut engine = Self {
            slippage: config.slippage_ticks * config.tick_size,
            equity: config.initial_capital,
            peak_equity: config.initial_capital,
            max_drawdown: 0.0,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            position: Signal::Flat,
            entry_price: 0.0,
            entry_time: 0,
            config,
        };
        engine.seed_equity_curve();
        engine
    }

    /// Replay the file inline: the calling thread reads and computes.
    pub fn run(&mut self, path: impl AsRef<Path>, threshold: f64) -> anyhow::Result<PerformanceMetrics> {
        let reader = TickReader::open(path)?;
        self.reset_state();

        let mut stats = RollingStatistics::new(self.config.window);
        let mut signal_gen = SignalGenerator::new(threshold);
        let mut totals = RunTotals::default();

        for tick in reader {
            self.process_tick(&tick, &mut stats, &mut signal_gen, &mut totals);
        }

        Ok(self.finish(&totals))
    }

    /// Replay with the reader on its own thread, feeding this thread through
    /// a bounded lock-free ring.
    pub fn run_threaded(
        &mut self,
        path: impl AsRef<Path>,
        threshold: f64,
        queue_capacity: usize,
        pin_core: Option<usize>,
    ) -> anyhow::Result<PerformanceMetrics> {
        let reader = TickReader::open(path)?;
        self.reset_state();

        let mut stats = RollingStatistics::new(self.config.window);
        let mut signal_gen = SignalGenerator::new(threshold);
        let mut totals = RunTotals::default();

        pipeline::run_split(reader, queue_capacity, pin_core, |tick| {
            self.process_tick(&tick, &mut stats, &mut signal_gen, &mut totals);
        })?;

        Ok(self.finish(&totals))
    }

    /// Write `<prefix>.csv` (equity curve) and `<prefix>_trades.csv`
    pub fn write_results(&self, prefix: &str) -> anyhow::Result<()> {
        report::write_equity_curve(Path::new(&format!("{prefix}.csv")), &self.equity_curve)?;
        report::write_trades(Path::new(&format!("{prefix}_trades.csv")), &self.trades)?;
        Ok(())
    }

    /// Closed trades, in exit order
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Equity samples, one per transition
    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    pub fn equity(&self) -> f64 {
        self.equity
    }

    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }

    fn reset_state(&mut self) {
        self.trades.clear();
        self.equity_curve.clear();
        self.position = Signal::Flat;
        self.entry_price = 0.0;
        self.entry_time = 0;
        self.equity = self.config.initial_capital;
        self.peak_equity = self.config.initial_capital;
        self.max_drawdown = 0.0;
        self.seed_equity_curve();
    }

    fn seed_equity_curve(&mut self) {
        self.equity_curve.push(EquityPoint {
            timestamp: 0,
            equity: self.equity,
        });
    }

    fn process_tick(
        &mut self,
        tick: &Tick,
        stats: &mut RollingStatistics,
        signal_gen: &mut SignalGenerator,
        totals: &mut RunTotals,
    ) {
        if totals.tick_count == 0 {
            totals.start_time = tick.timestamp;
        }
        totals.end_time = tick.timestamp;
        totals.tick_count += 1;

        let mid = tick.mid();
        totals.last_mid = mid;
        totals.last_timestamp = tick.timestamp;

        stats.update(mid);
        let signal = signal_gen.generate(mid, stats);

        if signal != self.position {
            tracing::trace!(zscore = signal_gen.last_zscore(), %signal, "transition");
        }
        self.update_position(mid, tick.timestamp, signal);
    }

    fn finish(&mut self, totals: &RunTotals) -> PerformanceMetrics {
        // Force-close anything still open at the last observed mid
        if self.position != Signal::Flat && totals.tick_count > 0 {
            self.close_position(totals.last_mid, totals.last_timestamp);
        }

        if let (Some(start), Some(end)) = (
            DateTime::from_timestamp_micros(totals.start_time),
            DateTime::from_timestamp_micros(totals.end_time),
        ) {
            tracing::info!(
                ticks = totals.tick_count,
                period_start = %start,
                period_end = %end,
                "replay complete"
            );
        }

        PerformanceMetrics::compute(
            &self.trades,
            &self.equity_curve,
            self.equity,
            self.config.initial_capital,
            self.max_drawdown,
            totals.start_time,
            totals.end_time,
            totals.tick_count,
        )
    }

    /// Fill price with one leg of adverse slippage applied
    fn fill_price(&self, mid: f64, direction: Signal) -> f64 {
        match direction {
            Signal::Long => mid + self.slippage,
            Signal::Short => mid - self.slippage,
            Signal::Flat => mid,
        }
    }

    fn update_position(&mut self, price: f64, timestamp: i64, signal: Signal) {
        if signal == self.position {
            return;
        }

        if self.position != Signal::Flat {
            self.close_position(price, timestamp);
        }

        if signal != Signal::Flat {
            let fill = self.fill_price(price, signal);
            self.position = signal;
            self.entry_price = fill;
            self.entry_time = timestamp;
            // Entry leg commission
            self.equity -= self.config.commission;
        }

        self.equity_curve.push(EquityPoint {
            timestamp,
            equity: self.equity,
        });

        if self.equity > self.peak_equity {
            self.peak_equity = self.equity;
        }
        let drawdown = (self.peak_equity - self.equity) / self.peak_equity;
        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
        }
    }

    fn close_position(&mut self, price: f64, timestamp: i64) {
        if self.position == Signal::Flat {
            return;
        }

        // Closing a long sells, closing a short buys; both legs fill adversely
        let exit_direction = match self.position {
            Signal::Long => Signal::Short,
            Signal::Short => Signal::Long,
            Signal::Flat => unreachable!(),
        };
        let fill = self.fill_price(price, exit_direction);

        let mut pnl = match self.position {
            Signal::Long => (fill - self.entry_price) * self.config.multiplier,
            _ => (self.entry_price - fill) * self.config.multiplier,
        };
        pnl -= self.config.commission;

        self.equity += pnl;

        self.trades.push(Trade {
            entry_time: self.entry_time,
            exit_time: timestamp,
            entry_price: self.entry_price,
            exit_price: fill,
            direction: self.position,
            pnl,
            duration: timestamp - self.entry_time,
        });

        self.position = Signal::Flat;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn engine(window: u64) -> Backtester {
        Backtester::new(BacktestConfig {
            window,
            ..BacktestConfig::default()
        })
    }

    /// Four warmup ticks (mean 100, stddev 1), then a dip and a recovery
    /// that produce exactly one long round trip at threshold 1.05.
    fn round_trip_fixture() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        let prices = [99.0, 101.0, 99.0, 101.0, 97.0, 100.0];
        let mut contents = String::from("timestamp,bid,ask,volume\n");
        for (i, p) in prices.iter().enumerate() {
            contents.push_str(&format!("{},{p},{p},1\n", (i as i64 + 1) * 1_000_000));
        }
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_open_and_close_long() {
        let mut bt = engine(4);

        bt.update_position(100.0, 1, Signal::Long);
        assert_eq!(bt.position, Signal::Long);
        assert!((bt.entry_price - 100.25).abs() < 1e-9);
        assert!((bt.equity - 99_997.90).abs() < 1e-9);

        bt.update_position(102.0, 2, Signal::Flat);
        assert_eq!(bt.position, Signal::Flat);
        assert_eq!(bt.trades.len(), 1);

        let trade = &bt.trades[0];
        assert_eq!(trade.direction, Signal::Long);
        assert!((trade.exit_price - 101.75).abs() < 1e-9);
        // (101.75 - 100.25) * 50 - 2.10
        assert!((trade.pnl - 72.90).abs() < 1e-9);
        assert!((bt.equity - 100_070.80).abs() < 1e-9);
        assert!(trade.entry_time < trade.exit_time);
        assert_eq!(trade.duration, 1);
    }

    #[test]
    fn test_short_pnl_sign() {
        let mut bt = engine(4);

        bt.update_position(100.0, 1, Signal::Short);
        assert!((bt.entry_price - 99.75).abs() < 1e-9);

        bt.update_position(98.0, 2, Signal::Flat);
        let trade = &bt.trades[0];
        assert_eq!(trade.direction, Signal::Short);
        // Sold 99.75, bought back 98.25: (99.75 - 98.25) * 50 - 2.10
        assert!((trade.pnl - 72.90).abs() < 1e-9);
    }

    #[test]
    fn test_no_action_when_signal_unchanged() {
        let mut bt = engine(4);
        bt.update_position(100.0, 1, Signal::Flat);
        assert_eq!(bt.equity_curve.len(), 1); // seed point only
        assert!(bt.trades.is_empty());

        bt.update_position(100.0, 2, Signal::Long);
        bt.update_position(101.0, 3, Signal::Long);
        assert_eq!(bt.equity_curve.len(), 2); // seed + entry
    }

    #[test]
    fn test_peak_and_drawdown_invariants() {
        let mut bt = engine(4);
        let moves = [
            (100.0, 1, Signal::Long),
            (95.0, 2, Signal::Flat),
            (95.0, 3, Signal::Short),
            (99.0, 4, Signal::Flat),
        ];
        for (price, ts, signal) in moves {
            bt.update_position(price, ts, signal);
            assert!(bt.peak_equity >= bt.equity);
            assert!((0.0..=1.0).contains(&bt.max_drawdown));
        }
        assert!(bt.max_drawdown > 0.0);
        assert_eq!(bt.trades.len(), 2);
    }

    #[test]
    fn test_run_round_trip() {
        let file = round_trip_fixture();
        let mut bt = engine(4);
        let metrics = bt.run(file.path(), 1.05).unwrap();

        assert_eq!(metrics.total_ticks, 6);
        assert_eq!(metrics.total_trades, 1);
        assert_eq!(metrics.winning_trades, 1);
        assert_eq!(metrics.win_rate, 1.0);

        // Entry long 97.25 at t5, exit 99.75 at t6: pnl 122.90 less 2.10 entry leg
        assert!((bt.equity() - 100_120.80).abs() < 1e-6);
        assert!((metrics.total_return - 0.0012080).abs() < 1e-9);

        // Seed point plus two transitions
        assert_eq!(bt.equity_curve().len(), 3);
        let trade = &bt.trades()[0];
        assert_eq!(trade.direction, Signal::Long);
        assert!((trade.entry_price - 97.25).abs() < 1e-9);
        assert!((trade.exit_price - 99.75).abs() < 1e-9);
    }

    #[test]
    fn test_force_close_at_end_of_stream() {
        // Same fixture minus the recovery tick: the long stays open
        let mut file = NamedTempFile::new().unwrap();
        let prices = [99.0, 101.0, 99.0, 101.0, 97.0];
        let mut contents = String::from("timestamp,bid,ask,volume\n");
        for (i, p) in prices.iter().enumerate() {
            contents.push_str(&format!("{},{p},{p},1\n", (i as i64 + 1) * 1_000_000));
        }
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();

        let mut bt = engine(4);
        let metrics = bt.run(file.path(), 1.05).unwrap();

        // Force-closed at the last mid: sell 96.75 against entry 97.25
        assert_eq!(metrics.total_trades, 1);
        assert_eq!(metrics.winning_trades, 0);
        let trade = &bt.trades()[0];
        assert!((trade.pnl - (-27.10)).abs() < 1e-9);
        assert!((bt.equity() - 99_970.80).abs() < 1e-6);
        // The force-close records a trade but no further equity sample
        assert_eq!(bt.equity_curve().len(), 2);
    }

    #[test]
    fn test_run_is_repeatable() {
        let file = round_trip_fixture();
        let mut bt = engine(4);
        let first = bt.run(file.path(), 1.05).unwrap();
        let second = bt.run(file.path(), 1.05).unwrap();

        assert_eq!(first.total_ticks, second.total_ticks);
        assert_eq!(first.total_trades, second.total_trades);
        assert_eq!(first.total_return, second.total_return);
        assert_eq!(bt.trades().len(), 1);
    }

    #[test]
    fn test_threaded_matches_inline() {
        let file = round_trip_fixture();

        let mut inline = engine(4);
        let inline_metrics = inline.run(file.path(), 1.05).unwrap();

        let mut threaded = engine(4);
        let threaded_metrics = threaded
            .run_threaded(file.path(), 1.05, 1024, None)
            .unwrap();

        assert_eq!(inline_metrics.total_ticks, threaded_metrics.total_ticks);
        assert_eq!(inline_metrics.total_trades, threaded_metrics.total_trades);
        assert_eq!(inline_metrics.total_return, threaded_metrics.total_return);
        assert_eq!(inline.equity(), threaded.equity());
    }

    #[test]
    fn test_missing_file_propagates() {
        let mut bt = engine(4);
        assert!(bt.run("no_such_file.csv", 2.5).is_err());
    }
}
