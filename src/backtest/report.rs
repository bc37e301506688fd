//! CSV result artifacts
//!
//! Equity curve and trade log writers, two decimal places for money fields.

use super::{EquityPoint, Trade};
use anyhow::Context;
use std::path::Path;

pub(crate) fn write_equity_curve(path: &Path, curve: &[EquityPoint]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record(["timestamp", "equity"])?;
    for point in curve {
        writer.write_record([
            point.timestamp.to_string(),
            format!("{:.2}", point.equity),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub(crate) fn write_trades(path: &Path, trades: &[Trade]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record([
        "entry_time",
        "exit_time",
        "entry_price",
        "exit_price",
        "direction",
        "pnl",
        "duration_us",
    ])?;
    for trade in trades {
        writer.write_record([
            trade.entry_time.to_string(),
            trade.exit_time.to_string(),
            format!("{:.2}", trade.entry_price),
            format!("{:.2}", trade.exit_price),
            trade.direction.to_string(),
            format!("{:.2}", trade.pnl),
            trade.duration.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
