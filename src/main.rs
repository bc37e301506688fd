use clap::Parser;
use es_meanrev::backtest::{BacktestConfig, Backtester};
use es_meanrev::cli::Cli;
use es_meanrev::config::{Config, PipelineMode};
use es_meanrev::telemetry::{self, PerfMonitor};

fn main() {
    if let Err(e) = run() {
        tracing::error!(error = %e, "backtest failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration; fall back to defaults when no file is present
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    telemetry::init_telemetry(&config.telemetry)?;

    // Command-line arguments win over the configuration file
    let data_file = cli.data_file.unwrap_or(config.data.file);
    let threshold = cli.threshold.unwrap_or(config.strategy.threshold);
    let window = cli.window.unwrap_or(config.strategy.window);
    let output_prefix = cli.output.unwrap_or(config.output.prefix);
    let threaded = cli.threaded || config.pipeline.mode == PipelineMode::Threaded;

    tracing::info!(
        data = %data_file.display(),
        threshold,
        window,
        threaded,
        "starting backtest"
    );

    let mut backtester = Backtester::new(BacktestConfig {
        commission: config.execution.commission,
        slippage_ticks: config.execution.slippage_ticks,
        tick_size: config.execution.tick_size,
        multiplier: config.execution.multiplier,
        initial_capital: config.execution.initial_capital,
        window,
    });

    let mut monitor = PerfMonitor::new();
    monitor.start();
    let metrics = if threaded {
        backtester.run_threaded(
            &data_file,
            threshold,
            config.pipeline.queue_capacity,
            config.pipeline.pin_core,
        )?
    } else {
        backtester.run(&data_file, threshold)?
    };
    monitor.stop();
    monitor.record_ticks(metrics.total_ticks);

    backtester.write_results(&output_prefix)?;

    println!(
        "{}",
        metrics.format_table(monitor.elapsed_secs(), monitor.avg_latency_micros())
    );

    tracing::info!(
        sharpe = metrics.sharpe_ratio,
        max_drawdown = metrics.max_drawdown,
        ticks_per_second = metrics.ticks_per_second,
        "backtest complete"
    );

    Ok(())
}
