//! Configuration types for es-meanrev

use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub strategy: StrategyConfig,
    pub execution: ExecutionConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
    pub telemetry: TelemetryConfig,
}

/// Input data configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub file: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("data/ES_futures_sample.csv"),
        }
    }
}

/// Strategy parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Entry threshold in rolling standard deviations
    pub threshold: f64,
    /// Rolling statistics window
    pub window: u64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            threshold: 2.5,
            window: 20_000,
        }
    }
}

/// Execution cost assumptions
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Commission per leg
    pub commission: f64,
    /// Adverse fill offset in ticks
    pub slippage_ticks: f64,
    /// Minimum price increment
    pub tick_size: f64,
    /// Dollar value per point per contract
    pub multiplier: f64,
    pub initial_capital: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            commission: 2.10,
            slippage_ticks: 1.0,
            tick_size: 0.25,
            multiplier: 50.0,
            initial_capital: 100_000.0,
        }
    }
}

/// Reader/compute split configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub mode: PipelineMode,
    /// Ring capacity; must be a power of two
    pub queue_capacity: usize,
    /// Core to pin the compute thread to
    pub pin_core: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: PipelineMode::Inline,
            queue_capacity: 1 << 20,
            pin_core: None,
        }
    }
}

/// Whether the reader runs on its own thread
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineMode {
    #[default]
    Inline,
    Threaded,
}

/// Result artifact configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Prefix for the equity-curve and trade CSVs
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: String::from("results"),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: String::from("info"),
            log_file: Some(PathBuf::from("backtest.log")),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
