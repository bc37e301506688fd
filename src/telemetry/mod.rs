//! Telemetry module
//!
//! Logging setup and wall-clock throughput monitoring

mod logging;
mod perf;

pub use logging::init_logging;
pub use perf::PerfMonitor;

use crate::config::TelemetryConfig;

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    init_logging(&config.log_level, config.log_file.as_deref())
}
