//! Statistical models
//!
//! Online estimators over the mid-price stream

mod rolling;

pub use rolling::RollingStatistics;
