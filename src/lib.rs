//! es-meanrev: tick-level mean-reversion backtesting engine for ES futures
//!
//! This library provides the core components for:
//! - Zero-copy tick ingest over a memory-mapped quote file
//! - Online rolling mean/variance of the mid-price (Welford fill,
//!   exponentially-weighted steady state)
//! - A three-state z-score signal machine (flat/long/short)
//! - Execution simulation with slippage and per-leg commission
//! - Performance analytics and CSV result artifacts
//! - An optional lock-free reader/compute thread split

pub mod backtest;
pub mod cli;
pub mod config;
pub mod data;
pub mod model;
pub mod pipeline;
pub mod signal;
pub mod telemetry;
