//! RAEngine Common - Shared utilities: configuration and logging
//!
//! This crate provides common functionality used across all RAEngine crates.

pub mod config;
pub mod logging;

pub use config::{
    AttackTable, AttackType, BandRange, Config, ConfigBuilder, KeywordList, LoggingConfig,
    Settings, Thresholds, Weights,
};
pub use logging::init_logging;
