//! Service statistics

pub mod metrics;

pub use metrics::{ServiceStats, StatsSnapshot};
