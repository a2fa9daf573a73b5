pub mod bucket;
pub mod chart;
pub mod config;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod types;
