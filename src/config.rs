//! Analysis configuration. Defaults match the original backtesting
//! setup; the environment (via `.env` in the binaries) and CLI flags
//! can override.

/// Default starting capital when nothing overrides it.
pub const DEFAULT_INITIAL_VALUE: f64 = 10_000_000.0;

#[derive(Clone, Copy, Debug)]
pub struct AnalysisConfig {
    /// Capital the strategy started with, the denominator of every
    /// return figure. Must be positive.
    pub initial_value: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            initial_value: DEFAULT_INITIAL_VALUE,
        }
    }
}

impl AnalysisConfig {
    /// Read `INITIAL_CAPITAL` from the environment, falling back to the
    /// default. Binaries call `dotenvy::dotenv()` beforehand so a local
    /// `.env` file participates.
    pub fn from_env() -> Self {
        let initial_value = std::env::var("INITIAL_CAPITAL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_INITIAL_VALUE);
        Self { initial_value }
    }

    pub fn with_initial_value(initial_value: f64) -> Self {
        Self { initial_value }
    }
}
