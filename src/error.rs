//! Error taxonomy for the analysis pipeline.
//! Every failure is fatal to the call that produced it — the core never
//! recovers locally, so a partial input can never yield silently-wrong metrics.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A required input file does not exist on disk.
    #[error("file not found: {0}")]
    MissingFile(String),

    /// A required column is absent from a loaded table.
    #[error("{file}: required column '{column}' is missing")]
    MissingColumn { file: String, column: String },

    /// A cell could not be parsed as the expected numeric type.
    #[error("{file}: row {row}, column '{column}': unparseable value")]
    BadField {
        file: String,
        row: usize,
        column: String,
    },

    /// An operation that needs at least one data point got none.
    #[error("empty series: {0}")]
    EmptySeries(String),

    /// Constant PnL series — the Sharpe-like ratio divides by a zero
    /// standard deviation. Surfaced, never masked as ±inf.
    #[error("PnL series has zero variance, Sharpe ratio undefined")]
    ZeroVariance,

    /// A tick-derived accessor was used before `load_ticks` ran.
    #[error("tick data was never loaded")]
    TicksNotLoaded,

    #[error("{file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
