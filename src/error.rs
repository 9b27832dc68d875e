//! Error taxonomy for the projection core.
//!
//! Pure components (tax engine, RMD calculator, sequencer, cash-flow
//! aggregator) never fail; they return well-defined results for every
//! non-pathological input. Only the projection driver and the Monte Carlo
//! orchestrator surface [`CoreError`].

use thiserror::Error;

/// The five error kinds the core can produce.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Rejected at the scenario boundary before any computation runs.
    #[error("invalid input in field `{field}`: {reason}")]
    InputValidation { field: String, reason: String },

    /// No bracket table, RMD factor, or state rule is registered for the request.
    #[error("missing reference data: {0}")]
    ReferenceDataMissing(String),

    /// NaN or infinity appeared in a balance or return during a path.
    #[error("numeric degeneracy at path {path_index}, month {month_index}: {detail}")]
    NumericDegeneracy {
        path_index: u64,
        month_index: u32,
        detail: String,
    },

    /// External cancellation signal; the run ends promptly with no results.
    #[error("run cancelled")]
    Cancelled,

    /// Writing the row stream or summary failed; the run is still complete in-memory.
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
