//! Return Generator (spec component F): deterministic and stochastic
//! monthly return draws.

pub mod deterministic;
pub mod stochastic;
pub mod synthetic;

pub use deterministic::DeterministicReturns;
pub use stochastic::StochasticReturns;
pub use synthetic::SyntheticReturns;

/// Common interface over the three return modes. Implementations are
/// stateless except for their own internal RNG state (owned per path, not
/// shared), consistent with spec.md §5: the PRNG is per-path.
pub trait ReturnGenerator {
    /// The monthly return for the given month index (0-based). Mutates any
    /// internal RNG state; deterministic implementations ignore `month`
    /// beyond using it for diagnostics.
    fn monthly_return(&mut self, month: u32) -> f64;

    /// Whether this generator is a synthetic (no-market-data) fallback;
    /// surfaced in run metadata per spec.md §4.F.
    fn is_synthetic(&self) -> bool {
        false
    }
}
