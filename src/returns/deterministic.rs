//! Deterministic return mode: a pure function of (month, assumptions),
//! scalar monthly mean, no randomness.

use super::ReturnGenerator;

#[derive(Debug, Clone, Copy)]
pub struct DeterministicReturns {
    pub annual_mean: f64,
}

impl DeterministicReturns {
    pub fn new(annual_mean: f64) -> Self {
        DeterministicReturns { annual_mean }
    }
}

impl ReturnGenerator for DeterministicReturns {
    fn monthly_return(&mut self, _month: u32) -> f64 {
        self.annual_mean / 12.0
    }
}
