//! Stochastic return mode: correlated Gaussian draws from a covariance
//! matrix, Cholesky-factored once per run, sampled per path per month with
//! a seeded PRNG (reproducible across runs with the same seed).
//!
//! Enriched from the wider example pack — the teacher has no stochastic
//! return analog (its decrements are closed-form actuarial formulas) —
//! following `conman124-retirement/src/montecarlo.rs`'s
//! generic-over-`SeedableRng` pattern and `jgrazian-finplan`'s use of
//! `rand_distr::StandardNormal` for asset-class draws.

use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_pcg::Pcg64;

use super::ReturnGenerator;

/// Per-asset-class annual expected return and the annual covariance
/// matrix across asset classes (row-major, symmetric positive
/// semi-definite).
#[derive(Debug, Clone)]
pub struct ReturnModel {
    pub expected_returns: Vec<f64>,
    pub covariance: Vec<Vec<f64>>,
    pub allocation: Vec<f64>,
}

impl ReturnModel {
    pub fn asset_classes(&self) -> usize {
        self.expected_returns.len()
    }
}

/// Lower-triangular Cholesky factor `L` such that `L * L^T = covariance`.
/// The asset-class count in this core is small (single digits), so a
/// hand-rolled routine is used rather than pulling in a general linear
/// algebra crate — the same preference the teacher shows in
/// `reserves::discount`'s hand-rolled annuity-PV math over a numerics crate.
fn cholesky(matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = matrix.len();
    let mut l = vec![vec![0.0_f64; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[i][k] * l[j][k];
            }
            if i == j {
                l[i][j] = (matrix[i][i] - sum).max(0.0).sqrt();
            } else if l[j][j] > 0.0 {
                l[i][j] = (matrix[i][j] - sum) / l[j][j];
            }
        }
    }
    l
}

pub struct StochasticReturns {
    model: ReturnModel,
    cholesky_factor: Vec<Vec<f64>>,
    rng: Pcg64,
}

impl StochasticReturns {
    /// `seed` should be derived as `base_seed ^ path_index` per spec.md
    /// §4.F/§6, so each path gets an independent, reproducible stream.
    pub fn new(model: ReturnModel, seed: u64) -> Self {
        let cholesky_factor = cholesky(&model.covariance);
        StochasticReturns {
            model,
            cholesky_factor,
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    /// One correlated draw of monthly asset-class returns: sample an iid
    /// standard-normal vector, multiply by the Cholesky factor, scale mean
    /// and volatility to monthly, add the monthly mean.
    fn draw_asset_class_returns(&mut self) -> Vec<f64> {
        let n = self.model.asset_classes();
        let z: Vec<f64> = (0..n).map(|_| self.rng.sample(StandardNormal)).collect();

        let mut correlated = vec![0.0_f64; n];
        for i in 0..n {
            let mut sum = 0.0;
            for j in 0..=i {
                sum += self.cholesky_factor[i][j] * z[j];
            }
            correlated[i] = sum;
        }

        (0..n)
            .map(|i| {
                let monthly_mean = self.model.expected_returns[i] / 12.0;
                let monthly_vol_scale = 1.0 / 12.0_f64.sqrt();
                monthly_mean + correlated[i] * monthly_vol_scale
            })
            .collect()
    }
}

impl ReturnGenerator for StochasticReturns {
    fn monthly_return(&mut self, _month: u32) -> f64 {
        let asset_returns = self.draw_asset_class_returns();
        asset_returns
            .iter()
            .zip(self.model.allocation.iter())
            .map(|(r, w)| r * w)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_asset_model() -> ReturnModel {
        ReturnModel {
            expected_returns: vec![0.08, 0.03],
            covariance: vec![vec![0.03, 0.005], vec![0.005, 0.01]],
            allocation: vec![0.6, 0.4],
        }
    }

    #[test]
    fn same_seed_produces_identical_sequence() {
        let mut a = StochasticReturns::new(two_asset_model(), 42);
        let mut b = StochasticReturns::new(two_asset_model(), 42);
        for month in 0..24 {
            assert_eq!(a.monthly_return(month), b.monthly_return(month));
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = StochasticReturns::new(two_asset_model(), 1);
        let mut b = StochasticReturns::new(two_asset_model(), 2);
        let seq_a: Vec<f64> = (0..12).map(|m| a.monthly_return(m)).collect();
        let seq_b: Vec<f64> = (0..12).map(|m| b.monthly_return(m)).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn cholesky_reconstructs_covariance() {
        use approx::assert_relative_eq;

        let cov = vec![vec![4.0, 2.0], vec![2.0, 5.0]];
        let l = cholesky(&cov);
        // L * L^T should reconstruct the original matrix.
        let mut reconstructed = vec![vec![0.0; 2]; 2];
        for i in 0..2 {
            for j in 0..2 {
                for k in 0..2 {
                    reconstructed[i][j] += l[i][k] * l[j][k];
                }
            }
        }
        for i in 0..2 {
            for j in 0..2 {
                assert_relative_eq!(reconstructed[i][j], cov[i][j], epsilon = 1e-9);
            }
        }
    }
}
