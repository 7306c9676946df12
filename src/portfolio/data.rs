//! # Portfolio Data Utilities
//!
//! $$
//! \gamma_k = 10^{a + k (b-a)/(n-1)},\qquad \Sigma = A^\top A
//! $$
//!
//! Risk-aversion grids and seeded synthetic universes.

use nalgebra::DMatrix;
use nalgebra::DVector;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::Distribution;
use rand_distr::StandardNormal;

use super::universe::AssetUniverse;
use crate::error::Result;

/// `n` values from `10^start_exp` to `10^stop_exp` inclusive, evenly spaced in
/// log10. A single point yields `10^start_exp`.
pub fn log_spaced_gammas(start_exp: f64, stop_exp: f64, n: usize) -> Vec<f64> {
  match n {
    0 => Vec::new(),
    1 => vec![10f64.powf(start_exp)],
    _ => {
      let step = (stop_exp - start_exp) / (n - 1) as f64;
      (0..n)
        .map(|k| 10f64.powf(start_exp + step * k as f64))
        .collect()
    }
  }
}

fn standard_normal(rng: &mut StdRng) -> f64 {
  StandardNormal.sample(rng)
}

fn gaussian_matrix(rng: &mut StdRng, n: usize) -> DMatrix<f64> {
  DMatrix::from_fn(n, n, |_, _| standard_normal(rng))
}

/// `mu_i = |N(0,1)|`, `Sigma = A'A` with standard normal `A`.
pub fn random_universe(n: usize, seed: u64) -> Result<AssetUniverse> {
  let mut rng = StdRng::seed_from_u64(seed);
  let mu = DVector::from_fn(n, |_, _| standard_normal(&mut rng).abs());
  let a = gaussian_matrix(&mut rng, n);
  let cov = a.transpose() * &a;
  AssetUniverse::new(mu, symmetrize(cov))
}

/// Uncorrelated assets with `mu_i = |N(0,1)|` and `sigma_i = |N(0,1)| + 0.1`.
pub fn random_diagonal_universe(n: usize, seed: u64) -> Result<AssetUniverse> {
  let mut rng = StdRng::seed_from_u64(seed);
  let mu = DVector::from_fn(n, |_, _| standard_normal(&mut rng).abs());
  let sigma = DVector::from_fn(n, |_, _| standard_normal(&mut rng).abs() + 0.1);
  let cov = DMatrix::from_diagonal(&sigma.map(|s| s * s));
  AssetUniverse::new(mu, cov)
}

/// Universe whose maximum Sharpe portfolio is known in closed form.
///
/// With `Sigma = A'A + I` and `mu = r_f + Sigma w / 10` for positive target
/// weights `w` summing to one, the tangency portfolio `Sigma^{-1}(mu - r_f)`
/// normalizes back to `w`. Returns the universe and `w`.
pub fn universe_with_tangency(
  n: usize,
  seed: u64,
  risk_free: f64,
) -> Result<(AssetUniverse, DVector<f64>)> {
  let mut rng = StdRng::seed_from_u64(seed);
  let a = gaussian_matrix(&mut rng, n);
  let cov = symmetrize(a.transpose() * &a + DMatrix::identity(n, n));

  let raw = DVector::from_fn(n, |_, _| standard_normal(&mut rng).abs() + 0.1);
  let target = &raw / raw.sum();
  let mu = (&cov * &target / 10.0).add_scalar(risk_free);

  Ok((AssetUniverse::new(mu, cov)?, target))
}

fn symmetrize(m: DMatrix<f64>) -> DMatrix<f64> {
  (&m + m.transpose()) * 0.5
}
