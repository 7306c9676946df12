//! # Asset Universe
//!
//! $$
//! \mu \in \mathbb R^n,\qquad \Sigma = \Sigma^\top \succeq 0
//! $$
//!
//! Validated expected returns and covariance shared by every optimizer.

use nalgebra::DMatrix;
use nalgebra::DVector;
use nalgebra::SymmetricEigen;
use ndarray::Array1;
use ndarray::Array2;

use super::types::PortfolioStats;
use crate::error::PortfolioError;
use crate::error::Result;

const SYMMETRY_TOL: f64 = 1e-10;
const PSD_TOL: f64 = 1e-10;

/// Expected returns and covariance of `n` assets.
#[derive(Clone, Debug)]
pub struct AssetUniverse {
  mu: DVector<f64>,
  cov: DMatrix<f64>,
}

impl AssetUniverse {
  /// Validate and wrap `mu` and `cov`.
  ///
  /// Fails on an empty universe, non-finite entries, a non-square or
  /// mis-sized covariance, asymmetry, or a negative eigenvalue beyond
  /// round-off.
  pub fn new(mu: DVector<f64>, cov: DMatrix<f64>) -> Result<Self> {
    let n = mu.len();
    if n == 0 {
      return Err(PortfolioError::EmptyUniverse);
    }
    if mu.iter().any(|v| !v.is_finite()) {
      return Err(PortfolioError::NonFinite {
        what: "expected returns",
      });
    }
    if !cov.is_square() {
      return Err(PortfolioError::NotSquare {
        rows: cov.nrows(),
        cols: cov.ncols(),
      });
    }
    if cov.nrows() != n {
      return Err(PortfolioError::DimensionMismatch {
        what: "covariance matrix",
        expected: n,
        found: cov.nrows(),
      });
    }
    if cov.iter().any(|v| !v.is_finite()) {
      return Err(PortfolioError::NonFinite {
        what: "covariance matrix",
      });
    }

    for i in 0..n {
      for j in (i + 1)..n {
        let delta = (cov[(i, j)] - cov[(j, i)]).abs();
        let scale = cov[(i, j)].abs().max(cov[(j, i)].abs()).max(1.0);
        if delta > SYMMETRY_TOL * scale {
          return Err(PortfolioError::NotSymmetric {
            row: i,
            col: j,
            delta,
          });
        }
      }
    }

    let eigenvalues = SymmetricEigen::new(cov.clone()).eigenvalues;
    let min_eigenvalue = eigenvalues.min();
    let scale = eigenvalues.amax().max(1.0);
    if min_eigenvalue < -PSD_TOL * scale {
      return Err(PortfolioError::NotPositiveSemiDefinite { min_eigenvalue });
    }

    Ok(Self { mu, cov })
  }

  /// Build from `ndarray` containers.
  pub fn from_ndarray(mu: &Array1<f64>, cov: &Array2<f64>) -> Result<Self> {
    let (rows, cols) = cov.dim();
    Self::new(
      DVector::from_iterator(mu.len(), mu.iter().copied()),
      DMatrix::from_fn(rows, cols, |i, j| cov[[i, j]]),
    )
  }

  pub fn n_assets(&self) -> usize {
    self.mu.len()
  }

  pub fn mu(&self) -> &DVector<f64> {
    &self.mu
  }

  pub fn cov(&self) -> &DMatrix<f64> {
    &self.cov
  }

  /// `mu - risk_free * 1`.
  pub fn excess_returns(&self, risk_free: f64) -> DVector<f64> {
    self.mu.add_scalar(-risk_free)
  }

  /// True when every off-diagonal covariance entry is exactly zero.
  pub fn is_diagonal(&self) -> bool {
    let n = self.n_assets();
    (0..n).all(|i| (0..n).all(|j| i == j || self.cov[(i, j)] == 0.0))
  }

  /// Per-asset volatilities `sqrt(Sigma_ii)`.
  pub fn volatilities(&self) -> DVector<f64> {
    self.cov.diagonal().map(|v| v.max(0.0).sqrt())
  }

  pub fn portfolio_return(&self, w: &DVector<f64>) -> f64 {
    self.mu.dot(w)
  }

  pub fn portfolio_variance(&self, w: &DVector<f64>) -> f64 {
    w.dot(&(&self.cov * w))
  }

  pub fn portfolio_risk(&self, w: &DVector<f64>) -> f64 {
    self.portfolio_variance(w).max(0.0).sqrt()
  }

  /// Fails unless `w` has one entry per asset and sums to one within `tol`.
  pub fn check_fully_invested(&self, w: &DVector<f64>, tol: f64) -> Result<()> {
    if w.len() != self.n_assets() {
      return Err(PortfolioError::DimensionMismatch {
        what: "weight vector",
        expected: self.n_assets(),
        found: w.len(),
      });
    }
    let sum = w.sum();
    if !((sum - 1.0).abs() <= tol) {
      return Err(PortfolioError::WeightsNotNormalized { sum });
    }
    Ok(())
  }

  /// Return, risk and Sharpe ratio of `w`.
  pub fn stats(&self, w: &DVector<f64>, risk_free: f64) -> Result<PortfolioStats> {
    if w.len() != self.n_assets() {
      return Err(PortfolioError::DimensionMismatch {
        what: "weight vector",
        expected: self.n_assets(),
        found: w.len(),
      });
    }

    let expected_return = self.portfolio_return(w);
    let risk = self.portfolio_risk(w);
    let sharpe = if risk > 1e-15 {
      (expected_return - risk_free) / risk
    } else {
      0.0
    };

    Ok(PortfolioStats {
      expected_return,
      risk,
      sharpe,
    })
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;

  fn two_assets() -> AssetUniverse {
    AssetUniverse::new(
      DVector::from_vec(vec![0.1, 0.2]),
      DMatrix::from_row_slice(2, 2, &[0.04, 0.01, 0.01, 0.09]),
    )
    .unwrap()
  }

  #[test]
  fn stats_match_hand_computation() {
    let u = two_assets();
    let w = DVector::from_vec(vec![0.5, 0.5]);
    let s = u.stats(&w, 0.05).unwrap();

    // var = 0.25 * (0.04 + 2 * 0.01 + 0.09) = 0.0375
    assert_abs_diff_eq!(s.expected_return, 0.15, epsilon = 1e-12);
    assert_abs_diff_eq!(s.risk, 0.0375f64.sqrt(), epsilon = 1e-12);
    assert_abs_diff_eq!(s.sharpe, 0.1 / 0.0375f64.sqrt(), epsilon = 1e-12);
  }

  #[test]
  fn rejects_empty_universe() {
    let err = AssetUniverse::new(DVector::zeros(0), DMatrix::zeros(0, 0)).unwrap_err();
    assert_eq!(err, PortfolioError::EmptyUniverse);
  }

  #[test]
  fn rejects_non_square_covariance() {
    let err = AssetUniverse::new(DVector::zeros(2), DMatrix::zeros(2, 3)).unwrap_err();
    assert_eq!(err, PortfolioError::NotSquare { rows: 2, cols: 3 });
  }

  #[test]
  fn rejects_dimension_mismatch() {
    let err = AssetUniverse::new(DVector::zeros(3), DMatrix::identity(2, 2)).unwrap_err();
    assert!(matches!(
      err,
      PortfolioError::DimensionMismatch {
        expected: 3,
        found: 2,
        ..
      }
    ));
  }

  #[test]
  fn rejects_asymmetric_covariance() {
    let cov = DMatrix::from_row_slice(2, 2, &[1.0, 0.2, 0.3, 1.0]);
    let err = AssetUniverse::new(DVector::zeros(2), cov).unwrap_err();
    assert!(matches!(err, PortfolioError::NotSymmetric { row: 0, col: 1, .. }));
  }

  #[test]
  fn rejects_indefinite_covariance() {
    // eigenvalues 3 and -1
    let cov = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
    let err = AssetUniverse::new(DVector::zeros(2), cov).unwrap_err();
    match err {
      PortfolioError::NotPositiveSemiDefinite { min_eigenvalue } => {
        assert_abs_diff_eq!(min_eigenvalue, -1.0, epsilon = 1e-10)
      }
      other => panic!("unexpected error {other:?}"),
    }
  }

  #[test]
  fn accepts_singular_psd_covariance() {
    let cov = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
    assert!(AssetUniverse::new(DVector::zeros(2), cov).is_ok());
  }

  #[test]
  fn rejects_non_finite_returns() {
    let err = AssetUniverse::new(
      DVector::from_vec(vec![f64::NAN, 0.1]),
      DMatrix::identity(2, 2),
    )
    .unwrap_err();
    assert!(matches!(err, PortfolioError::NonFinite { .. }));
  }

  #[test]
  fn fully_invested_check() {
    let u = two_assets();
    assert!(u.check_fully_invested(&DVector::from_vec(vec![1.5, -0.5]), 1e-9).is_ok());
    assert_eq!(
      u.check_fully_invested(&DVector::from_vec(vec![0.5, 0.25]), 1e-9).unwrap_err(),
      PortfolioError::WeightsNotNormalized { sum: 0.75 }
    );
    assert!(matches!(
      u.check_fully_invested(&DVector::from_element(3, 1.0 / 3.0), 1e-9),
      Err(PortfolioError::DimensionMismatch { .. })
    ));
  }

  #[test]
  fn ndarray_inputs_round_into_nalgebra() {
    let u = AssetUniverse::from_ndarray(
      &array![0.1, 0.2],
      &array![[0.04, 0.01], [0.01, 0.09]],
    )
    .unwrap();
    assert_eq!(u.cov()[(0, 1)], 0.01);
    assert!(!u.is_diagonal());
    assert_abs_diff_eq!(u.volatilities()[1], 0.3, epsilon = 1e-12);
  }
}
