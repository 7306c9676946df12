//! # Diagonal Covariance Closed Form
//!
//! $$
//! w_i \propto \frac{\mu_i - r_f}{\sigma_i^2},\qquad s_i = \frac{\mu_i - r_f}{\sigma_i},\qquad SR_p = \Big(\sum_i s_i^2\Big)^{1/2}
//! $$
//!
//! Maximum Sharpe weights for uncorrelated assets without a solver.

use nalgebra::DVector;
use tracing::debug;

use super::universe::AssetUniverse;
use crate::error::PortfolioError;
use crate::error::Result;

/// Closed-form maximum Sharpe portfolio for a diagonal covariance.
#[derive(Clone, Debug)]
pub struct DiagonalSharpe {
  /// Weights normalized to sum to one.
  pub weights: DVector<f64>,
  /// Individual asset Sharpe ratios `s_i`.
  pub asset_sharpes: DVector<f64>,
  /// Portfolio Sharpe ratio `|s|_2`.
  pub sharpe: f64,
}

pub fn diagonal_max_sharpe(universe: &AssetUniverse, risk_free: f64) -> Result<DiagonalSharpe> {
  if !universe.is_diagonal() {
    return Err(PortfolioError::NotDiagonal);
  }
  if !risk_free.is_finite() {
    return Err(PortfolioError::NonFinite {
      what: "risk-free rate",
    });
  }

  let variances = universe.cov().diagonal();
  if let Some(index) = variances.iter().position(|&v| v <= 0.0) {
    return Err(PortfolioError::ZeroVariance { index });
  }

  let excess = universe.excess_returns(risk_free);
  if excess.iter().all(|&e| e == 0.0) {
    return Err(PortfolioError::Infeasible {
      reason: "every asset has zero excess return".into(),
    });
  }

  let raw = excess.component_div(&variances);
  let total = raw.sum();
  if !(total > 0.0) {
    return Err(PortfolioError::SharpeUnattainable { kappa: total });
  }

  let asset_sharpes = excess.component_div(&variances.map(f64::sqrt));
  let sharpe = asset_sharpes.norm();
  debug!(n_assets = universe.n_assets(), sharpe, "diagonal closed form");

  Ok(DiagonalSharpe {
    weights: raw / total,
    asset_sharpes,
    sharpe,
  })
}
