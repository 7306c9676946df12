//! # Portfolio Types
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{\mathbf{w}} \frac{\mathbb E[R_p]-r_f}{\sigma_p}
//! $$
//!
//! Shared enums and result containers for portfolio optimization.

use nalgebra::DVector;
use serde::Deserialize;
use serde::Serialize;

/// Admissible weight set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightConstraint {
  /// Any real weights summing to one, short positions allowed.
  #[default]
  Unconstrained,
  /// Non-negative weights summing to one.
  LongOnly,
}

impl WeightConstraint {
  pub fn is_long_only(self) -> bool {
    matches!(self, Self::LongOnly)
  }
}

/// Realized statistics of a weight vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PortfolioStats {
  /// Model expected portfolio return `mu'w`.
  pub expected_return: f64,
  /// Portfolio volatility `sqrt(w' Sigma w)`.
  pub risk: f64,
  /// `(expected_return - risk_free) / risk`, zero for a riskless portfolio.
  pub sharpe: f64,
}

/// One solve of the risk-aversion sweep.
#[derive(Clone, Debug)]
pub struct FrontierPoint {
  /// Risk-aversion parameter.
  pub gamma: f64,
  /// Optimal weights for `gamma`.
  pub weights: DVector<f64>,
  /// `mu'w`.
  pub expected_return: f64,
  /// `sqrt(w' Sigma w)`.
  pub risk: f64,
}

impl FrontierPoint {
  /// Sharpe ratio of this point against `risk_free`.
  pub fn sharpe(&self, risk_free: f64) -> f64 {
    if self.risk > 1e-15 {
      (self.expected_return - risk_free) / self.risk
    } else {
      0.0
    }
  }
}

/// Maximum Sharpe ratio portfolio recovered from the convex reformulation.
#[derive(Clone, Debug)]
pub struct SharpeSolution {
  /// Fully invested weights `y / kappa`.
  pub weights: DVector<f64>,
  /// Scaled weights solving the reformulated program.
  pub y: DVector<f64>,
  /// Normalizer with `1'y = kappa`.
  pub kappa: f64,
  /// Optimal Sharpe ratio `1 / sqrt(y' Sigma y)`.
  pub sharpe: f64,
  /// `mu'w`.
  pub expected_return: f64,
  /// `sqrt(w' Sigma w)`.
  pub risk: f64,
}
