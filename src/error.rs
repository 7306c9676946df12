//! # Errors
//!
//! Domain errors for universe validation, frontier sweeps and Sharpe solves.

use thiserror::Error;

use crate::solver::SolverError;

/// Errors surfaced by portfolio construction and optimization.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
  #[error("asset universe must contain at least one asset")]
  EmptyUniverse,

  #[error("{what} contains non-finite values")]
  NonFinite { what: &'static str },

  #[error("covariance matrix must be square, got {rows}x{cols}")]
  NotSquare { rows: usize, cols: usize },

  #[error("{what} has dimension {found}, expected {expected}")]
  DimensionMismatch {
    what: &'static str,
    expected: usize,
    found: usize,
  },

  #[error("covariance matrix is not symmetric at ({row}, {col}), |delta| = {delta:e}")]
  NotSymmetric { row: usize, col: usize, delta: f64 },

  #[error("covariance matrix is not positive semi-definite (min eigenvalue {min_eigenvalue:e})")]
  NotPositiveSemiDefinite { min_eigenvalue: f64 },

  #[error("risk-aversion grid is empty")]
  EmptyGrid,

  #[error("risk aversion must be finite and strictly positive, got {value} at index {index}")]
  InvalidRiskAversion { index: usize, value: f64 },

  #[error("covariance matrix is not diagonal")]
  NotDiagonal,

  #[error("asset {index} has zero variance")]
  ZeroVariance { index: usize },

  #[error("portfolio weights sum to {sum}, expected 1")]
  WeightsNotNormalized { sum: f64 },

  #[error("problem is infeasible: {reason}")]
  Infeasible { reason: String },

  #[error("problem is unbounded: {reason}")]
  Unbounded { reason: String },

  #[error("no fully invested portfolio attains the maximum Sharpe ratio (kappa = {kappa:e})")]
  SharpeUnattainable { kappa: f64 },

  #[error("solver failure: {0}")]
  Solver(SolverError),
}

impl From<SolverError> for PortfolioError {
  fn from(err: SolverError) -> Self {
    match err {
      SolverError::Infeasible(reason) => Self::Infeasible { reason },
      SolverError::Unbounded(reason) => Self::Unbounded { reason },
      other => Self::Solver(other),
    }
  }
}

pub type Result<T> = std::result::Result<T, PortfolioError>;
