//! # Quadratic Program Solvers
//!
//! $$
//! \min_{x}\ \tfrac12 x^\top P x + q^\top x \quad \text{s.t.}\quad A x = b,\ x_i \ge 0\ (i \in \mathcal I)
//! $$
//!
//! Backend seam used by the portfolio optimizers: build a [`QuadraticProgram`],
//! hand it to a [`QpSolver`], read back the optimal point or a typed failure.

use thiserror::Error;

pub mod interior_point;
pub mod kkt;
pub mod problem;

pub use interior_point::ClarabelSettings;
pub use interior_point::ClarabelSolver;
pub use kkt::KktSolver;
pub use problem::QpSolution;
pub use problem::QuadraticProgram;

/// Failure reported by a quadratic program backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
  /// No point satisfies the constraints.
  #[error("primal infeasible: {0}")]
  Infeasible(String),
  /// The objective decreases without bound over the feasible set.
  #[error("dual infeasible (unbounded objective): {0}")]
  Unbounded(String),
  /// The backend cannot express part of the problem.
  #[error("unsupported by {backend}: {what}")]
  Unsupported {
    backend: &'static str,
    what: &'static str,
  },
  /// Problem data is inconsistent (shapes, indices, non-finite values).
  #[error("invalid problem: {0}")]
  InvalidProblem(String),
  /// The backend stopped without reaching an optimal point.
  #[error("numerical failure: {0}")]
  Numerical(String),
  /// Backend configuration was rejected.
  #[error("solver setup failed: {0}")]
  Setup(String),
}

/// A quadratic program backend.
pub trait QpSolver: Send + Sync {
  /// Short backend identifier used in logs.
  fn name(&self) -> &'static str;

  /// Solve `qp`, returning the optimal point or a typed failure.
  fn solve(&self, qp: &QuadraticProgram) -> Result<QpSolution, SolverError>;
}

/// Available backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverBackend {
  /// Interior-point conic solver, supports non-negativity bounds.
  #[default]
  Clarabel,
  /// Exact null-space KKT solve, equality constraints only.
  Kkt,
}

impl SolverBackend {
  /// Instantiate the backend.
  pub fn build(self, settings: &ClarabelSettings) -> Box<dyn QpSolver> {
    match self {
      Self::Clarabel => Box::new(ClarabelSolver::new(settings.clone())),
      Self::Kkt => Box::new(KktSolver::default()),
    }
  }
}
