//! # Maximum Sharpe Ratio
//!
//! $$
//! \min_{\mathbf y,\kappa}\ \mathbf y^\top \Sigma \mathbf y \quad\text{s.t.}\quad (\mu - r_f \mathbf 1)^\top \mathbf y = 1,\ \ \mathbf 1^\top \mathbf y = \kappa,\qquad \mathbf w^\* = \mathbf y^\* / \kappa^\*
//! $$
//!
//! The Sharpe ratio is invariant to positive scaling of `w`, so pinning the
//! excess return of `y` to one and minimizing its variance yields the tangency
//! portfolio after dividing by `kappa`.

use nalgebra::DMatrix;
use nalgebra::DVector;
use tracing::info;

use super::types::SharpeSolution;
use super::types::WeightConstraint;
use super::universe::AssetUniverse;
use crate::error::PortfolioError;
use crate::error::Result;
use crate::solver::QpSolver;
use crate::solver::QuadraticProgram;

const KAPPA_TOL: f64 = 1e-12;
/// Variance of `y` below this fraction of `|y|^2 max|Sigma_ij|` is treated as riskless.
const VARIANCE_TOL: f64 = 1e-9;

/// Program over `x = (y, kappa)` with `P = blockdiag(2 Sigma, 0)`.
fn sharpe_program(
  universe: &AssetUniverse,
  risk_free: f64,
  constraint: WeightConstraint,
) -> Result<QuadraticProgram> {
  let n = universe.n_assets();
  let excess = universe.excess_returns(risk_free);

  let mut p = DMatrix::<f64>::zeros(n + 1, n + 1);
  p.view_mut((0, 0), (n, n)).copy_from(&(universe.cov() * 2.0));

  let mut a = DMatrix::<f64>::zeros(2, n + 1);
  for i in 0..n {
    a[(0, i)] = excess[i];
    a[(1, i)] = 1.0;
  }
  a[(1, n)] = -1.0;
  let b = DVector::from_vec(vec![1.0, 0.0]);

  let qp = QuadraticProgram::new(p, DVector::zeros(n + 1))?.with_equalities(a, b)?;
  Ok(if constraint.is_long_only() {
    qp.with_nonnegative(0..=n)?
  } else {
    qp
  })
}

/// Fully invested weights `y / kappa`.
///
/// Fails with [`PortfolioError::SharpeUnattainable`] when `kappa` is not
/// strictly positive.
pub fn recover_weights(y: &DVector<f64>, kappa: f64) -> Result<DVector<f64>> {
  if !(kappa.is_finite() && kappa > KAPPA_TOL) {
    return Err(PortfolioError::SharpeUnattainable { kappa });
  }
  Ok(y / kappa)
}

/// Maximum Sharpe ratio portfolio through the convex reformulation.
///
/// Degenerate excess returns surface as [`PortfolioError::Infeasible`]; a
/// supremum not attained by a fully invested portfolio surfaces as
/// [`PortfolioError::SharpeUnattainable`]. A riskless combination with positive
/// excess return has no finite optimum and surfaces as
/// [`PortfolioError::Unbounded`].
pub fn max_sharpe(
  universe: &AssetUniverse,
  risk_free: f64,
  constraint: WeightConstraint,
  solver: &dyn QpSolver,
) -> Result<SharpeSolution> {
  if !risk_free.is_finite() {
    return Err(PortfolioError::NonFinite {
      what: "risk-free rate",
    });
  }

  let n = universe.n_assets();
  let qp = sharpe_program(universe, risk_free, constraint)?;
  let x = solver.solve(&qp)?.x;

  let y = x.rows(0, n).into_owned();
  let kappa = x[n];
  let weights = recover_weights(&y, kappa)?;

  let variance = universe.portfolio_variance(&y);
  let floor = VARIANCE_TOL * y.norm_squared() * universe.cov().amax().max(1.0);
  if !(variance.is_finite() && variance > floor) {
    return Err(PortfolioError::Unbounded {
      reason: format!("scaled portfolio has variance {variance:e}"),
    });
  }
  let sharpe = 1.0 / variance.sqrt();

  let expected_return = universe.portfolio_return(&weights);
  let risk = universe.portfolio_risk(&weights);
  info!(
    backend = solver.name(),
    n_assets = n,
    ?constraint,
    kappa,
    sharpe,
    "max sharpe solved"
  );

  Ok(SharpeSolution {
    weights,
    y,
    kappa,
    sharpe,
    expected_return,
    risk,
  })
}
