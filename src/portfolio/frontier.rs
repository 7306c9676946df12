//! # Efficient Frontier
//!
//! $$
//! \mathbf w(\gamma) = \arg\max_{\mathbf 1^\top \mathbf w = 1,\ \mathbf w \in \mathcal W}\ \mu^\top \mathbf w - \gamma\, \mathbf w^\top \Sigma \mathbf w
//! $$
//!
//! Risk-aversion sweep producing one frontier point per `gamma`, in input order.

use nalgebra::DMatrix;
use nalgebra::DVector;
use rayon::prelude::*;
use tracing::info;

use super::types::FrontierPoint;
use super::types::WeightConstraint;
use super::universe::AssetUniverse;
use crate::error::PortfolioError;
use crate::error::Result;
use crate::solver::QpSolver;
use crate::solver::QuadraticProgram;

/// Ordered sweep output.
#[derive(Clone, Debug, Default)]
pub struct Frontier {
  pub points: Vec<FrontierPoint>,
}

impl Frontier {
  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  pub fn gammas(&self) -> Vec<f64> {
    self.points.iter().map(|p| p.gamma).collect()
  }

  pub fn risks(&self) -> Vec<f64> {
    self.points.iter().map(|p| p.risk).collect()
  }

  pub fn returns(&self) -> Vec<f64> {
    self.points.iter().map(|p| p.expected_return).collect()
  }

  pub fn sharpe_ratios(&self, risk_free: f64) -> Vec<f64> {
    self.points.iter().map(|p| p.sharpe(risk_free)).collect()
  }

  /// Point with the highest Sharpe ratio; the earliest wins ties.
  pub fn best_sharpe(&self, risk_free: f64) -> Option<&FrontierPoint> {
    self.points.iter().fold(None, |best: Option<&FrontierPoint>, p| match best {
      Some(b) if b.sharpe(risk_free) >= p.sharpe(risk_free) => Some(b),
      _ => Some(p),
    })
  }

  /// Index of [`Frontier::best_sharpe`].
  pub fn best_sharpe_index(&self, risk_free: f64) -> Option<usize> {
    let best = self.best_sharpe(risk_free)?;
    self.points.iter().position(|p| std::ptr::eq(p, best))
  }
}

fn validate_gammas(gammas: &[f64]) -> Result<()> {
  if gammas.is_empty() {
    return Err(PortfolioError::EmptyGrid);
  }
  match gammas
    .iter()
    .enumerate()
    .find(|(_, &g)| !(g.is_finite() && g > 0.0))
  {
    Some((index, &value)) => Err(PortfolioError::InvalidRiskAversion { index, value }),
    None => Ok(()),
  }
}

/// Mean-variance program for one `gamma`: `min 0.5 w'(2 gamma Sigma)w - mu'w`
/// subject to `1'w = 1`.
fn frontier_program(
  universe: &AssetUniverse,
  gamma: f64,
  constraint: WeightConstraint,
) -> Result<QuadraticProgram> {
  let n = universe.n_assets();
  let qp = QuadraticProgram::new(universe.cov() * (2.0 * gamma), -universe.mu())?
    .with_equalities(DMatrix::from_element(1, n, 1.0), DVector::from_element(1, 1.0))?;

  Ok(if constraint.is_long_only() {
    qp.with_nonnegative(0..n)?
  } else {
    qp
  })
}

fn solve_point(
  universe: &AssetUniverse,
  gamma: f64,
  constraint: WeightConstraint,
  solver: &dyn QpSolver,
) -> Result<FrontierPoint> {
  let qp = frontier_program(universe, gamma, constraint)?;
  let weights = solver.solve(&qp)?.x;

  Ok(FrontierPoint {
    gamma,
    expected_return: universe.portfolio_return(&weights),
    risk: universe.portfolio_risk(&weights),
    weights,
  })
}

/// Sequential sweep over `gammas`.
///
/// Every `gamma` must be finite and strictly positive; otherwise the whole
/// sweep is rejected before any solve.
pub fn efficient_frontier(
  universe: &AssetUniverse,
  gammas: &[f64],
  constraint: WeightConstraint,
  solver: &dyn QpSolver,
) -> Result<Frontier> {
  validate_gammas(gammas)?;
  info!(
    backend = solver.name(),
    n_assets = universe.n_assets(),
    n_points = gammas.len(),
    ?constraint,
    "frontier sweep"
  );

  let points = gammas
    .iter()
    .map(|&g| solve_point(universe, g, constraint, solver))
    .collect::<Result<Vec<_>>>()?;

  Ok(Frontier { points })
}

/// Same as [`efficient_frontier`], solving points on the rayon pool.
pub fn par_efficient_frontier(
  universe: &AssetUniverse,
  gammas: &[f64],
  constraint: WeightConstraint,
  solver: &dyn QpSolver,
) -> Result<Frontier> {
  validate_gammas(gammas)?;
  info!(
    backend = solver.name(),
    n_assets = universe.n_assets(),
    n_points = gammas.len(),
    ?constraint,
    "parallel frontier sweep"
  );

  let points = gammas
    .par_iter()
    .map(|&g| solve_point(universe, g, constraint, solver))
    .collect::<Result<Vec<_>>>()?;

  Ok(Frontier { points })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;
  use crate::portfolio::data::log_spaced_gammas;
  use crate::portfolio::data::random_universe;
  use crate::solver::ClarabelSolver;
  use crate::solver::KktSolver;

  #[test]
  fn weights_are_fully_invested_for_every_gamma() {
    let u = random_universe(10, 1).unwrap();
    let gammas = log_spaced_gammas(-2.0, 3.0, 25);

    for solver in [
      &KktSolver::default() as &dyn QpSolver,
      &ClarabelSolver::default() as &dyn QpSolver,
    ] {
      let frontier = efficient_frontier(&u, &gammas, WeightConstraint::Unconstrained, solver).unwrap();
      assert_eq!(frontier.len(), gammas.len());
      for (p, &g) in frontier.points.iter().zip(gammas.iter()) {
        assert_eq!(p.gamma, g);
        assert_abs_diff_eq!(p.weights.sum(), 1.0, epsilon = 1e-6);
      }
    }
  }

  #[test]
  fn long_only_weights_are_non_negative() {
    let u = random_universe(8, 2).unwrap();
    let gammas = log_spaced_gammas(-1.0, 2.0, 10);
    let frontier = efficient_frontier(
      &u,
      &gammas,
      WeightConstraint::LongOnly,
      &ClarabelSolver::default(),
    )
    .unwrap();

    for p in &frontier.points {
      assert_abs_diff_eq!(p.weights.sum(), 1.0, epsilon = 1e-6);
      assert!(p.weights.iter().all(|&w| w > -1e-7));
    }
  }

  #[test]
  fn risk_and_return_fall_as_aversion_rises() {
    let u = random_universe(6, 3).unwrap();
    let gammas = log_spaced_gammas(-1.0, 2.0, 12);
    let frontier =
      efficient_frontier(&u, &gammas, WeightConstraint::Unconstrained, &KktSolver::default()).unwrap();

    let risks = frontier.risks();
    let returns = frontier.returns();
    assert!(risks.windows(2).all(|w| w[1] <= w[0] + 1e-9));
    assert!(returns.windows(2).all(|w| w[1] <= w[0] + 1e-9));
  }

  #[test]
  fn rejects_non_positive_gamma_upfront() {
    let u = random_universe(4, 4).unwrap();
    let err = efficient_frontier(
      &u,
      &[1.0, 0.0, -2.0],
      WeightConstraint::Unconstrained,
      &KktSolver::default(),
    )
    .unwrap_err();
    assert_eq!(
      err,
      PortfolioError::InvalidRiskAversion {
        index: 1,
        value: 0.0
      }
    );

    let err = efficient_frontier(
      &u,
      &[f64::NAN],
      WeightConstraint::Unconstrained,
      &KktSolver::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PortfolioError::InvalidRiskAversion { index: 0, .. }));
  }

  #[test]
  fn rejects_empty_grid() {
    let u = random_universe(4, 4).unwrap();
    let err =
      par_efficient_frontier(&u, &[], WeightConstraint::Unconstrained, &KktSolver::default()).unwrap_err();
    assert_eq!(err, PortfolioError::EmptyGrid);
  }

  #[test]
  fn parallel_sweep_preserves_order_and_values() {
    let u = random_universe(10, 5).unwrap();
    let gammas = log_spaced_gammas(-2.0, 3.0, 40);
    let solver = KktSolver::default();

    let seq = efficient_frontier(&u, &gammas, WeightConstraint::Unconstrained, &solver).unwrap();
    let par = par_efficient_frontier(&u, &gammas, WeightConstraint::Unconstrained, &solver).unwrap();

    assert_eq!(seq.gammas(), par.gammas());
    for (a, b) in seq.points.iter().zip(par.points.iter()) {
      assert_abs_diff_eq!(a.weights, b.weights, epsilon = 1e-12);
    }
  }

  #[test]
  fn best_sharpe_prefers_first_on_ties() {
    let point = |gamma: f64| FrontierPoint {
      gamma,
      weights: DVector::from_element(1, 1.0),
      expected_return: 0.1,
      risk: 0.2,
    };
    let frontier = Frontier {
      points: vec![point(1.0), point(2.0)],
    };
    assert_eq!(frontier.best_sharpe_index(0.0), Some(0));
    assert_eq!(frontier.best_sharpe(0.0).map(|p| p.gamma), Some(1.0));
    assert!(Frontier::default().best_sharpe(0.0).is_none());
  }
}
