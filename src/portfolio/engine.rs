//! # Sharpe Optimizer
//!
//! $$
//! (\mu, \Sigma, r_f) \mapsto \{\mathbf w(\gamma)\}_\gamma,\ \mathbf w^\*_{SR}
//! $$
//!
//! High-level entry point binding a universe to a backend and its settings.

use std::fmt;

use nalgebra::DVector;
use serde::Deserialize;
use serde::Serialize;

use super::diagonal::DiagonalSharpe;
use super::frontier::Frontier;
use super::frontier::efficient_frontier;
use super::frontier::par_efficient_frontier;
use super::types::PortfolioStats;
use super::types::SharpeSolution;
use super::types::WeightConstraint;
use super::universe::AssetUniverse;
use crate::error::Result;
use crate::solver::ClarabelSettings;
use crate::solver::QpSolver;
use crate::solver::SolverBackend;

const WEIGHT_SUM_TOL: f64 = 1e-6;

/// Runtime configuration for [`SharpeOptimizer`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OptimizerConfig {
  /// Risk-free rate used by Sharpe computations.
  pub risk_free: f64,
  /// Feasible weight set.
  pub constraint: WeightConstraint,
  /// Quadratic program backend.
  pub backend: SolverBackend,
  /// Solve frontier points on the rayon pool.
  pub parallel: bool,
  /// Interior-point settings, ignored by the KKT backend.
  pub clarabel: ClarabelSettings,
}

impl Default for OptimizerConfig {
  fn default() -> Self {
    Self {
      risk_free: 0.0,
      constraint: WeightConstraint::Unconstrained,
      backend: SolverBackend::Clarabel,
      parallel: false,
      clarabel: ClarabelSettings::default(),
    }
  }
}

/// Mean-variance optimizer over a fixed universe.
pub struct SharpeOptimizer {
  universe: AssetUniverse,
  config: OptimizerConfig,
  solver: Box<dyn QpSolver>,
}

impl fmt::Debug for SharpeOptimizer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SharpeOptimizer")
      .field("n_assets", &self.universe.n_assets())
      .field("config", &self.config)
      .field("solver", &self.solver.name())
      .finish()
  }
}

impl SharpeOptimizer {
  pub fn new(universe: AssetUniverse, config: OptimizerConfig) -> Self {
    let solver = config.backend.build(&config.clarabel);
    Self {
      universe,
      config,
      solver,
    }
  }

  pub fn universe(&self) -> &AssetUniverse {
    &self.universe
  }

  pub fn config(&self) -> &OptimizerConfig {
    &self.config
  }

  /// Efficient frontier over `gammas`, in input order.
  pub fn frontier(&self, gammas: &[f64]) -> Result<Frontier> {
    let solver = self.solver.as_ref();
    if self.config.parallel {
      par_efficient_frontier(&self.universe, gammas, self.config.constraint, solver)
    } else {
      efficient_frontier(&self.universe, gammas, self.config.constraint, solver)
    }
  }

  /// Tangency portfolio under the configured constraint.
  pub fn max_sharpe(&self) -> Result<SharpeSolution> {
    super::sharpe::max_sharpe(
      &self.universe,
      self.config.risk_free,
      self.config.constraint,
      self.solver.as_ref(),
    )
  }

  /// Closed form for uncorrelated assets; ignores the weight constraint.
  pub fn diagonal_max_sharpe(&self) -> Result<DiagonalSharpe> {
    super::diagonal::diagonal_max_sharpe(&self.universe, self.config.risk_free)
  }

  /// Statistics of a fully invested portfolio.
  pub fn stats(&self, weights: &DVector<f64>) -> Result<PortfolioStats> {
    self.universe.check_fully_invested(weights, WEIGHT_SUM_TOL)?;
    self.universe.stats(weights, self.config.risk_free)
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use tracing_test::traced_test;

  use super::*;
  use crate::error::PortfolioError;
  use crate::portfolio::data::log_spaced_gammas;
  use crate::portfolio::data::random_diagonal_universe;
  use crate::portfolio::data::random_universe;
  use crate::portfolio::data::universe_with_tangency;

  #[test]
  fn default_config_is_unconstrained_clarabel() {
    let config = OptimizerConfig::default();
    assert_eq!(config.backend, SolverBackend::Clarabel);
    assert_eq!(config.constraint, WeightConstraint::Unconstrained);
    assert!(!config.parallel);
    assert_eq!(config.risk_free, 0.0);
  }

  #[test]
  #[traced_test]
  fn engine_runs_frontier_and_tangency() {
    let (u, target) = universe_with_tangency(6, 41, 0.05).unwrap();
    let engine = SharpeOptimizer::new(
      u,
      OptimizerConfig {
        risk_free: 0.05,
        backend: SolverBackend::Kkt,
        parallel: true,
        ..OptimizerConfig::default()
      },
    );

    let frontier = engine.frontier(&log_spaced_gammas(-2.0, 3.0, 30)).unwrap();
    assert_eq!(frontier.len(), 30);

    let sol = engine.max_sharpe().unwrap();
    assert_abs_diff_eq!(sol.weights, target, epsilon = 1e-6);

    let stats = engine.stats(&sol.weights).unwrap();
    assert!(stats.sharpe >= frontier.best_sharpe(0.05).unwrap().sharpe(0.05) - 1e-9);
    assert!(logs_contain("max sharpe solved"));

    let err = engine.stats(&(&sol.weights * 2.0)).unwrap_err();
    assert!(matches!(err, PortfolioError::WeightsNotNormalized { .. }));
  }

  #[test]
  fn engine_long_only_uses_bounded_backend() {
    let engine = SharpeOptimizer::new(
      random_universe(6, 42).unwrap(),
      OptimizerConfig {
        risk_free: 0.05,
        constraint: WeightConstraint::LongOnly,
        ..OptimizerConfig::default()
      },
    );
    let frontier = engine.frontier(&log_spaced_gammas(-1.0, 1.0, 5)).unwrap();
    for p in &frontier.points {
      assert!(p.weights.iter().all(|&w| w > -1e-7));
    }
  }

  #[test]
  fn engine_diagonal_shortcut() {
    let engine = SharpeOptimizer::new(
      random_diagonal_universe(5, 43).unwrap(),
      OptimizerConfig {
        risk_free: 0.05,
        backend: SolverBackend::Kkt,
        ..OptimizerConfig::default()
      },
    );
    let closed = engine.diagonal_max_sharpe().unwrap();
    let qp = engine.max_sharpe().unwrap();
    assert_abs_diff_eq!(closed.weights, qp.weights, epsilon = 1e-6);

    let engine = SharpeOptimizer::new(random_universe(5, 43).unwrap(), OptimizerConfig::default());
    assert_eq!(engine.diagonal_max_sharpe().unwrap_err(), PortfolioError::NotDiagonal);
  }
}
