//! # Interior-Point Backend
//!
//! $$
//! \min_x\ \tfrac12 x^\top P x + q^\top x \quad\text{s.t.}\quad A x + s = b,\ s \in \{0\}^{m} \times \mathbb R_+^{k}
//! $$
//!
//! Adapter over the Clarabel conic solver.

use clarabel::algebra::CscMatrix;
use clarabel::solver::DefaultSettingsBuilder;
use clarabel::solver::DefaultSolver;
use clarabel::solver::IPSolver;
use clarabel::solver::SolverStatus;
use clarabel::solver::SupportedConeT;
use nalgebra::DMatrix;
use nalgebra::DVector;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use super::QpSolution;
use super::QpSolver;
use super::QuadraticProgram;
use super::SolverError;

/// Tunables forwarded to Clarabel.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClarabelSettings {
  pub max_iter: u32,
  pub tol_gap_abs: f64,
  pub tol_gap_rel: f64,
  pub tol_feas: f64,
  pub verbose: bool,
}

impl Default for ClarabelSettings {
  fn default() -> Self {
    Self {
      max_iter: 200,
      tol_gap_abs: 1e-9,
      tol_gap_rel: 1e-9,
      tol_feas: 1e-9,
      verbose: false,
    }
  }
}

/// Interior-point backend supporting equalities and non-negativity bounds.
#[derive(Clone, Debug, Default)]
pub struct ClarabelSolver {
  settings: ClarabelSettings,
}

impl ClarabelSolver {
  pub fn new(settings: ClarabelSettings) -> Self {
    Self { settings }
  }
}

/// Column-compressed copy of `m`, dropping exact zeros. With `upper_only` the
/// strictly lower triangle is skipped.
fn to_csc(m: &DMatrix<f64>, upper_only: bool) -> CscMatrix<f64> {
  let mut colptr = Vec::with_capacity(m.ncols() + 1);
  let mut rowval = Vec::new();
  let mut nzval = Vec::new();
  colptr.push(0);

  for j in 0..m.ncols() {
    let last_row = if upper_only { (j + 1).min(m.nrows()) } else { m.nrows() };
    for i in 0..last_row {
      let v = m[(i, j)];
      if v != 0.0 {
        rowval.push(i);
        nzval.push(v);
      }
    }
    colptr.push(rowval.len());
  }

  CscMatrix::new(m.nrows(), m.ncols(), colptr, rowval, nzval)
}

impl QpSolver for ClarabelSolver {
  fn name(&self) -> &'static str {
    "clarabel"
  }

  fn solve(&self, qp: &QuadraticProgram) -> Result<QpSolution, SolverError> {
    // Zero rows with a non-zero rhs never reach the interior-point iteration.
    if let Some(row) = qp.inconsistent_zero_row(1e-14) {
      return Err(SolverError::Infeasible(format!(
        "equality row {row} has no coefficients but a non-zero right-hand side"
      )));
    }

    let n = qp.n_vars();
    let m_eq = qp.n_equalities();
    let bounds = qp.nonnegative();
    let m = m_eq + bounds.len();

    // Stack [A_eq; -I_bounds] so that A x + s = b with s in {0} x R+.
    let mut a = DMatrix::<f64>::zeros(m, n);
    a.rows_mut(0, m_eq).copy_from(qp.a_eq());
    for (k, &i) in bounds.iter().enumerate() {
      a[(m_eq + k, i)] = -1.0;
    }
    let mut b = vec![0.0; m];
    b[..m_eq].copy_from_slice(qp.b_eq().as_slice());

    let p_sym = (qp.p() + qp.p().transpose()) * 0.5;
    let p = to_csc(&p_sym, true);
    let a = to_csc(&a, false);
    let q = qp.q().as_slice().to_vec();

    let mut cones = Vec::with_capacity(2);
    if m_eq > 0 {
      cones.push(SupportedConeT::ZeroConeT(m_eq));
    }
    if !bounds.is_empty() {
      cones.push(SupportedConeT::NonnegativeConeT(bounds.len()));
    }

    let settings = DefaultSettingsBuilder::default()
      .max_iter(self.settings.max_iter)
      .tol_gap_abs(self.settings.tol_gap_abs)
      .tol_gap_rel(self.settings.tol_gap_rel)
      .tol_feas(self.settings.tol_feas)
      .verbose(self.settings.verbose)
      .build()
      .map_err(|e| SolverError::Setup(e.to_string()))?;

    let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings);
    solver.solve();

    let status = solver.solution.status;
    let iterations = solver.solution.iterations;
    debug!(
      backend = self.name(),
      n_vars = n,
      n_eq = m_eq,
      n_bounds = bounds.len(),
      ?status,
      iterations,
      "qp solved"
    );

    match status {
      SolverStatus::Solved => {}
      SolverStatus::AlmostSolved => {
        warn!(
          backend = self.name(),
          iterations, "solution meets only reduced accuracy tolerances"
        );
      }
      SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
        return Err(SolverError::Infeasible(format!("{status:?}")));
      }
      SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
        return Err(SolverError::Unbounded(format!("{status:?}")));
      }
      other => return Err(SolverError::Numerical(format!("{other:?}"))),
    }

    let x = DVector::from_vec(solver.solution.x.clone());
    if x.iter().any(|v| !v.is_finite()) {
      return Err(SolverError::Numerical(
        "non-finite solution from interior-point solve".into(),
      ));
    }

    Ok(QpSolution {
      objective: qp.objective(&x),
      x,
      iterations,
    })
  }
}
