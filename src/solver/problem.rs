//! # Quadratic Program
//!
//! $$
//! \min_{x \in \mathbb R^n}\ \tfrac12 x^\top P x + q^\top x,\qquad A x = b,\qquad x_{\mathcal I} \ge 0
//! $$
//!
//! Dense problem container shared by every backend.

use nalgebra::DMatrix;
use nalgebra::DVector;

use super::SolverError;

/// Dense convex quadratic program with linear equalities and optional
/// non-negativity bounds on a subset of the variables.
#[derive(Clone, Debug)]
pub struct QuadraticProgram {
  p: DMatrix<f64>,
  q: DVector<f64>,
  a_eq: DMatrix<f64>,
  b_eq: DVector<f64>,
  nonnegative: Vec<usize>,
}

impl QuadraticProgram {
  /// Objective `0.5 x'Px + q'x` with no constraints yet.
  pub fn new(p: DMatrix<f64>, q: DVector<f64>) -> Result<Self, SolverError> {
    if !p.is_square() {
      return Err(SolverError::InvalidProblem(format!(
        "P must be square, got {}x{}",
        p.nrows(),
        p.ncols()
      )));
    }
    if p.nrows() != q.len() {
      return Err(SolverError::InvalidProblem(format!(
        "P is {}x{} but q has length {}",
        p.nrows(),
        p.ncols(),
        q.len()
      )));
    }
    if p.iter().chain(q.iter()).any(|v| !v.is_finite()) {
      return Err(SolverError::InvalidProblem(
        "objective contains non-finite values".into(),
      ));
    }

    let n = q.len();
    Ok(Self {
      p,
      q,
      a_eq: DMatrix::zeros(0, n),
      b_eq: DVector::zeros(0),
      nonnegative: Vec::new(),
    })
  }

  /// Append equality rows `a x = b`.
  pub fn with_equalities(mut self, a: DMatrix<f64>, b: DVector<f64>) -> Result<Self, SolverError> {
    if a.ncols() != self.n_vars() || a.nrows() != b.len() {
      return Err(SolverError::InvalidProblem(format!(
        "equality block is {}x{} with rhs of length {}, problem has {} variables",
        a.nrows(),
        a.ncols(),
        b.len(),
        self.n_vars()
      )));
    }
    if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
      return Err(SolverError::InvalidProblem(
        "equality constraints contain non-finite values".into(),
      ));
    }

    let rows = self.a_eq.nrows() + a.nrows();
    let n = self.n_vars();
    let mut stacked = DMatrix::<f64>::zeros(rows, n);
    stacked
      .rows_mut(0, self.a_eq.nrows())
      .copy_from(&self.a_eq);
    stacked.rows_mut(self.a_eq.nrows(), a.nrows()).copy_from(&a);

    let mut rhs = DVector::<f64>::zeros(rows);
    rhs.rows_mut(0, self.b_eq.len()).copy_from(&self.b_eq);
    rhs.rows_mut(self.b_eq.len(), b.len()).copy_from(&b);

    self.a_eq = stacked;
    self.b_eq = rhs;
    Ok(self)
  }

  /// Require `x_i >= 0` for every listed index.
  pub fn with_nonnegative<I>(mut self, indices: I) -> Result<Self, SolverError>
  where
    I: IntoIterator<Item = usize>,
  {
    for i in indices {
      if i >= self.n_vars() {
        return Err(SolverError::InvalidProblem(format!(
          "bound index {i} out of range for {} variables",
          self.n_vars()
        )));
      }
      if !self.nonnegative.contains(&i) {
        self.nonnegative.push(i);
      }
    }
    self.nonnegative.sort_unstable();
    Ok(self)
  }

  pub fn n_vars(&self) -> usize {
    self.q.len()
  }

  pub fn n_equalities(&self) -> usize {
    self.a_eq.nrows()
  }

  pub fn p(&self) -> &DMatrix<f64> {
    &self.p
  }

  pub fn q(&self) -> &DVector<f64> {
    &self.q
  }

  pub fn a_eq(&self) -> &DMatrix<f64> {
    &self.a_eq
  }

  pub fn b_eq(&self) -> &DVector<f64> {
    &self.b_eq
  }

  /// Sorted indices of bounded variables.
  pub fn nonnegative(&self) -> &[usize] {
    &self.nonnegative
  }

  /// Objective value at `x`.
  pub fn objective(&self, x: &DVector<f64>) -> f64 {
    0.5 * x.dot(&(&self.p * x)) + self.q.dot(x)
  }

  /// Index of an equality row with all-zero coefficients and non-zero rhs.
  pub(crate) fn inconsistent_zero_row(&self, tol: f64) -> Option<usize> {
    (0..self.a_eq.nrows()).find(|&i| {
      self.a_eq.row(i).amax() <= tol && self.b_eq[i].abs() > tol
    })
  }
}

/// Optimal point returned by a backend.
#[derive(Clone, Debug)]
pub struct QpSolution {
  /// Primal solution.
  pub x: DVector<f64>,
  /// Objective value `0.5 x'Px + q'x`.
  pub objective: f64,
  /// Backend iterations (zero for direct solves).
  pub iterations: u32,
}
