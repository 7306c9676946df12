//! # Null-Space KKT Solver
//!
//! $$
//! x = x_0 + Z v,\quad A Z = 0,\quad (Z^\top P Z)\, v = -Z^\top (P x_0 + q)
//! $$
//!
//! Exact dense solve for equality-constrained convex quadratic programs.

use nalgebra::DMatrix;
use nalgebra::DVector;
use nalgebra::SymmetricEigen;
use tracing::debug;

use super::QpSolution;
use super::QpSolver;
use super::QuadraticProgram;
use super::SolverError;

/// Equality-only backend built on symmetric eigendecompositions.
#[derive(Clone, Debug)]
pub struct KktSolver {
  /// Relative tolerance for rank decisions and residual checks.
  pub tolerance: f64,
}

impl Default for KktSolver {
  fn default() -> Self {
    Self { tolerance: 1e-10 }
  }
}

impl KktSolver {
  pub fn new(tolerance: f64) -> Self {
    Self { tolerance }
  }

  /// Particular solution of `A x = b` and an orthonormal basis of `ker A`.
  fn feasible_affine_set(
    &self,
    a: &DMatrix<f64>,
    b: &DVector<f64>,
  ) -> Result<(DVector<f64>, Option<DMatrix<f64>>), SolverError> {
    let n = a.ncols();
    if a.nrows() == 0 {
      return Ok((DVector::zeros(n), Some(DMatrix::identity(n, n))));
    }

    let pinv = a
      .clone()
      .pseudo_inverse(self.tolerance)
      .map_err(|e| SolverError::Numerical(e.to_string()))?;
    let x0 = &pinv * b;
    let residual = (a * &x0 - b).amax();
    if residual > self.tolerance.sqrt() * (1.0 + b.amax()) {
      return Err(SolverError::Infeasible(format!(
        "equality constraints are inconsistent (residual {residual:e})"
      )));
    }

    let gram = a.transpose() * a;
    let eig = SymmetricEigen::new(gram);
    let scale = eig.eigenvalues.amax().max(1.0);
    let kernel: Vec<DVector<f64>> = eig
      .eigenvalues
      .iter()
      .enumerate()
      .filter(|(_, &lambda)| lambda <= self.tolerance * scale)
      .map(|(i, _)| eig.eigenvectors.column(i).into_owned())
      .collect();

    if kernel.is_empty() {
      Ok((x0, None))
    } else {
      Ok((x0, Some(DMatrix::from_columns(&kernel))))
    }
  }
}

impl QpSolver for KktSolver {
  fn name(&self) -> &'static str {
    "kkt"
  }

  fn solve(&self, qp: &QuadraticProgram) -> Result<QpSolution, SolverError> {
    if !qp.nonnegative().is_empty() {
      return Err(SolverError::Unsupported {
        backend: self.name(),
        what: "non-negativity bounds",
      });
    }

    let (x0, basis) = self.feasible_affine_set(qp.a_eq(), qp.b_eq())?;
    let x = match basis {
      None => x0,
      Some(z) => {
        let h = z.transpose() * qp.p() * &z;
        let h = (&h + h.transpose()) * 0.5;
        let g = z.transpose() * (qp.p() * &x0 + qp.q());

        let eig = SymmetricEigen::new(h);
        let scale = eig.eigenvalues.amax().max(1.0);
        let g_scale = 1.0 + g.amax();
        let mut v = DVector::<f64>::zeros(z.ncols());

        for (i, &lambda) in eig.eigenvalues.iter().enumerate() {
          let u = eig.eigenvectors.column(i);
          let gu = u.dot(&g);
          if lambda < -self.tolerance.sqrt() * scale {
            return Err(SolverError::Unbounded(format!(
              "reduced Hessian has negative curvature {lambda:e}"
            )));
          }
          if lambda <= self.tolerance * scale {
            if gu.abs() > self.tolerance.sqrt() * g_scale {
              return Err(SolverError::Unbounded(
                "objective decreases along a zero-curvature feasible direction".into(),
              ));
            }
            continue;
          }
          v -= u * (gu / lambda);
        }

        x0 + z * v
      }
    };

    if x.iter().any(|v| !v.is_finite()) {
      return Err(SolverError::Numerical(
        "non-finite solution from KKT solve".into(),
      ));
    }

    let objective = qp.objective(&x);
    debug!(
      backend = self.name(),
      n_vars = qp.n_vars(),
      n_eq = qp.n_equalities(),
      objective,
      "qp solved"
    );

    Ok(QpSolution {
      x,
      objective,
      iterations: 0,
    })
  }
}
