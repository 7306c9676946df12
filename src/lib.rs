//! # markowitz
//!
//! $$
//! \max_{\mathbf{w}:\ \mathbf 1^\top \mathbf w = 1} \frac{\mu^\top \mathbf w - r_f}{\sqrt{\mathbf w^\top \Sigma \mathbf w}}
//! $$
//!
//! Mean-variance efficient frontiers, maximum Sharpe ratio portfolios through the
//! convex change of variables, and the diagonal-covariance closed form.

pub mod config;
pub mod error;
pub mod portfolio;
pub mod solver;
pub mod visualization;

pub use error::PortfolioError;
pub use error::Result;
