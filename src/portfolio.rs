//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Mean-variance frontier sweeps, maximum Sharpe ratio portfolios and the
//! diagonal-covariance closed form.

pub mod data;
pub mod diagonal;
pub mod engine;
pub mod frontier;
pub mod sharpe;
pub mod types;
pub mod universe;

pub use data::log_spaced_gammas;
pub use data::random_diagonal_universe;
pub use data::random_universe;
pub use data::universe_with_tangency;
pub use diagonal::DiagonalSharpe;
pub use diagonal::diagonal_max_sharpe;
pub use engine::OptimizerConfig;
pub use engine::SharpeOptimizer;
pub use frontier::Frontier;
pub use frontier::efficient_frontier;
pub use frontier::par_efficient_frontier;
pub use sharpe::max_sharpe;
pub use sharpe::recover_weights;
pub use types::FrontierPoint;
pub use types::PortfolioStats;
pub use types::SharpeSolution;
pub use types::WeightConstraint;
pub use universe::AssetUniverse;
