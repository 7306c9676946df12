use std::env;

use anyhow::Context;
use anyhow::Result;
use markowitz::PortfolioError;
use markowitz::config::ExperimentConfig;
use markowitz::portfolio::AssetUniverse;
use markowitz::portfolio::SharpeOptimizer;
use markowitz::portfolio::random_diagonal_universe;
use markowitz::portfolio::random_universe;
use markowitz::visualization::FrontierPlotter;
use prettytable::Table;
use prettytable::row;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn weights_table(universe: &AssetUniverse, weights: &nalgebra::DVector<f64>) -> Table {
  let mut table = Table::new();
  table.add_row(row!["asset", "mu", "vol", "weight"]);
  let vols = universe.volatilities();
  for i in 0..universe.n_assets() {
    table.add_row(row![
      i,
      format!("{:.4}", universe.mu()[i]),
      format!("{:.4}", vols[i]),
      format!("{:+.4}", weights[i])
    ]);
  }
  table
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let config = match env::args().nth(1) {
    Some(path) => {
      ExperimentConfig::load(&path).with_context(|| format!("loading configuration from {path}"))?
    }
    None => ExperimentConfig::default(),
  };
  info!(?config, "starting experiment");

  let universe =
    random_universe(config.n_assets, config.seed).context("generating random universe")?;
  let optimizer = SharpeOptimizer::new(universe, config.optimizer_config());

  let gammas = config.gammas();
  let frontier = optimizer.frontier(&gammas).context("sweeping efficient frontier")?;
  let rf = config.risk_free;

  let mut summary = Table::new();
  summary.add_row(row!["", "gamma", "return", "risk", "sharpe"]);
  if let (Some(first), Some(last)) = (frontier.points.first(), frontier.points.last()) {
    for (label, p) in [("lowest gamma", first), ("highest gamma", last)] {
      summary.add_row(row![
        label,
        format!("{:.4e}", p.gamma),
        format!("{:.6}", p.expected_return),
        format!("{:.6}", p.risk),
        format!("{:.6}", p.sharpe(rf))
      ]);
    }
  }
  if let Some(best) = frontier.best_sharpe(rf) {
    summary.add_row(row![
      "best on grid",
      format!("{:.4e}", best.gamma),
      format!("{:.6}", best.expected_return),
      format!("{:.6}", best.risk),
      format!("{:.6}", best.sharpe(rf))
    ]);
  }

  let tangency = match optimizer.max_sharpe() {
    Ok(sol) => {
      summary.add_row(row![
        "max sharpe",
        "-",
        format!("{:.6}", sol.expected_return),
        format!("{:.6}", sol.risk),
        format!("{:.6}", sol.sharpe)
      ]);
      Some(sol)
    }
    Err(err @ PortfolioError::SharpeUnattainable { .. }) => {
      warn!(%err, "no fully invested tangency portfolio for this universe");
      None
    }
    Err(err) => return Err(err).context("solving maximum Sharpe portfolio"),
  };
  summary.printstd();

  if let Some(sol) = &tangency {
    weights_table(optimizer.universe(), &sol.weights).printstd();
  }

  let diagonal = random_diagonal_universe(config.n_assets, config.seed)
    .context("generating diagonal universe")?;
  let diagonal = SharpeOptimizer::new(diagonal, config.optimizer_config());
  match diagonal.diagonal_max_sharpe() {
    Ok(closed) => {
      info!(sharpe = closed.sharpe, "diagonal closed form");
      weights_table(diagonal.universe(), &closed.weights).printstd();
    }
    Err(err) => warn!(%err, "diagonal closed form unavailable"),
  }

  if let Some(path) = &config.output_html {
    FrontierPlotter::new()
      .title("Efficient Frontier")
      .write_html(&frontier, tangency.as_ref(), path);
    info!(path = %path.display(), "wrote frontier chart");
  }
  if let Some(path) = &config.sharpe_html {
    FrontierPlotter::new()
      .title("Sharpe Ratio vs Risk Aversion")
      .write_sharpe_html(&frontier, rf, path);
    info!(path = %path.display(), "wrote sharpe chart");
  }

  Ok(())
}
