//! # Experiment Configuration
//!
//! $$
//! \gamma_k = 10^{a + k (b-a)/(n-1)},\quad k = 0, \dots, n-1
//! $$
//!
//! TOML settings for the demo binary. Every field has a default, so an empty
//! document is a valid configuration.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::portfolio::OptimizerConfig;
use crate::portfolio::WeightConstraint;
use crate::portfolio::log_spaced_gammas;
use crate::solver::ClarabelSettings;
use crate::solver::SolverBackend;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("failed to read {}: {source}", path.display())]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("invalid configuration: {0}")]
  Parse(#[from] toml::de::Error),
  #[error("invalid configuration: {0}")]
  Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
  pub n_assets: usize,
  pub seed: u64,
  pub risk_free: f64,
  /// log10 of the smallest risk aversion.
  pub gamma_start_exp: f64,
  /// log10 of the largest risk aversion.
  pub gamma_stop_exp: f64,
  pub gamma_points: usize,
  pub long_only: bool,
  pub backend: SolverBackend,
  pub parallel: bool,
  /// Write the frontier chart here when set.
  pub output_html: Option<PathBuf>,
  /// Write the Sharpe ratio against risk aversion chart here when set.
  pub sharpe_html: Option<PathBuf>,
  pub clarabel: ClarabelSettings,
}

impl Default for ExperimentConfig {
  fn default() -> Self {
    Self {
      n_assets: 10,
      seed: 42,
      risk_free: 0.05,
      gamma_start_exp: -2.0,
      gamma_stop_exp: 3.0,
      gamma_points: 200,
      long_only: false,
      backend: SolverBackend::Clarabel,
      parallel: false,
      output_html: None,
      sharpe_html: None,
      clarabel: ClarabelSettings::default(),
    }
  }
}

impl ExperimentConfig {
  pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
    let config: Self = toml::from_str(s)?;
    config.validate()?;
    Ok(config)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_toml_str(&text)
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if self.n_assets == 0 {
      return Err(ConfigError::Invalid("n_assets must be positive".into()));
    }
    if self.gamma_points == 0 {
      return Err(ConfigError::Invalid("gamma_points must be positive".into()));
    }
    if ![self.risk_free, self.gamma_start_exp, self.gamma_stop_exp]
      .iter()
      .all(|v| v.is_finite())
    {
      return Err(ConfigError::Invalid(
        "risk_free and gamma exponents must be finite".into(),
      ));
    }
    Ok(())
  }

  /// Risk-aversion grid described by the `gamma_*` fields.
  pub fn gammas(&self) -> Vec<f64> {
    log_spaced_gammas(self.gamma_start_exp, self.gamma_stop_exp, self.gamma_points)
  }

  pub fn optimizer_config(&self) -> OptimizerConfig {
    OptimizerConfig {
      risk_free: self.risk_free,
      constraint: if self.long_only {
        WeightConstraint::LongOnly
      } else {
        WeightConstraint::Unconstrained
      },
      backend: self.backend,
      parallel: self.parallel,
      clarabel: self.clarabel.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_document_yields_defaults() {
    let config = ExperimentConfig::from_toml_str("").unwrap();
    assert_eq!(config, ExperimentConfig::default());
    assert_eq!(config.gammas().len(), 200);
    assert_eq!(config.optimizer_config().backend, SolverBackend::Clarabel);
  }

  #[test]
  fn parses_overrides() {
    let config = ExperimentConfig::from_toml_str(
      r#"
n_assets = 25
seed = 7
risk_free = 0.02
gamma_points = 50
long_only = true
backend = "kkt"
parallel = true
output_html = "frontier.html"
sharpe_html = "sharpe.html"

[clarabel]
max_iter = 500
"#,
    )
    .unwrap();

    assert_eq!(config.n_assets, 25);
    assert_eq!(config.backend, SolverBackend::Kkt);
    assert_eq!(config.output_html, Some(PathBuf::from("frontier.html")));
    assert_eq!(config.sharpe_html, Some(PathBuf::from("sharpe.html")));
    assert_eq!(config.clarabel.max_iter, 500);
    assert_eq!(config.clarabel.tol_feas, ClarabelSettings::default().tol_feas);

    let opt = config.optimizer_config();
    assert_eq!(opt.constraint, WeightConstraint::LongOnly);
    assert!(opt.parallel);
    assert_eq!(opt.risk_free, 0.02);
  }

  #[test]
  fn rejects_bad_values() {
    assert!(matches!(
      ExperimentConfig::from_toml_str("gamma_points = 0"),
      Err(ConfigError::Invalid(_))
    ));
    assert!(matches!(
      ExperimentConfig::from_toml_str("backend = \"simplex\""),
      Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
      ExperimentConfig::from_toml_str("n_asets = 3"),
      Err(ConfigError::Parse(_))
    ));
  }

  #[test]
  fn missing_file_is_an_io_error() {
    let err = ExperimentConfig::load("/nonexistent/markowitz.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
  }
}
