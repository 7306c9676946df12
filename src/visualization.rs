//! # Visualization
//!
//! $$
//! \{(\sigma_p(\gamma), \mathbb E[R_p](\gamma))\}_\gamma \mapsto \text{frontier and Sharpe charts}
//! $$
//!
//! Plotly charts for the risk/return frontier and the Sharpe ratio along the sweep.

use std::path::Path;

use plotly::Layout;
use plotly::Plot;
use plotly::Scatter;
use plotly::common::Line;
use plotly::common::Marker;
use plotly::common::Mode;
use plotly::layout::Axis;
use plotly::layout::AxisType;
use plotly::layout::Margin;

use crate::portfolio::Frontier;
use crate::portfolio::SharpeSolution;

pub struct FrontierPlotter {
  title: String,
  line_width: f64,
  marker_size: usize,
  height: usize,
}

impl Default for FrontierPlotter {
  fn default() -> Self {
    Self::new()
  }
}

impl FrontierPlotter {
  pub fn new() -> Self {
    Self {
      title: String::new(),
      line_width: 2.0,
      marker_size: 12,
      height: 520,
    }
  }

  pub fn title(mut self, title: &str) -> Self {
    self.title = title.into();
    self
  }

  fn layout(&self, x_axis: Axis, y_axis: Axis) -> Layout {
    Layout::new()
      .title(self.title.as_str())
      .auto_size(true)
      .height(self.height)
      .margin(Margin::new().left(64).right(24).top(64).bottom(52))
      .x_axis(x_axis)
      .y_axis(y_axis)
  }

  /// Risk against expected return, with the tangency portfolio marked when
  /// supplied.
  pub fn frontier_plot(&self, frontier: &Frontier, tangency: Option<&SharpeSolution>) -> Plot {
    let mut plot = Plot::new();
    plot.set_layout(self.layout(
      Axis::new().title("risk (standard deviation)"),
      Axis::new().title("expected return"),
    ));

    let hover_text = frontier
      .points
      .iter()
      .map(|p| {
        format!(
          "gamma: {:.4e}<br>risk: {:.6}<br>return: {:.6}",
          p.gamma, p.risk, p.expected_return
        )
      })
      .collect::<Vec<String>>();
    let trace = Scatter::new(frontier.risks(), frontier.returns())
      .mode(Mode::Lines)
      .line(Line::new().width(self.line_width))
      .name("efficient frontier")
      .hover_text_array(hover_text)
      .hover_template("%{hovertext}<extra></extra>");
    plot.add_trace(trace);

    if let Some(sol) = tangency {
      let trace = Scatter::new(vec![sol.risk], vec![sol.expected_return])
        .mode(Mode::Markers)
        .marker(Marker::new().size(self.marker_size))
        .name(format!("max sharpe ({:.4})", sol.sharpe).as_str());
      plot.add_trace(trace);
    }

    plot
  }

  /// Sharpe ratio of every frontier point against `gamma` on a log axis.
  pub fn sharpe_plot(&self, frontier: &Frontier, risk_free: f64) -> Plot {
    let mut plot = Plot::new();
    plot.set_layout(self.layout(
      Axis::new().title("risk aversion").type_(AxisType::Log),
      Axis::new().title("sharpe ratio"),
    ));

    let trace = Scatter::new(frontier.gammas(), frontier.sharpe_ratios(risk_free))
      .mode(Mode::Lines)
      .line(Line::new().width(self.line_width))
      .name("sharpe ratio");
    plot.add_trace(trace);

    plot
  }

  pub fn write_html(
    &self,
    frontier: &Frontier,
    tangency: Option<&SharpeSolution>,
    path: impl AsRef<Path>,
  ) {
    self.frontier_plot(frontier, tangency).write_html(path);
  }

  pub fn write_sharpe_html(&self, frontier: &Frontier, risk_free: f64, path: impl AsRef<Path>) {
    self.sharpe_plot(frontier, risk_free).write_html(path);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::portfolio::WeightConstraint;
  use crate::portfolio::data::log_spaced_gammas;
  use crate::portfolio::data::universe_with_tangency;
  use crate::portfolio::efficient_frontier;
  use crate::portfolio::max_sharpe;
  use crate::solver::KktSolver;

  const RF: f64 = 0.05;

  fn sample() -> (Frontier, SharpeSolution) {
    let (u, _) = universe_with_tangency(5, 51, RF).unwrap();
    let solver = KktSolver::default();
    let frontier = efficient_frontier(
      &u,
      &log_spaced_gammas(-2.0, 3.0, 20),
      WeightConstraint::Unconstrained,
      &solver,
    )
    .unwrap();
    let sol = max_sharpe(&u, RF, WeightConstraint::Unconstrained, &solver).unwrap();
    (frontier, sol)
  }

  #[test]
  fn frontier_plot_has_curve_and_marker() {
    let (frontier, sol) = sample();
    let plotter = FrontierPlotter::new().title("Efficient Frontier");

    let json = plotter.frontier_plot(&frontier, Some(&sol)).to_json();
    assert!(json.contains("efficient frontier"));
    assert!(json.contains("max sharpe"));
    assert!(json.contains("Efficient Frontier"));

    let json = plotter.frontier_plot(&frontier, None).to_json();
    assert!(!json.contains("max sharpe"));
  }

  #[test]
  fn sharpe_plot_uses_log_axis() {
    let (frontier, _) = sample();
    let json = FrontierPlotter::new().sharpe_plot(&frontier, RF).to_json();
    assert!(json.contains("\"log\""));
    assert!(json.contains("sharpe ratio"));
  }

  #[test]
  fn writes_html_file() {
    let (frontier, sol) = sample();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frontier.html");
    FrontierPlotter::new().write_html(&frontier, Some(&sol), &path);
    let html = std::fs::read_to_string(&path).unwrap();
    assert!(html.contains("efficient frontier"));

    let path = dir.path().join("sharpe.html");
    FrontierPlotter::new().write_sharpe_html(&frontier, RF, &path);
    let html = std::fs::read_to_string(&path).unwrap();
    assert!(html.contains("sharpe ratio"));
  }
}
