//! Simulation chart: path overlays with percentile band, plus the terminal
//! value distribution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::domain::SimulationPanel;
use crate::error::VizError;
use crate::stats;

pub const SIMULATION_PLOT_FILENAME: &str = "simulation_paths.png";

const WIDTH: u32 = 1500;
const HEIGHT: u32 = 600;

const GRAY: RGBColor = RGBColor(128, 128, 128);
const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);

/// Render the simulation chart. Defaults to `simulation_paths.png` in the
/// working directory when no save path is given.
///
/// The left panel overlays the first `n_paths_to_plot` path ids (ascending,
/// not randomly sampled) at low opacity with the cross-path mean and the
/// 5th-95th percentile band; the right panel is the terminal-value
/// histogram.
pub fn plot_simulation_paths(
    panel: &SimulationPanel,
    n_paths_to_plot: usize,
    output_path: Option<&Path>,
) -> Result<PathBuf, VizError> {
    let output_path = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(SIMULATION_PLOT_FILENAME));
    super::ensure_parent_dir(&output_path)?;

    draw(panel, n_paths_to_plot, &output_path)
        .map_err(|e| super::render_error(&output_path, e))?;
    Ok(output_path)
}

fn draw(
    panel: &SimulationPanel,
    n_paths_to_plot: usize,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;
    let halves = root.split_evenly((1, 2));

    draw_paths(&halves[0], panel, n_paths_to_plot)?;
    draw_terminal_histogram(&halves[1], panel)?;

    root.present()?;
    Ok(())
}

type Panel<'a> = DrawingArea<BitMapBackend<'a>, plotters::coord::Shift>;

fn draw_paths(
    area: &Panel<'_>,
    panel: &SimulationPanel,
    n_paths_to_plot: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let n_to_plot = n_paths_to_plot.min(panel.n_paths);

    let by_observation = returns_by_observation(panel);
    let x_max = by_observation.keys().next_back().copied().unwrap_or(1) as f64;
    let returns = panel.returns();
    let (y0, y1) = super::padded_range(stats::min(&returns), stats::max(&returns));

    let mut chart = ChartBuilder::on(area)
        .caption(
            format!("Simulated Paths (showing {n_to_plot} of {})", panel.n_paths),
            ("sans-serif", 24),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max.max(1.0), y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("Observation")
        .y_desc("Simulated Returns")
        .draw()?;

    // Individual trajectories, semi-transparent.
    for path_id in panel.path_ids().into_iter().take(n_to_plot) {
        chart.draw_series(LineSeries::new(
            panel
                .path_returns(path_id)
                .into_iter()
                .map(|(obs, ret)| (obs as f64, ret)),
            GRAY.mix(0.3),
        ))?;
    }

    // Cross-path mean.
    let mean_path: Vec<(f64, f64)> = by_observation
        .iter()
        .map(|(obs, values)| (*obs as f64, stats::mean(values)))
        .collect();
    chart
        .draw_series(LineSeries::new(mean_path, BLUE.stroke_width(2)))?
        .label("Mean Path")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    // 5th-95th percentile band.
    let mut band: Vec<(f64, f64)> = by_observation
        .iter()
        .map(|(obs, values)| (*obs as f64, stats::percentile(values, 95.0)))
        .collect();
    band.extend(
        by_observation
            .iter()
            .rev()
            .map(|(obs, values)| (*obs as f64, stats::percentile(values, 5.0))),
    );
    chart
        .draw_series(std::iter::once(Polygon::new(band, BLUE.mix(0.2))))?
        .label("5th-95th Percentile")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], BLUE.mix(0.2).filled()));

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;
    Ok(())
}

fn draw_terminal_histogram(
    area: &Panel<'_>,
    panel: &SimulationPanel,
) -> Result<(), Box<dyn std::error::Error>> {
    let terminal = panel.terminal_returns();
    let bins = super::histogram_bins(&terminal, 30);
    let (x0, x1) = super::padded_range(stats::min(&terminal), stats::max(&terminal));
    let peak = bins.iter().map(|(_, _, d)| *d).fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(area)
        .caption("Distribution of Terminal Values", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, 0f64..peak.max(1e-12) * 1.1)?;

    chart
        .configure_mesh()
        .x_desc("Terminal Value")
        .y_desc("Density")
        .draw()?;

    chart.draw_series(bins.iter().map(|(lo, hi, density)| {
        Rectangle::new([(*lo, 0.0), (*hi, *density)], STEEL_BLUE.mix(0.7).filled())
    }))?;

    let mean = stats::mean(&terminal);
    if mean.is_finite() {
        chart
            .draw_series(LineSeries::new(
                [(mean, 0.0), (mean, peak * 1.1)],
                RED.stroke_width(2),
            ))?
            .label(format!("Mean: {mean:.4}"))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

        chart
            .configure_series_labels()
            .border_style(&BLACK)
            .background_style(&WHITE.mix(0.8))
            .draw()?;
    }
    Ok(())
}

/// Finite returns grouped by observation index, ascending.
fn returns_by_observation(panel: &SimulationPanel) -> BTreeMap<u64, Vec<f64>> {
    let mut grouped: BTreeMap<u64, Vec<f64>> = BTreeMap::new();
    for row in &panel.rows {
        if row.return_.is_finite() {
            grouped.entry(row.observation).or_default().push(row.return_);
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SimRow;

    fn panel() -> SimulationPanel {
        SimulationPanel {
            rows: vec![
                SimRow { path: 0, observation: 0, return_: 0.01, volatility: 0.05 },
                SimRow { path: 0, observation: 1, return_: 0.03, volatility: 0.06 },
                SimRow { path: 1, observation: 0, return_: -0.01, volatility: 0.04 },
                SimRow { path: 1, observation: 1, return_: 0.01, volatility: 0.05 },
            ],
            n_paths: 2,
            n_obs_per_path: 2,
        }
    }

    #[test]
    fn grouping_by_observation_is_cross_path() {
        let grouped = returns_by_observation(&panel());
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&0], vec![0.01, -0.01]);
        assert_eq!(grouped[&1], vec![0.03, 0.01]);
    }
}
