//! Forecast chart: mean trajectory with shaded confidence bands.

use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::domain::{format_model_spec, ForecastTable, ModelArtifact};
use crate::error::VizError;
use crate::stats;

pub const FORECAST_PLOT_FILENAME: &str = "forecast.png";

/// Confidence levels drawn when the caller does not supply a list.
pub const DEFAULT_CONFIDENCE_LEVELS: [f64; 2] = [0.68, 0.95];

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 600;

const BAND_COLORS: [RGBColor; 2] = [
    RGBColor(173, 216, 230), // light blue
    RGBColor(255, 255, 224), // light yellow
];
const BAND_ALPHAS: [f64; 2] = [0.5, 0.3];

/// Half-width of the two-sided confidence band at `level` for one step.
///
/// Uses the exact standard-normal quantile; the report's detailed table
/// intentionally uses the literal 1.96 instead.
pub fn band_half_width(level: f64, std_dev: f64) -> f64 {
    stats::confidence_z(level) * std_dev
}

/// Render the forecast chart. Defaults to `forecast.png` in the working
/// directory when no save path is given.
pub fn plot_forecast(
    model: &ModelArtifact,
    forecast: &ForecastTable,
    confidence_levels: &[f64],
    save: Option<&Path>,
) -> Result<PathBuf, VizError> {
    let output_path = save
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(FORECAST_PLOT_FILENAME));
    super::ensure_parent_dir(&output_path)?;

    let levels = if confidence_levels.is_empty() {
        &DEFAULT_CONFIDENCE_LEVELS[..]
    } else {
        confidence_levels
    };

    draw(model, forecast, levels, &output_path)
        .map_err(|e| super::render_error(&output_path, e))?;
    Ok(output_path)
}

fn draw(
    model: &ModelArtifact,
    forecast: &ForecastTable,
    levels: &[f64],
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let steps: Vec<f64> = forecast.rows.iter().map(|r| r.step as f64).collect();
    let x0 = steps.iter().copied().fold(f64::NAN, f64::min);
    let x1 = steps.iter().copied().fold(f64::NAN, f64::max);
    let (x0, x1) = if x0.is_finite() && x1 > x0 { (x0, x1) } else { (0.0, 1.0) };

    // Y bounds must contain the widest requested band.
    let z_max = levels
        .iter()
        .map(|l| stats::confidence_z(*l))
        .fold(0.0, f64::max);
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for row in &forecast.rows {
        lo = lo.min(row.mean - z_max * row.std_dev);
        hi = hi.max(row.mean + z_max * row.std_dev);
    }
    let (y0, y1) = super::padded_range(lo, hi);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Forecast - {}", format_model_spec(model)),
            ("sans-serif", 26),
        )
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("Forecast Horizon (steps ahead)")
        .y_desc("Forecasted Value")
        .draw()?;

    for (i, level) in levels.iter().enumerate() {
        let color = BAND_COLORS[i % BAND_COLORS.len()];
        let alpha = BAND_ALPHAS[i % BAND_ALPHAS.len()];

        let mut band: Vec<(f64, f64)> = forecast
            .rows
            .iter()
            .map(|r| (r.step as f64, r.mean + band_half_width(*level, r.std_dev)))
            .collect();
        band.extend(
            forecast
                .rows
                .iter()
                .rev()
                .map(|r| (r.step as f64, r.mean - band_half_width(*level, r.std_dev))),
        );

        chart
            .draw_series(std::iter::once(Polygon::new(band, color.mix(alpha))))?
            .label(format!("{:.0}% CI", level * 100.0))
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.mix(alpha).filled())
            });
    }

    chart
        .draw_series(LineSeries::new(
            forecast.rows.iter().map(|r| (r.step as f64, r.mean)),
            BLUE.stroke_width(2),
        ))?
        .label("Mean Forecast")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_half_width_uses_two_sided_quantile() {
        // z(0.95) = 1.959964, not the tabular literal 1.96.
        assert!((band_half_width(0.95, 0.1) - 0.1959964).abs() < 1e-5);
        assert!((band_half_width(0.68, 1.0) - 0.994458).abs() < 1e-4);
    }

    #[test]
    fn default_levels_are_68_and_95() {
        assert_eq!(DEFAULT_CONFIDENCE_LEVELS, [0.68, 0.95]);
    }
}
