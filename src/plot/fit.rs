//! Fit diagnostics chart: observed series over a summary-statistics panel.

use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::domain::{format_model_spec, ModelArtifact, TimeSeries};
use crate::error::VizError;
use crate::stats;

pub const FIT_PLOT_FILENAME: &str = "fit_diagnostics.png";

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 800;

/// Render the fit diagnostics chart into `output_dir`.
///
/// The upper panel is the raw series; the lower panel is a fixed-format
/// monospace block of summary statistics.
pub fn plot_fit_diagnostics(
    series: &TimeSeries,
    model: &ModelArtifact,
    output_dir: &Path,
) -> Result<PathBuf, VizError> {
    super::ensure_dir(output_dir)?;
    let output_path = output_dir.join(FIT_PLOT_FILENAME);
    draw(series, model, &output_path).map_err(|e| super::render_error(&output_path, e))?;
    Ok(output_path)
}

fn draw(
    series: &TimeSeries,
    model: &ModelArtifact,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    // 3:1 split, series panel on top.
    let (upper, lower) = root.split_vertically((HEIGHT * 3 / 4) as i32);

    let n = series.len().max(1);
    let (y0, y1) = super::padded_range(stats::min(&series.values), stats::max(&series.values));

    let mut chart = ChartBuilder::on(&upper)
        .caption(
            format!("Time Series Data - {}", format_model_spec(model)),
            ("sans-serif", 24),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..n as f64, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("Observation")
        .y_desc("Value")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            series
                .values
                .iter()
                .enumerate()
                .map(|(i, v)| (i as f64, *v)),
            &BLUE,
        ))?
        .label("Observed Data")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;

    for (i, line) in summary_lines(series, model).iter().enumerate() {
        lower.draw(&Text::new(
            line.clone(),
            (40, 12 + i as i32 * 22),
            ("monospace", 18).into_font(),
        ))?;
    }

    root.present()?;
    Ok(())
}

/// Fixed-format statistics block shown under the series panel.
fn summary_lines(series: &TimeSeries, model: &ModelArtifact) -> Vec<String> {
    let v = &series.values;
    vec![
        format!("Model: {}", format_model_spec(model)),
        format!("Observations: {}", v.len()),
        format!("Mean: {:.6}", stats::mean(v)),
        format!("Std Dev: {:.6}", stats::std_pop(v)),
        format!("Min: {:.6}", stats::min(v)),
        format!("Max: {:.6}", stats::max(v)),
        format!("Skewness: {:.4}", stats::skewness(v)),
        format!("Kurtosis: {:.4}", stats::excess_kurtosis(v)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArimaOrder, GarchOrder, ModelSpec};

    #[test]
    fn summary_lines_fixed_format() {
        let series = TimeSeries {
            name: "value".to_string(),
            values: vec![0.01, -0.02, 0.03, 0.0],
        };
        let model = ModelArtifact {
            spec: Some(ModelSpec {
                arima: Some(ArimaOrder { p: 1, d: 0, q: 1 }),
                garch: Some(GarchOrder { p: 1, q: 1 }),
            }),
            parameters: None,
        };
        let lines = summary_lines(&series, &model);
        assert_eq!(lines[0], "Model: ARIMA(1,0,1)-GARCH(1,1)");
        assert_eq!(lines[1], "Observations: 4");
        assert_eq!(lines[2], "Mean: 0.005000");
        assert!(lines[6].starts_with("Skewness: "));
        // 6 decimal places for moments, 4 for shape statistics.
        assert_eq!(lines[3].split('.').next_back().unwrap().len(), 6);
        assert_eq!(lines[7].split('.').next_back().unwrap().len(), 4);
    }
}
