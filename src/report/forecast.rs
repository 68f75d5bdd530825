//! Forecast report.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::domain::{format_model_spec, ForecastTable, ModelArtifact};
use crate::error::VizError;
use crate::stats;

use super::ReportBuilder;

/// Literal z used by the detailed table. The plot's bands use the exact
/// standard-normal quantile (1.959964); this table keeps the conventional
/// 1.96 on purpose.
const TABLE_Z: f64 = 1.96;

/// Write the forecast report, stamped with the current time.
pub fn generate_forecast_report(
    model: &ModelArtifact,
    forecast: &ForecastTable,
    plot_path: &Path,
    output_path: &Path,
    use_data_uri: bool,
) -> Result<PathBuf, VizError> {
    let contents =
        render_forecast_report(model, forecast, plot_path, use_data_uri, Local::now().naive_local());
    super::write_report(output_path, &contents)
}

/// Render the forecast report. Pure: identical inputs and timestamp yield an
/// identical document.
pub fn render_forecast_report(
    model: &ModelArtifact,
    forecast: &ForecastTable,
    plot_path: &Path,
    use_data_uri: bool,
    now: NaiveDateTime,
) -> String {
    let model_spec = format_model_spec(model);
    let horizon = forecast.horizon();

    let mut report = ReportBuilder::new();
    report
        .block(format!(
            "# ARIMA-GARCH Forecast Report\n\n\
             **Generated:** {}\n\n\
             ## Overview\n\n\
             This report presents forecasts generated from a **{model_spec}** model over a **{horizon}-step horizon**.\n\n\
             ## Model Specification\n\n\
             - **Model Type:** {model_spec}\n\
             - **Forecast Horizon:** {horizon} steps ahead\n\
             - **Date Generated:** {}\n\n",
            super::timestamp_full(now),
            super::timestamp_date(now),
        ))
        .block(METHODOLOGY)
        .block(summary_section(forecast))
        .block(format!(
            "## Forecast Trajectory\n\n\
             {}\n\n\
             The plot above shows the mean forecast (blue line) along with 68% and 95% confidence intervals.\n\n",
            super::image_markdown(plot_path, "Forecast Plot with Confidence Intervals", use_data_uri),
        ))
        .block(detailed_table_section(forecast))
        .block(insights_section(forecast))
        .block(CAVEATS)
        .block(next_steps_section(model, horizon))
        .block(REFERENCES)
        .block(super::footer(now));
    report.finish()
}

const METHODOLOGY: &str = "\
## Methodology

### Multi-Step Ahead Forecasting

ARIMA-GARCH models produce forecasts for both the conditional mean and conditional variance:

1. **Mean Forecast:** Predicted value at each future time step based on the ARIMA component
2. **Variance Forecast:** Predicted uncertainty (volatility) at each future time step based on the GARCH component

### Confidence Intervals

Forecast confidence intervals are computed assuming normally distributed forecast errors:
- **68% CI:** Approximately \u{b1}1 standard deviation from the mean
- **95% CI:** Approximately \u{b1}2 standard deviations from the mean

Note: As the forecast horizon increases, prediction intervals typically widen, reflecting increased uncertainty.

";

fn summary_section(forecast: &ForecastTable) -> String {
    let means = forecast.means();
    let std_devs = forecast.std_devs();
    format!(
        "## Forecast Summary\n\n\
         | Statistic | Value |\n\
         |-----------|-------|\n\
         | Mean of Forecasts | {:.6} |\n\
         | Std Dev of Forecasts | {:.6} |\n\
         | Min Forecast | {:.6} |\n\
         | Max Forecast | {:.6} |\n\
         | Average Forecast Std Dev | {:.6} |\n\n",
        stats::mean(&means),
        stats::std_sample(&means),
        stats::min(&means),
        stats::max(&means),
        stats::mean(&std_devs),
    )
}

fn detailed_table_section(forecast: &ForecastTable) -> String {
    let mut out = String::from(
        "## Detailed Forecast Table\n\n\
         | Step | Mean Forecast | Std Dev | 95% CI Lower | 95% CI Upper |\n\
         |------|---------------|---------|--------------|--------------|\n",
    );
    for row in &forecast.rows {
        let ci_lower = row.mean - TABLE_Z * row.std_dev;
        let ci_upper = row.mean + TABLE_Z * row.std_dev;
        let _ = writeln!(
            out,
            "| {} | {:.6} | {:.6} | {:.6} | {:.6} |",
            row.step, row.mean, row.std_dev, ci_lower, ci_upper
        );
    }
    out.push('\n');
    out
}

/// Threshold-based prose on trend, uncertainty growth, and variability.
fn insights_section(forecast: &ForecastTable) -> String {
    let means = forecast.means();
    let std_devs = forecast.std_devs();

    let mut out = String::from("## Key Insights\n\n");

    if means.len() > 1 {
        let trend = means[means.len() - 1] - means[0];
        if trend.abs() < 0.01 * means[0].abs() {
            out.push_str("- **Trend:** The forecast exhibits a relatively stable trajectory with minimal drift.\n");
        } else if trend > 0.0 {
            let _ = writeln!(
                out,
                "- **Trend:** The forecast shows an upward trend of approximately {trend:.4} over the horizon."
            );
        } else {
            let _ = writeln!(
                out,
                "- **Trend:** The forecast shows a downward trend of approximately {:.4} over the horizon.",
                trend.abs()
            );
        }
    }

    if std_devs.len() > 1 && std_devs[0] > 0.0 {
        let growth = std_devs[std_devs.len() - 1] / std_devs[0];
        if growth > 1.5 {
            let _ = writeln!(
                out,
                "- **Uncertainty Growth:** Forecast uncertainty increases significantly (by {:.1}%) over the horizon, indicating higher confidence in near-term predictions.",
                (growth - 1.0) * 100.0
            );
        } else if growth > 1.1 {
            let _ = writeln!(
                out,
                "- **Uncertainty Growth:** Forecast uncertainty increases moderately (by {:.1}%) over the horizon.",
                (growth - 1.0) * 100.0
            );
        } else {
            out.push_str(
                "- **Uncertainty:** Forecast uncertainty remains relatively stable across the horizon.\n",
            );
        }
    }

    let avg_vol = stats::mean(&std_devs);
    let mean_of_means = stats::mean(&means);
    if avg_vol > 0.0 && mean_of_means != 0.0 && mean_of_means.is_finite() {
        let cv = stats::std_pop(&means) / mean_of_means.abs();
        let _ = write!(out, "- **Coefficient of Variation:** {cv:.4} - ");
        if cv < 0.5 {
            out.push_str("Relatively low variability in forecasts.\n");
        } else {
            out.push_str("Substantial variability in forecasts.\n");
        }
    }

    out.push('\n');
    out
}

const CAVEATS: &str = "\
## Caveats and Considerations

1. **Forecast Horizon:** Forecast accuracy typically decreases as the horizon increases. Near-term forecasts (1-10 steps) are generally more reliable.

2. **Model Assumptions:** Forecasts assume:
   - Model structure remains appropriate for future observations
   - Parameters remain stable (no structural breaks)
   - No unforeseen shocks or regime changes

3. **Confidence Intervals:**
   - Assume normally distributed forecast errors
   - Do not account for parameter estimation uncertainty
   - May understate true uncertainty in volatile markets

4. **Conditional Nature:** Forecasts are conditional on the model specification and historical data used for estimation.

5. **Use Case Dependent:** Forecasts should be interpreted in context:
   - Financial returns: Short horizons typically more useful
   - Volatility forecasts: May be more stable than mean forecasts

";

fn next_steps_section(model: &ModelArtifact, horizon: usize) -> String {
    let spec = model.spec.clone().unwrap_or_default();
    let arima = spec.arima.unwrap_or_default();
    let garch = spec.garch.unwrap_or_default();
    format!(
        "## Next Steps\n\n\
         1. **Validate Forecasts:** Compare with realized values when available to assess forecast accuracy\n\n\
         2. **Update Model:** Consider refitting the model periodically as new data becomes available:\n   \
         ```bash\n   \
         ag-viz fit -d updated_data.csv -a {},{},{} -g {},{} -o updated_model.json\n   \
         ```\n\n\
         3. **Scenario Analysis:** Simulate multiple paths to understand the distribution of possible outcomes:\n   \
         ```bash\n   \
         ag-viz simulate -m model.json -p 1000 -n {horizon} -o scenarios.csv\n   \
         ```\n\n\
         4. **Combine with Domain Knowledge:** Integrate forecasts with expert judgment and market intelligence\n\n",
        arima.p, arima.d, arima.q, garch.p, garch.q,
    )
}

const REFERENCES: &str = "\
## References

- Bollerslev, T. (1986). Generalized autoregressive conditional heteroskedasticity. Journal of Econometrics.
- Engle, R. F. (1982). Autoregressive Conditional Heteroscedasticity with Estimates of the Variance of United Kingdom Inflation.
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArimaOrder, ForecastRow, GarchOrder, ModelSpec};
    use chrono::NaiveDate;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn model() -> ModelArtifact {
        ModelArtifact {
            spec: Some(ModelSpec {
                arima: Some(ArimaOrder { p: 1, d: 0, q: 1 }),
                garch: Some(GarchOrder { p: 1, q: 1 }),
            }),
            parameters: None,
        }
    }

    fn forecast() -> ForecastTable {
        ForecastTable {
            rows: vec![
                ForecastRow { step: 1, mean: 0.05, variance: Some(0.01), std_dev: 0.1 },
                ForecastRow { step: 2, mean: 0.04, variance: Some(0.012), std_dev: 0.11 },
            ],
        }
    }

    #[test]
    fn detailed_table_uses_literal_z() {
        let report = render_forecast_report(
            &model(),
            &forecast(),
            Path::new("forecast.png"),
            false,
            fixed_now(),
        );
        assert!(report.contains("| 1 | 0.050000 | 0.100000 | -0.146000 | 0.246000 |"));
        assert!(report.contains("| 2 | 0.040000 | 0.110000 | -0.175600 | 0.255600 |"));
    }

    #[test]
    fn renders_all_sections() {
        let report = render_forecast_report(
            &model(),
            &forecast(),
            Path::new("forecast.png"),
            false,
            fixed_now(),
        );
        assert!(report.contains("# ARIMA-GARCH Forecast Report"));
        assert!(report.contains("**2-step horizon**"));
        assert!(report.contains("## Forecast Summary"));
        assert!(report.contains("### Confidence Intervals"));
        assert!(report.contains("## Detailed Forecast Table"));
        assert!(report.contains("ag-viz fit -d updated_data.csv -a 1,0,1 -g 1,1"));
    }

    #[test]
    fn rendering_is_idempotent_with_fixed_timestamp() {
        let a = render_forecast_report(&model(), &forecast(), Path::new("f.png"), false, fixed_now());
        let b = render_forecast_report(&model(), &forecast(), Path::new("f.png"), false, fixed_now());
        assert_eq!(a, b);
    }
}
