//! Model fit report.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::domain::{format_model_spec, ArimaParams, GarchParams, ModelArtifact, TimeSeries};
use crate::error::VizError;
use crate::stats;

use super::ReportBuilder;

/// Write the fit report, stamped with the current time.
pub fn generate_fit_report(
    series: &TimeSeries,
    model: &ModelArtifact,
    plot_path: &Path,
    output_path: &Path,
    use_data_uri: bool,
) -> Result<PathBuf, VizError> {
    let contents = render_fit_report(series, model, plot_path, use_data_uri, Local::now().naive_local());
    super::write_report(output_path, &contents)
}

/// Render the fit report. Pure: identical inputs and timestamp yield an
/// identical document.
pub fn render_fit_report(
    series: &TimeSeries,
    model: &ModelArtifact,
    plot_path: &Path,
    use_data_uri: bool,
    now: NaiveDateTime,
) -> String {
    let model_spec = format_model_spec(model);
    let values = &series.values;

    let mut report = ReportBuilder::new();
    report
        .block(format!(
            "# ARIMA-GARCH Model Fit Report\n\n\
             **Generated:** {}\n\n\
             ## Overview\n\n\
             This report presents the results of fitting an **{model_spec}** model to the provided time series data.\n\n\
             ## Model Specification\n\n\
             - **Model Type:** {model_spec}\n\
             - **Observations:** {}\n\
             - **Date Generated:** {}\n\n",
            super::timestamp_full(now),
            values.len(),
            super::timestamp_date(now),
        ))
        .block(METHODOLOGY)
        .block(statistics_section(values))
        .block(interpretation_section(values))
        .block(parameters_section(model))
        .block(format!(
            "\n## Visualizations\n\n\
             {}\n\n\
             The plot above shows the observed time series data along with key summary statistics for the fitted model.\n\n",
            super::image_markdown(plot_path, "Fit Diagnostics Plot", use_data_uri),
        ))
        .block(KEY_METRICS)
        .block(CAVEATS)
        .block(NEXT_STEPS)
        .block(REFERENCES)
        .block(super::footer(now));
    report.finish()
}

const METHODOLOGY: &str = "\
## Methodology

### ARIMA Component
The ARIMA (AutoRegressive Integrated Moving Average) component models the conditional mean of the time series. It captures:
- **AutoRegressive (AR):** Past values' influence on current value
- **Integration (I):** Level of differencing to achieve stationarity
- **Moving Average (MA):** Past forecast errors' influence on current value

### GARCH Component
The GARCH (Generalized AutoRegressive Conditional Heteroskedasticity) component models the conditional variance, capturing:
- **Volatility clustering:** Periods of high/low volatility tend to persist
- **Time-varying variance:** More accurate uncertainty quantification

";

fn statistics_section(values: &[f64]) -> String {
    format!(
        "## Data Summary Statistics\n\n\
         | Statistic | Value |\n\
         |-----------|-------|\n\
         | Count | {} |\n\
         | Mean | {:.6} |\n\
         | Std Dev | {:.6} |\n\
         | Min | {:.6} |\n\
         | Max | {:.6} |\n\
         | Skewness | {:.4} |\n\
         | Kurtosis | {:.4} |\n\n",
        values.len(),
        stats::mean(values),
        stats::std_pop(values),
        stats::min(values),
        stats::max(values),
        stats::skewness(values),
        stats::excess_kurtosis(values),
    )
}

/// Threshold-based prose for the shape statistics.
fn interpretation_section(values: &[f64]) -> String {
    let skewness = stats::skewness(values);
    let kurtosis = stats::excess_kurtosis(values);

    let mut out = String::from("### Interpretation\n\n");
    if skewness.abs() < 0.5 {
        out.push_str("- **Skewness:** The distribution appears approximately symmetric.\n");
    } else if skewness > 0.0 {
        out.push_str("- **Skewness:** The distribution is right-skewed (positively skewed) with a tail extending toward positive values.\n");
    } else {
        out.push_str("- **Skewness:** The distribution is left-skewed (negatively skewed) with a tail extending toward negative values.\n");
    }

    if kurtosis.abs() < 0.5 {
        out.push_str("- **Kurtosis:** The distribution has approximately normal tail behavior (mesokurtic).\n");
    } else if kurtosis > 0.0 {
        out.push_str("- **Kurtosis:** The distribution exhibits heavy tails (leptokurtic), suggesting more extreme values than a normal distribution.\n");
    } else {
        out.push_str("- **Kurtosis:** The distribution has light tails (platykurtic), with fewer extreme values than a normal distribution.\n");
    }
    out
}

/// Parameter sections render whichever sub-fields the artifact carries.
fn parameters_section(model: &ModelArtifact) -> String {
    let params = model.parameters.clone().unwrap_or_default();
    let arima = params.arima.unwrap_or_default();
    let garch = params.garch.unwrap_or_default();

    let mut out = String::from("\n## Model Parameters\n\n### ARIMA Parameters\n");
    out.push_str(&arima_parameters(&arima));
    out.push_str("\n### GARCH Parameters\n");
    out.push_str(&garch_parameters(&garch));

    if let Some(persistence) = garch.persistence() {
        let _ = write!(out, "\n**Volatility Persistence:** {persistence:.4}\n");
        if persistence > 0.99 {
            out.push_str("- Very high persistence indicates volatility shocks have long-lasting effects.\n");
        } else if persistence > 0.90 {
            out.push_str("- High persistence suggests volatility shocks decay slowly.\n");
        } else {
            out.push_str("- Moderate persistence indicates volatility shocks dissipate relatively quickly.\n");
        }
    }
    out
}

fn arima_parameters(arima: &ArimaParams) -> String {
    let mut out = String::new();
    if let Some(intercept) = arima.intercept {
        let _ = writeln!(out, "- **Intercept (\u{3bc}):** {intercept:.6}");
    }
    if !arima.ar_coef.is_empty() {
        out.push_str("- **AR Coefficients (\u{3c6}):**\n");
        for (i, coef) in arima.ar_coef.iter().enumerate() {
            let _ = writeln!(out, "  - \u{3c6}{} = {coef:.6}", i + 1);
        }
    }
    if !arima.ma_coef.is_empty() {
        out.push_str("- **MA Coefficients (\u{3b8}):**\n");
        for (i, coef) in arima.ma_coef.iter().enumerate() {
            let _ = writeln!(out, "  - \u{3b8}{} = {coef:.6}", i + 1);
        }
    }
    out
}

fn garch_parameters(garch: &GarchParams) -> String {
    let mut out = String::new();
    if let Some(omega) = garch.omega {
        let _ = writeln!(out, "- **Omega (\u{3c9}):** {omega:.6} - Base level of volatility");
    }
    if !garch.alpha_coef.is_empty() {
        out.push_str("- **Alpha Coefficients (\u{3b1}):** Response to past shocks\n");
        for (i, coef) in garch.alpha_coef.iter().enumerate() {
            let _ = writeln!(out, "  - \u{3b1}{} = {coef:.6}", i + 1);
        }
    }
    if !garch.beta_coef.is_empty() {
        out.push_str("- **Beta Coefficients (\u{3b2}):** Persistence of volatility\n");
        for (i, coef) in garch.beta_coef.iter().enumerate() {
            let _ = writeln!(out, "  - \u{3b2}{} = {coef:.6}", i + 1);
        }
    }
    out
}

const KEY_METRICS: &str = "\
## Key Metrics

The model was successfully estimated using maximum likelihood estimation. Key model quality metrics include:

- **Log-Likelihood:** Higher values indicate better fit to the data
- **AIC (Akaike Information Criterion):** Lower values preferred; balances fit and complexity
- **BIC (Bayesian Information Criterion):** Lower values preferred; penalizes complexity more than AIC

";

const CAVEATS: &str = "\
## Caveats and Considerations

1. **Model Assumptions:**
   - ARIMA assumes linear relationships in the mean equation
   - GARCH assumes the conditional variance follows a specific functional form
   - Innovations are assumed to be normally distributed (or student-t in some variants)

2. **Sample Size:** Results are most reliable with sufficient data (typically 500+ observations for GARCH models)

3. **Stationarity:** The time series should be stationary (or made stationary through differencing)

4. **Parameter Constraints:** All parameters should satisfy stationarity and non-negativity constraints

5. **Out-of-Sample Performance:** In-sample fit doesn't guarantee good out-of-sample forecasting performance

";

const NEXT_STEPS: &str = "\
## Next Steps

1. **Diagnostic Analysis:** Run residual diagnostics to check model adequacy:
   ```bash
   ag-viz diagnostics -m model.json -d data.csv -o ./diagnostics/
   ```

2. **Forecasting:** Generate forecasts with confidence intervals:
   ```bash
   ag-viz forecast -m model.json -n 30 -o forecast.csv
   ```

3. **Simulation:** Simulate paths to understand model behavior:
   ```bash
   ag-viz simulate -m model.json -p 100 -n 1000 -o simulation.csv
   ```

4. **Model Selection:** Consider comparing with alternative specifications:
   ```bash
   ag select -d data.csv -c BIC -o best_model.json
   ```

";

const REFERENCES: &str = "\
## References

- Bollerslev, T. (1986). Generalized autoregressive conditional heteroskedasticity. Journal of Econometrics.
- Box, G. E. P., & Jenkins, G. M. (1970). Time Series Analysis: Forecasting and Control.
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArimaOrder, GarchOrder, ModelParameters, ModelSpec};
    use chrono::NaiveDate;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    fn model() -> ModelArtifact {
        ModelArtifact {
            spec: Some(ModelSpec {
                arima: Some(ArimaOrder { p: 1, d: 0, q: 1 }),
                garch: Some(GarchOrder { p: 1, q: 1 }),
            }),
            parameters: Some(ModelParameters {
                arima: Some(ArimaParams {
                    intercept: Some(0.05),
                    ar_coef: vec![0.6],
                    ma_coef: vec![0.3],
                }),
                garch: Some(GarchParams {
                    omega: Some(0.01),
                    alpha_coef: vec![0.1],
                    beta_coef: vec![0.85],
                }),
            }),
        }
    }

    fn series() -> TimeSeries {
        TimeSeries {
            name: "value".to_string(),
            values: vec![0.01, -0.02, 0.03, 0.0, 0.015],
        }
    }

    #[test]
    fn renders_all_sections() {
        let report = render_fit_report(
            &series(),
            &model(),
            Path::new("output/fit_diagnostics.png"),
            false,
            fixed_now(),
        );
        assert!(report.contains("# ARIMA-GARCH Model Fit Report"));
        assert!(report.contains("ARIMA(1,0,1)-GARCH(1,1)"));
        assert!(report.contains("## Overview"));
        assert!(report.contains("## Methodology"));
        assert!(report.contains("## Data Summary Statistics"));
        assert!(report.contains("## Model Parameters"));
        assert!(report.contains("## Next Steps"));
        assert!(report.contains("**Generated:** 2024-06-01 12:30:00"));
        assert!(report.contains("![Fit Diagnostics Plot](fit_diagnostics.png)"));
        assert!(report.contains("**Volatility Persistence:** 0.9500"));
    }

    #[test]
    fn minimal_parameters_degrade_gracefully() {
        let minimal = ModelArtifact {
            spec: Some(ModelSpec {
                arima: Some(ArimaOrder { p: 1, d: 0, q: 0 }),
                garch: Some(GarchOrder { p: 1, q: 1 }),
            }),
            parameters: Some(ModelParameters::default()),
        };
        let report = render_fit_report(
            &series(),
            &minimal,
            Path::new("fit.png"),
            false,
            fixed_now(),
        );
        assert!(report.contains("### ARIMA Parameters"));
        assert!(report.contains("### GARCH Parameters"));
        assert!(!report.contains("Volatility Persistence"));
    }

    #[test]
    fn rendering_is_idempotent_with_fixed_timestamp() {
        let a = render_fit_report(&series(), &model(), Path::new("p.png"), false, fixed_now());
        let b = render_fit_report(&series(), &model(), Path::new("p.png"), false, fixed_now());
        assert_eq!(a, b);
    }
}
