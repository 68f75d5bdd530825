//! Diagnostic analysis report.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::domain::{format_model_spec, DiagnosticsReport, ModelArtifact, TimeSeries};
use crate::error::VizError;

use super::ReportBuilder;

/// Write the diagnostics report, stamped with the current time.
pub fn generate_diagnostics_report(
    model: &ModelArtifact,
    series: &TimeSeries,
    diagnostics: Option<&DiagnosticsReport>,
    plot_path: &Path,
    output_path: &Path,
    use_data_uri: bool,
) -> Result<PathBuf, VizError> {
    let contents = render_diagnostics_report(
        model,
        series,
        diagnostics,
        plot_path,
        use_data_uri,
        Local::now().naive_local(),
    );
    super::write_report(output_path, &contents)
}

/// Render the diagnostics report. Pure: identical inputs and timestamp yield
/// an identical document. `diagnostics` is `None` when the engine wrote no
/// diagnostics file; the results section degrades accordingly.
pub fn render_diagnostics_report(
    model: &ModelArtifact,
    series: &TimeSeries,
    diagnostics: Option<&DiagnosticsReport>,
    plot_path: &Path,
    use_data_uri: bool,
    now: NaiveDateTime,
) -> String {
    let model_spec = format_model_spec(model);
    let n_obs = series.len();

    let mut report = ReportBuilder::new();
    report
        .block(format!(
            "# ARIMA-GARCH Diagnostic Analysis Report\n\n\
             **Generated:** {}\n\n\
             ## Overview\n\n\
             This report presents comprehensive diagnostic analysis for a fitted **{model_spec}** model on **{n_obs} observations**.\n\n\
             ## Model Specification\n\n\
             - **Model Type:** {model_spec}\n\
             - **Observations:** {n_obs}\n\
             - **Date Generated:** {}\n\n",
            super::timestamp_full(now),
            super::timestamp_date(now),
        ))
        .block(METHODOLOGY)
        .block(results_section(diagnostics))
        .block(format!(
            "\n## Residual Analysis Plots\n\n\
             {}\n\n{PLOT_GUIDE}",
            super::image_markdown(plot_path, "Residual Diagnostic Plots", use_data_uri),
        ))
        .block(findings_section(diagnostics))
        .block(CAVEATS)
        .block(NEXT_STEPS)
        .block(REFERENCES)
        .block(super::footer(now));
    report.finish()
}

const METHODOLOGY: &str = "\
## Methodology

### Purpose of Diagnostic Analysis

Diagnostic tests assess whether the fitted model adequately captures the patterns in the data. Key aspects examined:

1. **Residual Independence:** Are residuals free from autocorrelation?
2. **Normality:** Do residuals follow a normal distribution?
3. **Heteroskedasticity:** Has the GARCH component adequately captured volatility clustering?
4. **Model Adequacy:** Does the model provide a good statistical fit?

### Diagnostic Tests

#### Ljung-Box Test
Tests for autocorrelation in residuals at multiple lags.
- **Null Hypothesis:** Residuals are independently distributed (no autocorrelation)
- **Interpretation:** p-value > 0.05 suggests residuals are uncorrelated (desired)

#### Ljung-Box Test on Squared Residuals
Tests whether GARCH has captured all volatility clustering.
- **Null Hypothesis:** Squared residuals show no autocorrelation
- **Interpretation:** p-value > 0.05 suggests GARCH adequately models conditional variance

#### Jarque-Bera Test
Tests for normality of residuals.
- **Null Hypothesis:** Residuals are normally distributed
- **Interpretation:** p-value > 0.05 suggests approximate normality (though some deviation is common)

";

/// Test-result tables, rendered only for the tests actually present.
fn results_section(diagnostics: Option<&DiagnosticsReport>) -> String {
    let mut out = String::from("## Diagnostic Test Results\n\n");

    let Some(diag) = diagnostics else {
        out.push_str("*Diagnostic test results not available.*\n\n");
        return out;
    };

    let mut rendered_any = false;

    if let Some(lb) = diag.ljung_box_test.as_ref().filter(|lb| !lb.is_empty()) {
        rendered_any = true;
        out.push_str("### Ljung-Box Test Results\n\n");
        out.push_str("| Lag | Test Statistic | p-value | Result |\n");
        out.push_str("|-----|----------------|---------|--------|\n");

        for ((lag, stat), pval) in lb
            .lags
            .iter()
            .zip(lb.statistics.iter())
            .zip(lb.pvalues.iter())
        {
            let result = if *pval > 0.05 { "\u{2713} Pass" } else { "\u{2717} Fail" };
            let _ = writeln!(out, "| {lag} | {stat:.4} | {pval:.4} | {result} |");
        }

        let failing = lb.pvalues.iter().filter(|p| **p <= 0.05).count();
        if failing == 0 {
            out.push_str("\n**Interpretation:** All Ljung-Box tests pass, indicating residuals are free from significant autocorrelation. The model adequately captures temporal dependencies.\n\n");
        } else if failing * 2 < lb.pvalues.len() {
            let _ = writeln!(
                out,
                "\n**Interpretation:** {failing} out of {} tests show some autocorrelation. Consider increasing model orders or investigating specific lags.\n",
                lb.pvalues.len()
            );
        } else {
            out.push_str("\n**Interpretation:** Significant autocorrelation detected in residuals. The model may be misspecified. Consider alternative model orders.\n\n");
        }
    }

    if let Some(jb) = diag.jarque_bera_test.as_ref() {
        rendered_any = true;
        out.push_str("### Jarque-Bera Normality Test\n\n");
        out.push_str("| Statistic | Value |\n");
        out.push_str("|-----------|-------|\n");
        let _ = writeln!(out, "| Test Statistic | {} |", format_optional(jb.statistic));
        let _ = writeln!(out, "| p-value | {} |", format_optional(jb.pvalue));

        if let Some(pval) = jb.pvalue {
            if pval > 0.05 {
                out.push_str("\n**Interpretation:** Residuals appear approximately normally distributed (p > 0.05). This supports model assumptions.\n\n");
            } else {
                out.push_str("\n**Interpretation:** Residuals deviate from normality (p \u{2264} 0.05). This is common in financial data and may suggest considering Student-t innovations or checking for outliers.\n\n");
            }
        }
    }

    if !rendered_any {
        out.push_str("*Diagnostic test results not available.*\n\n");
    }
    out
}

fn format_optional(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "N/A".to_string(),
    }
}

const PLOT_GUIDE: &str = "\
The comprehensive diagnostic plot above includes:

1. **Standardized Residuals:** Should appear as white noise (random fluctuations around zero)
2. **Histogram:** Should approximate a normal distribution
3. **QQ-Plot:** Points should follow the diagonal line for normality
4. **ACF of Residuals:** Should show no significant autocorrelation (bars within confidence bands)
5. **ACF of Squared Residuals:** Should show no significant autocorrelation if GARCH adequately models volatility

";

/// Overall adequacy bullets from whatever test results are present.
fn findings_section(diagnostics: Option<&DiagnosticsReport>) -> String {
    let mut out = String::from("## Key Findings\n\n### Model Adequacy Assessment\n\n");

    let mut bullets = String::new();

    if let Some(lb) = diagnostics.and_then(|d| d.ljung_box_test.as_ref()) {
        if !lb.pvalues.is_empty() {
            let passing = lb.pvalues.iter().filter(|p| **p > 0.05).count() as f64;
            let rate = passing / lb.pvalues.len() as f64;
            if rate > 0.8 {
                bullets.push_str("- **Overall Assessment:** The model demonstrates good fit with most diagnostic tests passing.\n");
            } else if rate > 0.5 {
                bullets.push_str("- **Overall Assessment:** The model shows acceptable fit, though some improvements may be possible.\n");
            } else {
                bullets.push_str("- **Overall Assessment:** The model may benefit from specification changes or alternative orders.\n");
            }
        }
    }

    if let Some(pval) = diagnostics
        .and_then(|d| d.jarque_bera_test.as_ref())
        .and_then(|jb| jb.pvalue)
    {
        if pval < 0.01 {
            bullets.push_str("- **Normality:** Residuals show substantial departure from normality. Consider robust methods or alternative innovation distributions.\n");
        } else if pval < 0.05 {
            bullets.push_str("- **Normality:** Residuals show some departure from normality, which is common in practice.\n");
        }
    }

    if bullets.is_empty() {
        bullets.push_str(
            "- Examine the residual plots above for visual assessment of model adequacy.\n",
        );
    }

    out.push_str(&bullets);
    out.push('\n');
    out
}

const CAVEATS: &str = "\
## Caveats and Considerations

1. **Diagnostic Limitations:**
   - Tests have varying power depending on sample size
   - Multiple testing increases chance of spurious rejections
   - Some tests (e.g., normality) are often violated in practice without severely impacting usefulness

2. **Practical vs. Statistical Significance:**
   - Slight deviations from ideal diagnostics may be acceptable
   - Consider both statistical tests and visual inspection
   - Economic significance may differ from statistical significance

3. **Model Refinement:**
   - Failed diagnostics suggest areas for improvement, not necessarily model failure
   - Consider both increasing and decreasing model complexity
   - Balance model complexity with interpretability and overfitting concerns

4. **Sample Size Effects:**
   - Diagnostic tests become more powerful with larger samples
   - May detect minor deviations that have little practical impact
   - With small samples, tests may lack power to detect real issues

";

const NEXT_STEPS: &str = "\
## Next Steps

### If Diagnostics Are Satisfactory

1. **Proceed with Forecasting:**
   ```bash
   ag-viz forecast -m model.json -n 30 -o forecast.csv --markdown forecast_report.md
   ```

2. **Generate Scenarios:**
   ```bash
   ag-viz simulate -m model.json -p 1000 -n 500 -o simulation.csv --markdown simulation_report.md
   ```

### If Diagnostics Indicate Issues

1. **Try Alternative Specifications:**
   ```bash
   ag select -d data.csv -c BIC --max-p 3 --max-q 3 -o alternative_model.json
   ```

2. **Increase Model Orders:** If autocorrelation persists, try higher AR/MA orders

3. **Examine Outliers:** Investigate unusual observations that may affect fit

4. **Consider Extensions:**
   - Asymmetric GARCH models (if volatility responds differently to positive/negative shocks)
   - Student-t innovations (if heavy tails are present)
   - Seasonal components (if data exhibits seasonality)

";

const REFERENCES: &str = "\
## References

- Ljung, G. M., & Box, G. E. P. (1978). On a Measure of Lack of Fit in Time Series Models. Biometrika.
- Jarque, C. M., & Bera, A. K. (1980). Efficient tests for normality, homoscedasticity and serial independence. Economics Letters.
- Engle, R. F., & Ng, V. K. (1993). Measuring and Testing the Impact of News on Volatility. Journal of Finance.
";
