//! Simulation report.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::domain::{format_model_spec, ModelArtifact, SimulationPanel};
use crate::error::VizError;
use crate::stats;

use super::ReportBuilder;

/// Write the simulation report, stamped with the current time.
pub fn generate_simulation_report(
    model: &ModelArtifact,
    panel: &SimulationPanel,
    plot_path: &Path,
    output_path: &Path,
    use_data_uri: bool,
) -> Result<PathBuf, VizError> {
    let contents =
        render_simulation_report(model, panel, plot_path, use_data_uri, Local::now().naive_local());
    super::write_report(output_path, &contents)
}

/// Render the simulation report. Pure: identical inputs and timestamp yield
/// an identical document.
pub fn render_simulation_report(
    model: &ModelArtifact,
    panel: &SimulationPanel,
    plot_path: &Path,
    use_data_uri: bool,
    now: NaiveDateTime,
) -> String {
    let model_spec = format_model_spec(model);
    let n_paths = panel.n_paths;
    let length = panel.n_obs_per_path;

    let mut report = ReportBuilder::new();
    report
        .block(format!(
            "# ARIMA-GARCH Simulation Report\n\n\
             **Generated:** {}\n\n\
             ## Overview\n\n\
             This report presents results from simulating **{n_paths} paths** of length **{length}** from a fitted **{model_spec}** model.\n\n\
             ## Model Specification\n\n\
             - **Model Type:** {model_spec}\n\
             - **Number of Paths:** {n_paths}\n\
             - **Path Length:** {length} observations\n\
             - **Date Generated:** {}\n\n",
            super::timestamp_full(now),
            super::timestamp_date(now),
        ))
        .block(METHODOLOGY)
        .block("## Simulation Statistics\n\n")
        .maybe(statistics_sections(panel))
        .block(format!(
            "## Simulation Paths Visualization\n\n\
             {}\n\n{PLOT_GUIDE}",
            super::image_markdown(plot_path, "Simulation Paths with Percentile Bands", use_data_uri),
        ))
        .block(insights_section(panel))
        .block(APPLICATIONS)
        .block(CAVEATS)
        .block(next_steps_section(n_paths, length))
        .block(REFERENCES)
        .block(super::footer(now));
    report.finish()
}

const METHODOLOGY: &str = "\
## Methodology

### Monte Carlo Simulation

Monte Carlo simulation generates multiple realizations (paths) from the fitted ARIMA-GARCH model to:

1. **Assess Uncertainty:** Understand the range of possible future outcomes
2. **Risk Analysis:** Quantify tail risks and extreme scenarios
3. **Scenario Planning:** Generate distributions for decision-making
4. **Model Validation:** Verify model behavior matches data characteristics

### Simulation Process

Each simulated path is generated by:
1. Drawing random innovations from the specified distribution (Normal or Student-t)
2. Applying ARIMA equations to generate returns
3. Applying GARCH equations to generate time-varying volatility
4. Maintaining consistency with the fitted model parameters

";

/// Aggregate + terminal statistics tables; omitted entirely for a panel with
/// no finite returns.
fn statistics_sections(panel: &SimulationPanel) -> Option<String> {
    let all_values = panel.returns();
    if all_values.is_empty() {
        return None;
    }

    let mut out = format!(
        "### Aggregate Statistics (All Paths)\n\n\
         | Statistic | Value |\n\
         |-----------|-------|\n\
         | Total Observations | {} |\n\
         | Mean | {:.6} |\n\
         | Std Dev | {:.6} |\n\
         | Min | {:.6} |\n\
         | Max | {:.6} |\n\
         | Skewness | {:.4} |\n\
         | Kurtosis | {:.4} |\n\
         | 5th Percentile | {:.6} |\n\
         | 25th Percentile | {:.6} |\n\
         | Median | {:.6} |\n\
         | 75th Percentile | {:.6} |\n\
         | 95th Percentile | {:.6} |\n\n",
        all_values.len(),
        stats::mean(&all_values),
        stats::std_pop(&all_values),
        stats::min(&all_values),
        stats::max(&all_values),
        stats::skewness(&all_values),
        stats::excess_kurtosis(&all_values),
        stats::percentile(&all_values, 5.0),
        stats::percentile(&all_values, 25.0),
        stats::median(&all_values),
        stats::percentile(&all_values, 75.0),
        stats::percentile(&all_values, 95.0),
    );

    let terminal = panel.last_return_per_path();
    if !terminal.is_empty() {
        let _ = write!(
            out,
            "### Terminal Value Statistics (End of Horizon)\n\n\
             | Statistic | Value |\n\
             |-----------|-------|\n\
             | Mean Terminal Value | {:.6} |\n\
             | Std Dev Terminal Value | {:.6} |\n\
             | Min Terminal Value | {:.6} |\n\
             | Max Terminal Value | {:.6} |\n\
             | 5th Percentile | {:.6} |\n\
             | 95th Percentile | {:.6} |\n\n",
            stats::mean(&terminal),
            stats::std_pop(&terminal),
            stats::min(&terminal),
            stats::max(&terminal),
            stats::percentile(&terminal, 5.0),
            stats::percentile(&terminal, 95.0),
        );
    }
    Some(out)
}

const PLOT_GUIDE: &str = "\
The plot above shows:
- **Individual Paths:** Sample trajectories from the simulation
- **Mean Path:** Average across all simulated paths
- **Percentile Bands:** Shaded region showing the 5th-95th percentiles
- **Terminal Distribution:** Histogram of final values across all paths

";

/// Threshold-based prose on volatility, tail behavior, and outcome spread.
fn insights_section(panel: &SimulationPanel) -> String {
    let all_values = panel.returns();
    let mut out = String::from("## Key Insights\n\n");
    if all_values.is_empty() {
        return out;
    }

    let vol = stats::std_pop(&all_values);
    let _ = write!(
        out,
        "- **Volatility:** The simulated paths exhibit a standard deviation of {vol:.4}, "
    );
    if vol > 0.1 {
        out.push_str("indicating substantial variability in potential outcomes.\n");
    } else if vol > 0.05 {
        out.push_str("indicating moderate variability in potential outcomes.\n");
    } else {
        out.push_str("indicating relatively low variability in potential outcomes.\n");
    }

    let skew = stats::skewness(&all_values);
    if skew.abs() > 0.5 {
        let direction = if skew > 0.0 { "right" } else { "left" };
        let _ = write!(
            out,
            "- **Asymmetry:** Distribution is {direction}-skewed (skewness = {skew:.2}), suggesting "
        );
        if skew > 0.0 {
            out.push_str("more frequent large positive outcomes.\n");
        } else {
            out.push_str("more frequent large negative outcomes.\n");
        }
    }

    let kurt = stats::excess_kurtosis(&all_values);
    if kurt > 1.0 {
        let _ = writeln!(
            out,
            "- **Tail Risk:** High kurtosis ({kurt:.2}) indicates heavy tails with more extreme values than a normal distribution, suggesting non-negligible tail risk."
        );
    }

    let lo = stats::min(&all_values);
    let hi = stats::max(&all_values);
    let _ = writeln!(
        out,
        "- **Range of Outcomes:** Simulated values span a range of {:.4}, from {lo:.4} to {hi:.4}.",
        hi - lo
    );

    let terminal = panel.last_return_per_path();
    if !terminal.is_empty() {
        let span = stats::percentile(&terminal, 95.0) - stats::percentile(&terminal, 5.0);
        let _ = writeln!(
            out,
            "- **Terminal Uncertainty:** The 90% confidence interval for terminal values spans {span:.4}, illustrating the degree of outcome uncertainty."
        );
    }

    out.push('\n');
    out
}

const APPLICATIONS: &str = "\
## Applications

### Risk Management

Use simulation results to:
- **Value at Risk (VaR):** Calculate percentiles for risk metrics
- **Stress Testing:** Assess model behavior under various scenarios
- **Tail Risk Analysis:** Examine extreme outcomes and their probabilities

### Decision Making

Simulations inform:
- **Capital Allocation:** Size positions based on potential outcomes
- **Hedging Strategies:** Design hedges that account for path dependency
- **Scenario Planning:** Prepare for range of possible futures

### Model Validation

Compare simulated characteristics with historical data:
- Do simulated volatilities match historical patterns?
- Are extreme events appropriately represented?
- Does the model capture key stylized facts of the data?

";

const CAVEATS: &str = "\
## Caveats and Considerations

1. **Model Dependence:**
   - Simulations are only as good as the underlying model
   - Model misspecification propagates to simulated paths
   - Historical parameter estimates may not apply to future

2. **Sampling Variability:**
   - Increasing the number of paths improves precision of percentile estimates
   - Consider running more paths for critical applications

3. **Path Independence:**
   - Each path is an independent realization
   - Real-world dynamics may involve feedback effects not captured by the model

4. **Innovation Distribution:**
   - Standard simulations use Normal innovations
   - Consider Student-t innovations if heavy tails are important
   - Extreme events may still be underestimated

5. **Stationarity Assumption:**
   - Simulations assume stable parameters throughout the horizon
   - Real markets may experience regime shifts or structural changes

";

fn next_steps_section(n_paths: usize, length: usize) -> String {
    format!(
        "## Next Steps\n\n\
         1. **Analyze Specific Scenarios:** Extract and study paths of particular interest\n\n\
         2. **Calculate Risk Metrics:** Use simulated distribution to compute:\n   \
         - Value at Risk (VaR) at various confidence levels\n   \
         - Expected Shortfall (Conditional VaR)\n   \
         - Maximum drawdown distributions\n\n\
         3. **Compare with Historical Data:** Validate that simulated characteristics match observed patterns\n\n\
         4. **Sensitivity Analysis:** Re-simulate with alternative model specifications to assess robustness:\n   \
         ```bash\n   \
         ag-viz fit -d data.csv -a 2,0,2 -g 1,1 -o alt_model.json\n   \
         ag-viz simulate -m alt_model.json -p {n_paths} -n {length} -o alt_simulation.csv --markdown alt_report.md\n   \
         ```\n\n\
         5. **Extend Simulation:** For long-term planning, simulate longer horizons:\n   \
         ```bash\n   \
         ag-viz simulate -m model.json -p 1000 -n 5000 -o long_term_sim.csv --markdown long_term_report.md\n   \
         ```\n\n"
    )
}

const REFERENCES: &str = "\
## References

- Bollerslev, T. (1986). Generalized autoregressive conditional heteroskedasticity. Journal of Econometrics.
- Engle, R. F. (1982). Autoregressive Conditional Heteroscedasticity with Estimates of the Variance of United Kingdom Inflation.
- McNeil, A. J., Frey, R., & Embrechts, P. (2005). Quantitative Risk Management: Concepts, Techniques and Tools.
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArimaOrder, GarchOrder, ModelSpec, SimRow};
    use chrono::NaiveDate;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(18, 0, 0)
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

    fn panel() -> SimulationPanel {
        SimulationPanel {
            rows: vec![
                SimRow { path: 0, observation: 0, return_: 0.01, volatility: 0.05 },
                SimRow { path: 0, observation: 1, return_: 0.02, volatility: 0.06 },
                SimRow { path: 1, observation: 0, return_: -0.01, volatility: 0.04 },
                SimRow { path: 1, observation: 1, return_: 0.03, volatility: 0.05 },
            ],
            n_paths: 2,
            n_obs_per_path: 2,
        }
    }

    #[test]
    fn renders_all_sections() {
        let report = render_simulation_report(
            &model(),
            &panel(),
            Path::new("simulation_paths.png"),
            false,
            fixed_now(),
        );
        assert!(report.contains("# ARIMA-GARCH Simulation Report"));
        assert!(report.contains("**2 paths** of length **2**"));
        assert!(report.contains("### Monte Carlo Simulation"));
        assert!(report.contains("### Aggregate Statistics (All Paths)"));
        assert!(report.contains("### Terminal Value Statistics (End of Horizon)"));
        assert!(report.contains("| Total Observations | 4 |"));
        assert!(report.contains("ag-viz simulate -m alt_model.json -p 2 -n 2"));
    }

    #[test]
    fn rendering_is_idempotent_with_fixed_timestamp() {
        let a = render_simulation_report(&model(), &panel(), Path::new("s.png"), false, fixed_now());
        let b = render_simulation_report(&model(), &panel(), Path::new("s.png"), false, fixed_now());
        assert_eq!(a, b);
    }
}
