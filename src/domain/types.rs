//! Shared domain types.
//!
//! Every entity here is an immutable snapshot produced by a loader from one
//! engine artifact. Nothing is mutated after load; each pipeline stage
//! consumes these and produces new output (a chart file or a report file).

use serde::{Deserialize, Serialize};

/// One column of a tabular input, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    /// Header name of the column the values came from.
    pub name: String,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// ARIMA order `(p, d, q)`. Fields the document omits default to 0; the
/// defaults exist for display purposes only, never to satisfy the loader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    #[serde(default)]
    pub p: u32,
    #[serde(default)]
    pub d: u32,
    #[serde(default)]
    pub q: u32,
}

/// GARCH order `(p, q)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarchOrder {
    #[serde(default)]
    pub p: u32,
    #[serde(default)]
    pub q: u32,
}

/// Model specification: the two order sub-records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub arima: Option<ArimaOrder>,
    pub garch: Option<GarchOrder>,
}

/// Estimated ARIMA parameters. Sub-fields may be partially present;
/// consumers must tolerate any subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArimaParams {
    pub intercept: Option<f64>,
    #[serde(default)]
    pub ar_coef: Vec<f64>,
    #[serde(default)]
    pub ma_coef: Vec<f64>,
}

/// Estimated GARCH parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GarchParams {
    pub omega: Option<f64>,
    #[serde(default)]
    pub alpha_coef: Vec<f64>,
    #[serde(default)]
    pub beta_coef: Vec<f64>,
}

impl GarchParams {
    /// Volatility persistence `sum(alpha) + sum(beta)`, when both
    /// coefficient lists are present and non-empty.
    pub fn persistence(&self) -> Option<f64> {
        if self.alpha_coef.is_empty() || self.beta_coef.is_empty() {
            return None;
        }
        Some(self.alpha_coef.iter().sum::<f64>() + self.beta_coef.iter().sum::<f64>())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub arima: Option<ArimaParams>,
    pub garch: Option<GarchParams>,
}

/// A fitted model document as written by `ag fit`.
///
/// The loader guarantees both top-level keys were present in the source
/// document; the fields are still `Option` because a key may be `null` and
/// because the formatter must stay total over arbitrary artifacts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub spec: Option<ModelSpec>,
    pub parameters: Option<ModelParameters>,
}

/// One row of a forecast table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRow {
    pub step: i64,
    pub mean: f64,
    /// Present in practice but not required by the schema.
    pub variance: Option<f64>,
    pub std_dev: f64,
}

/// Ordered multi-step forecast, step strictly increasing from 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastTable {
    pub rows: Vec<ForecastRow>,
}

impl ForecastTable {
    pub fn horizon(&self) -> usize {
        self.rows.len()
    }

    pub fn means(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.mean).collect()
    }

    pub fn std_devs(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.std_dev).collect()
    }
}

/// Ljung-Box test results: parallel arrays over the tested lags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LjungBoxTest {
    #[serde(default)]
    pub lags: Vec<u32>,
    #[serde(default)]
    pub statistics: Vec<f64>,
    #[serde(default)]
    pub pvalues: Vec<f64>,
}

impl LjungBoxTest {
    pub fn is_empty(&self) -> bool {
        self.lags.is_empty() && self.statistics.is_empty() && self.pvalues.is_empty()
    }
}

/// Jarque-Bera normality test result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JarqueBeraTest {
    pub statistic: Option<f64>,
    pub pvalue: Option<f64>,
}

/// Diagnostic test results. No key is required: absence of a test is a
/// valid state meaning "not computed". A missing *file* is a different
/// condition (`NotFound`) and is handled before loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    #[serde(default)]
    pub ljung_box_test: Option<LjungBoxTest>,
    #[serde(default)]
    pub jarque_bera_test: Option<JarqueBeraTest>,
}

/// One row of a long-format simulation panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimRow {
    pub path: u64,
    pub observation: u64,
    pub return_: f64,
    pub volatility: f64,
}

/// Long-format simulation panel plus the derived panel dimensions.
///
/// `n_obs_per_path` is taken from the first (lowest path id) group; the
/// rectangularity of the panel is assumed, not enforced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationPanel {
    pub rows: Vec<SimRow>,
    /// Number of distinct `path` values.
    pub n_paths: usize,
    /// Row count of the first path group.
    pub n_obs_per_path: usize,
}

impl SimulationPanel {
    /// All finite return values across every path.
    pub fn returns(&self) -> Vec<f64> {
        self.rows
            .iter()
            .map(|r| r.return_)
            .filter(|v| v.is_finite())
            .collect()
    }

    /// Distinct path ids in ascending order.
    pub fn path_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.rows.iter().map(|r| r.path).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// `(observation, return)` pairs for one path, in file order.
    pub fn path_returns(&self, path: u64) -> Vec<(u64, f64)> {
        self.rows
            .iter()
            .filter(|r| r.path == path)
            .map(|r| (r.observation, r.return_))
            .collect()
    }

    /// Returns at the terminal observation index (`n_obs_per_path - 1`).
    ///
    /// Used by the terminal-value histogram.
    pub fn terminal_returns(&self) -> Vec<f64> {
        if self.n_obs_per_path == 0 {
            return Vec::new();
        }
        let terminal = (self.n_obs_per_path - 1) as u64;
        self.rows
            .iter()
            .filter(|r| r.observation == terminal)
            .map(|r| r.return_)
            .filter(|v| v.is_finite())
            .collect()
    }

    /// The last finite return of each path group, in ascending path order.
    ///
    /// Used by the terminal-value statistics table; differs from
    /// [`terminal_returns`](Self::terminal_returns) for ragged panels.
    pub fn last_return_per_path(&self) -> Vec<f64> {
        let mut last: std::collections::BTreeMap<u64, f64> = std::collections::BTreeMap::new();
        for r in &self.rows {
            last.insert(r.path, r.return_);
        }
        last.into_values().filter(|v| v.is_finite()).collect()
    }
}
