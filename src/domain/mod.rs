//! Domain entities and display formatting.

mod types;

pub use types::{
    ArimaOrder, ArimaParams, DiagnosticsReport, ForecastRow, ForecastTable, GarchOrder,
    GarchParams, JarqueBeraTest, LjungBoxTest, ModelArtifact, ModelParameters, ModelSpec, SimRow,
    SimulationPanel, TimeSeries,
};

/// Sentinel returned when a model artifact carries no usable specification.
pub const UNKNOWN_MODEL: &str = "Unknown Model";

/// Compact human-readable identifier for a model artifact.
///
/// Total function: any artifact without a `spec` record formats as
/// [`UNKNOWN_MODEL`], and order fields the document omitted render as 0.
/// Formatting must never abort a report, so no error leaves this function.
pub fn format_model_spec(model: &ModelArtifact) -> String {
    let Some(spec) = &model.spec else {
        return UNKNOWN_MODEL.to_string();
    };
    let arima = spec.arima.unwrap_or_default();
    let garch = spec.garch.unwrap_or_default();
    format!(
        "ARIMA({},{},{})-GARCH({},{})",
        arima.p, arima.d, arima.q, garch.p, garch.q
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_full_spec() {
        let model = ModelArtifact {
            spec: Some(ModelSpec {
                arima: Some(ArimaOrder { p: 1, d: 0, q: 1 }),
                garch: Some(GarchOrder { p: 1, q: 1 }),
            }),
            parameters: None,
        };
        assert_eq!(format_model_spec(&model), "ARIMA(1,0,1)-GARCH(1,1)");
    }

    #[test]
    fn missing_spec_is_unknown_model() {
        let model = ModelArtifact::default();
        assert_eq!(format_model_spec(&model), "Unknown Model");
    }

    #[test]
    fn absent_sub_records_default_to_zero() {
        let model = ModelArtifact {
            spec: Some(ModelSpec {
                arima: Some(ArimaOrder { p: 2, d: 1, q: 2 }),
                garch: None,
            }),
            parameters: None,
        };
        assert_eq!(format_model_spec(&model), "ARIMA(2,1,2)-GARCH(0,0)");
    }

    #[test]
    fn persistence_requires_both_coefficient_lists() {
        let garch = GarchParams {
            omega: Some(0.01),
            alpha_coef: vec![0.1],
            beta_coef: vec![0.85],
        };
        let p = garch.persistence().unwrap();
        assert!((p - 0.95).abs() < 1e-12);

        let partial = GarchParams {
            omega: Some(0.01),
            alpha_coef: vec![0.1],
            beta_coef: Vec::new(),
        };
        assert!(partial.persistence().is_none());
    }

    #[test]
    fn terminal_returns_use_terminal_observation_index() {
        let panel = SimulationPanel {
            rows: vec![
                SimRow { path: 0, observation: 0, return_: 0.01, volatility: 0.05 },
                SimRow { path: 0, observation: 1, return_: 0.02, volatility: 0.06 },
                SimRow { path: 1, observation: 0, return_: -0.01, volatility: 0.04 },
                SimRow { path: 1, observation: 1, return_: 0.03, volatility: 0.05 },
            ],
            n_paths: 2,
            n_obs_per_path: 2,
        };
        assert_eq!(panel.terminal_returns(), vec![0.02, 0.03]);
        assert_eq!(panel.last_return_per_path(), vec![0.02, 0.03]);
        assert_eq!(panel.path_ids(), vec![0, 1]);
    }
}
