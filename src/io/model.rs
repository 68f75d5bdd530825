//! Model JSON loader.

use std::fs;
use std::path::Path;

use crate::domain::ModelArtifact;
use crate::error::VizError;

const REQUIRED_KEYS: [&str; 2] = ["spec", "parameters"];

/// Load a fitted model document written by `ag fit`.
///
/// Only the two top-level keys are schema-enforced; everything below them is
/// optional and consumers must tolerate partially present sub-fields.
pub fn load_model_json(path: &Path) -> Result<ModelArtifact, VizError> {
    if !path.exists() {
        return Err(VizError::not_found("Model file", path));
    }

    let text = fs::read_to_string(path).map_err(|e| {
        VizError::parse(format!("Error reading model file '{}'", path.display()), e)
    })?;
    let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
        VizError::parse(format!("Invalid JSON in model file '{}'", path.display()), e)
    })?;

    let missing: Vec<String> = REQUIRED_KEYS
        .iter()
        .filter(|key| !value.as_object().is_some_and(|o| o.contains_key(**key)))
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(VizError::schema_missing("Model JSON", "keys", missing));
    }

    serde_json::from_value(value).map_err(|e| {
        VizError::parse(format!("Invalid model document in '{}'", path.display()), e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_json(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_valid_model() {
        let file = write_json(
            r#"{
                "spec": {"arima": {"p": 1, "d": 0, "q": 1}, "garch": {"p": 1, "q": 1}},
                "parameters": {
                    "arima": {"intercept": 0.05, "ar_coef": [0.6], "ma_coef": [0.3]},
                    "garch": {"omega": 0.01, "alpha_coef": [0.1], "beta_coef": [0.85]}
                }
            }"#,
        );
        let model = load_model_json(file.path()).unwrap();
        let spec = model.spec.as_ref().unwrap();
        assert_eq!(spec.arima.unwrap().p, 1);
        let garch = model.parameters.unwrap().garch.unwrap();
        assert_eq!(garch.omega, Some(0.01));
        assert_eq!(garch.beta_coef, vec![0.85]);
    }

    #[test]
    fn partial_sub_fields_load_fine() {
        let file = write_json(r#"{"spec": {"arima": {"p": 1}}, "parameters": {}}"#);
        let model = load_model_json(file.path()).unwrap();
        let arima = model.spec.unwrap().arima.unwrap();
        assert_eq!((arima.p, arima.d, arima.q), (1, 0, 0));
    }

    #[test]
    fn missing_keys_are_schema_errors() {
        let file = write_json(r#"{"invalid": "structure"}"#);
        let err = load_model_json(file.path()).unwrap_err();
        assert!(err.to_string().contains("missing"));
        assert_eq!(err.missing_fields(), ["spec", "parameters"]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_model_json(Path::new("nonexistent.json")).unwrap_err();
        assert!(matches!(err, VizError::NotFound { .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let file = write_json("{not json");
        let err = load_model_json(file.path()).unwrap_err();
        assert!(matches!(err, VizError::Parse { .. }));
    }
}
