//! Error taxonomy for the visualization pipeline.
//!
//! Loader failures are strict and always propagate: missing files, missing
//! schema structure, and undecodable syntax are data-integrity problems, not
//! transient conditions. Formatting and optional report content never reach
//! this type; those degrade to sentinel or reduced output instead.
//!
//! Each variant maps to a process exit code consumed by `main.rs`:
//!
//! - 2: input problems (missing file, schema violation, undecodable syntax)
//! - 3: output I/O failures
//! - 4: chart rendering failures
//! - 5: engine invocation failures

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VizError {
    /// A referenced input file does not exist.
    #[error("{label} not found: {}", path.display())]
    NotFound { label: &'static str, path: PathBuf },

    /// Required structure (columns for tabular, keys for structured
    /// documents) is absent. `missing` lists the absent fields verbatim.
    #[error("{message}")]
    Schema {
        message: String,
        missing: Vec<String>,
    },

    /// The underlying CSV/JSON syntax could not be decoded.
    #[error("{context}: {detail}")]
    Parse { context: String, detail: String },

    /// The external engine could not be located, launched, or exited non-zero.
    #[error("{0}")]
    Engine(String),

    /// Chart rendering failed.
    #[error("{0}")]
    Render(String),

    /// Output file or directory I/O failed.
    #[error("{0}")]
    Io(String),
}

impl VizError {
    pub fn not_found(label: &'static str, path: &Path) -> Self {
        VizError::NotFound {
            label,
            path: path.to_path_buf(),
        }
    }

    /// A schema violation without a specific missing-field list.
    pub fn schema(message: impl Into<String>) -> Self {
        VizError::Schema {
            message: message.into(),
            missing: Vec::new(),
        }
    }

    /// A schema violation caused by absent columns/keys.
    ///
    /// The message surfaces the missing-field list verbatim, e.g.
    /// `Forecast CSV missing required columns: step, std_dev`.
    pub fn schema_missing(context: &str, unit: &str, missing: Vec<String>) -> Self {
        VizError::Schema {
            message: format!("{context} missing required {unit}: {}", missing.join(", ")),
            missing,
        }
    }

    pub fn parse(context: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        VizError::Parse {
            context: context.into(),
            detail: detail.to_string(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        VizError::Render(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        VizError::Io(message.into())
    }

    /// The fields a `Schema` error reported as missing (empty otherwise).
    pub fn missing_fields(&self) -> &[String] {
        match self {
            VizError::Schema { missing, .. } => missing,
            _ => &[],
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            VizError::NotFound { .. } | VizError::Schema { .. } | VizError::Parse { .. } => 2,
            VizError::Io(_) => 3,
            VizError::Render(_) => 4,
            VizError::Engine(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_missing_lists_fields_verbatim() {
        let err = VizError::schema_missing(
            "Forecast CSV",
            "columns",
            vec!["step".to_string(), "std_dev".to_string()],
        );
        assert_eq!(
            err.to_string(),
            "Forecast CSV missing required columns: step, std_dev"
        );
        assert_eq!(err.missing_fields(), ["step", "std_dev"]);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn not_found_mentions_path() {
        let err = VizError::not_found("Model file", Path::new("missing.json"));
        assert_eq!(err.to_string(), "Model file not found: missing.json");
    }
}
