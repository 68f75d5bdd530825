//! Diagnostics JSON loader.

use std::fs;
use std::path::Path;

use crate::domain::DiagnosticsReport;
use crate::error::VizError;

/// Load diagnostic test results written by `ag diagnostics`.
///
/// No key is required: an empty document (`{}`) loads successfully with both
/// tests absent. A missing file is a distinct condition and stays
/// [`VizError::NotFound`]; callers that treat absence as "diagnostics not
/// computed" must check existence before calling.
pub fn load_diagnostics_json(path: &Path) -> Result<DiagnosticsReport, VizError> {
    if !path.exists() {
        return Err(VizError::not_found("Diagnostics file", path));
    }

    let text = fs::read_to_string(path).map_err(|e| {
        VizError::parse(format!("Error reading diagnostics file '{}'", path.display()), e)
    })?;
    serde_json::from_str(&text).map_err(|e| {
        VizError::parse(
            format!("Invalid JSON in diagnostics file '{}'", path.display()),
            e,
        )
    })
}
