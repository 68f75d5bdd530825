//! Schema loaders for the engine's file artifacts.
//!
//! Contract per loader (strict; no local recovery or retry):
//!
//! - missing path -> [`VizError::NotFound`]
//! - required columns/keys absent -> [`VizError::Schema`] with the
//!   missing-field list
//! - undecodable CSV/JSON syntax -> [`VizError::Parse`] with file context
//!
//! On success each loader returns an immutable entity from [`crate::domain`].

pub mod diagnostics;
pub mod forecast;
pub mod model;
pub mod series;
pub mod simulation;

pub use diagnostics::load_diagnostics_json;
pub use forecast::load_forecast_csv;
pub use model::load_model_json;
pub use series::load_series_csv;
pub use simulation::load_simulation_csv;

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::error::VizError;

/// Open a CSV reader, distinguishing a missing file from an unreadable one.
pub(crate) fn open_csv_reader(
    path: &Path,
    label: &'static str,
) -> Result<csv::Reader<File>, VizError> {
    if !path.exists() {
        return Err(VizError::not_found(label, path));
    }
    let file = File::open(path).map_err(|e| {
        VizError::parse(format!("Failed to open CSV '{}'", path.display()), e)
    })?;
    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

pub(crate) fn read_headers(
    reader: &mut csv::Reader<File>,
    path: &Path,
) -> Result<StringRecord, VizError> {
    Ok(reader
        .headers()
        .map_err(|e| VizError::parse(format!("Failed to read CSV headers from '{}'", path.display()), e))?
        .clone())
}

pub(crate) fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

pub(crate) fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header. If we don't strip it, schema validation will
    // incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// Columns from `required` that are absent from the header map.
pub(crate) fn missing_columns(
    required: &[&str],
    header_map: &HashMap<String, usize>,
) -> Vec<String> {
    required
        .iter()
        .filter(|name| !header_map.contains_key(**name))
        .map(|name| name.to_string())
        .collect()
}

pub(crate) fn field<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a named field as `f64`, with 1-based data line context.
pub(crate) fn parse_f64_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
    path: &Path,
    line: usize,
) -> Result<f64, VizError> {
    let raw = field(record, header_map, name).ok_or_else(|| {
        VizError::parse(
            format!("'{}' line {line}", path.display()),
            format!("missing value for column `{name}`"),
        )
    })?;
    raw.parse::<f64>().map_err(|_| {
        VizError::parse(
            format!("'{}' line {line}", path.display()),
            format!("invalid numeric value '{raw}' in column `{name}`"),
        )
    })
}

/// Parse a named field as an unsigned integer, with line context.
pub(crate) fn parse_u64_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
    path: &Path,
    line: usize,
) -> Result<u64, VizError> {
    let raw = field(record, header_map, name).ok_or_else(|| {
        VizError::parse(
            format!("'{}' line {line}", path.display()),
            format!("missing value for column `{name}`"),
        )
    })?;
    raw.parse::<u64>().map_err(|_| {
        VizError::parse(
            format!("'{}' line {line}", path.display()),
            format!("invalid integer value '{raw}' in column `{name}`"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_normalization_strips_bom_and_case() {
        assert_eq!(normalize_header_name("\u{feff}Step"), "step");
        assert_eq!(normalize_header_name("  MEAN "), "mean");
    }

    #[test]
    fn missing_columns_preserves_required_order() {
        let headers = StringRecord::from(vec!["mean", "variance"]);
        let map = build_header_map(&headers);
        let missing = missing_columns(&["step", "mean", "std_dev"], &map);
        assert_eq!(missing, ["step", "std_dev"]);
    }
}
