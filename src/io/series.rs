//! Time-series CSV loader.
//!
//! The engine consumes and produces single-column observation files with a
//! header row. The first column is the series; any further columns are
//! ignored.

use std::path::Path;

use crate::domain::TimeSeries;
use crate::error::VizError;

/// Load a time-series CSV, taking the first column as the observations.
///
/// A header-only file (zero data rows) is a schema violation, not a parse
/// failure: the syntax is fine but the contract requires a non-empty series.
pub fn load_series_csv(path: &Path) -> Result<TimeSeries, VizError> {
    let mut reader = super::open_csv_reader(path, "Data file")?;
    let headers = super::read_headers(&mut reader, path)?;

    let name = headers
        .get(0)
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .unwrap_or_default();

    let mut values = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header row and CSV lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| {
            VizError::parse(format!("'{}' line {line}", path.display()), e)
        })?;

        let raw = record.get(0).map(str::trim).unwrap_or("");
        let value = raw.parse::<f64>().map_err(|_| {
            VizError::parse(
                format!("'{}' line {line}", path.display()),
                format!("invalid numeric value '{raw}' in column `{name}`"),
            )
        })?;
        values.push(value);
    }

    if values.is_empty() {
        return Err(VizError::schema(format!(
            "CSV file is empty (no data rows): {}",
            path.display()
        )));
    }

    Ok(TimeSeries { name, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_valid_series() {
        let file = write_csv("value\n0.01\n-0.02\n0.03\n");
        let series = load_series_csv(file.path()).unwrap();
        assert_eq!(series.name, "value");
        assert_eq!(series.len(), 3);
        assert_eq!(series.values, vec![0.01, -0.02, 0.03]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_series_csv(Path::new("nonexistent.csv")).unwrap_err();
        assert!(matches!(err, VizError::NotFound { .. }));
    }

    #[test]
    fn header_only_file_is_schema_error() {
        let file = write_csv("value\n");
        let err = load_series_csv(file.path()).unwrap_err();
        assert!(matches!(err, VizError::Schema { .. }));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn non_numeric_value_is_parse_error_with_line() {
        let file = write_csv("value\n0.01\nnot-a-number\n");
        let err = load_series_csv(file.path()).unwrap_err();
        assert!(matches!(err, VizError::Parse { .. }));
        assert!(err.to_string().contains("line 3"));
    }
}
