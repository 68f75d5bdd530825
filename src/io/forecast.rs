//! Forecast CSV loader.

use std::path::Path;

use crate::domain::{ForecastRow, ForecastTable};
use crate::error::VizError;

/// Columns the forecast contract requires. `variance` is read when present
/// but its absence is not a schema violation.
const REQUIRED_COLUMNS: [&str; 3] = ["step", "mean", "std_dev"];

/// Load a forecast table written by `ag forecast`.
pub fn load_forecast_csv(path: &Path) -> Result<ForecastTable, VizError> {
    let mut reader = super::open_csv_reader(path, "Forecast file")?;
    let headers = super::read_headers(&mut reader, path)?;
    let header_map = super::build_header_map(&headers);

    let missing = super::missing_columns(&REQUIRED_COLUMNS, &header_map);
    if !missing.is_empty() {
        return Err(VizError::schema_missing("Forecast CSV", "columns", missing));
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| {
            VizError::parse(format!("'{}' line {line}", path.display()), e)
        })?;

        let step = super::parse_u64_field(&record, &header_map, "step", path, line)? as i64;
        let mean = super::parse_f64_field(&record, &header_map, "mean", path, line)?;
        let std_dev = super::parse_f64_field(&record, &header_map, "std_dev", path, line)?;
        let variance = match super::field(&record, &header_map, "variance") {
            Some(_) => Some(super::parse_f64_field(&record, &header_map, "variance", path, line)?),
            None => None,
        };

        rows.push(ForecastRow {
            step,
            mean,
            variance,
            std_dev,
        });
    }

    Ok(ForecastTable { rows })
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
    fn loads_valid_forecast() {
        let file = write_csv("step,mean,variance,std_dev\n1,0.05,0.01,0.1\n2,0.04,0.012,0.11\n");
        let table = load_forecast_csv(file.path()).unwrap();
        assert_eq!(table.horizon(), 2);
        assert_eq!(table.rows[0].step, 1);
        assert_eq!(table.rows[0].variance, Some(0.01));
        assert_eq!(table.rows[1].std_dev, 0.11);
    }

    #[test]
    fn variance_is_optional() {
        let file = write_csv("step,mean,std_dev\n1,0.05,0.1\n");
        let table = load_forecast_csv(file.path()).unwrap();
        assert_eq!(table.rows[0].variance, None);
    }

    #[test]
    fn missing_columns_are_listed_exactly() {
        let file = write_csv("step,mean\n1,0.05\n");
        let err = load_forecast_csv(file.path()).unwrap_err();
        assert!(err.to_string().contains("missing required columns"));
        assert_eq!(err.missing_fields(), ["std_dev"]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_forecast_csv(Path::new("nonexistent.csv")).unwrap_err();
        assert!(matches!(err, VizError::NotFound { .. }));
    }
}
