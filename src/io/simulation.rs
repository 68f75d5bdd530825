//! Simulation panel CSV loader.

use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::{SimRow, SimulationPanel};
use crate::error::VizError;

const REQUIRED_COLUMNS: [&str; 4] = ["path", "observation", "return", "volatility"];

/// Load a long-format simulation panel written by `ag simulate`.
///
/// Besides the rows, this derives the distinct-path count and the
/// observations-per-path scalar. The latter is taken from the first (lowest
/// path id) group only; equal counts across paths are assumed, not checked.
pub fn load_simulation_csv(path: &Path) -> Result<SimulationPanel, VizError> {
    let mut reader = super::open_csv_reader(path, "Simulation file")?;
    let headers = super::read_headers(&mut reader, path)?;
    let header_map = super::build_header_map(&headers);

    let missing = super::missing_columns(&REQUIRED_COLUMNS, &header_map);
    if !missing.is_empty() {
        return Err(VizError::schema_missing("Simulation CSV", "columns", missing));
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| {
            VizError::parse(format!("'{}' line {line}", path.display()), e)
        })?;

        rows.push(SimRow {
            path: super::parse_u64_field(&record, &header_map, "path", path, line)?,
            observation: super::parse_u64_field(&record, &header_map, "observation", path, line)?,
            return_: super::parse_f64_field(&record, &header_map, "return", path, line)?,
            volatility: super::parse_f64_field(&record, &header_map, "volatility", path, line)?,
        });
    }

    if rows.is_empty() {
        return Err(VizError::schema(format!(
            "Simulation CSV has no data rows: {}",
            path.display()
        )));
    }

    let mut group_sizes: BTreeMap<u64, usize> = BTreeMap::new();
    for row in &rows {
        *group_sizes.entry(row.path).or_insert(0) += 1;
    }
    let n_paths = group_sizes.len();
    let n_obs_per_path = group_sizes.values().next().copied().unwrap_or(0);

    Ok(SimulationPanel {
        rows,
        n_paths,
        n_obs_per_path,
    })
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
    fn loads_valid_panel() {
        let file = write_csv(
            "path,observation,return,volatility\n\
             0,0,0.01,0.05\n\
             0,1,0.02,0.06\n\
             1,0,-0.01,0.04\n\
             1,1,0.03,0.05\n",
        );
        let panel = load_simulation_csv(file.path()).unwrap();
        assert_eq!(panel.n_paths, 2);
        assert_eq!(panel.n_obs_per_path, 2);
        assert_eq!(panel.rows.len(), 4);
    }

    #[test]
    fn missing_columns_are_listed_exactly() {
        let file = write_csv("path,observation\n0,0\n");
        let err = load_simulation_csv(file.path()).unwrap_err();
        assert!(err.to_string().contains("missing required columns"));
        assert_eq!(err.missing_fields(), ["return", "volatility"]);
    }

    #[test]
    fn observations_per_path_comes_from_first_group() {
        // Ragged panel: the first (lowest id) group has 2 rows, the second 3.
        let file = write_csv(
            "path,observation,return,volatility\n\
             0,0,0.01,0.05\n\
             0,1,0.02,0.06\n\
             1,0,-0.01,0.04\n\
             1,1,0.03,0.05\n\
             1,2,0.00,0.05\n",
        );
        let panel = load_simulation_csv(file.path()).unwrap();
        assert_eq!(panel.n_paths, 2);
        assert_eq!(panel.n_obs_per_path, 2);
    }

    #[test]
    fn header_only_panel_is_schema_error() {
        let file = write_csv("path,observation,return,volatility\n");
        let err = load_simulation_csv(file.path()).unwrap_err();
        assert!(matches!(err, VizError::Schema { .. }));
    }
}
