//! Chart generators.
//!
//! Each generator is a pure transformation from loaded entities plus an
//! output location to one written PNG:
//!
//! - the output path is deterministic (fixed filename per chart when only a
//!   directory is given)
//! - missing directories are created, existing files overwritten
//! - rendering failures surface as [`VizError::Render`]

pub mod fit;
pub mod forecast;
pub mod residuals;
pub mod simulation;

pub use fit::plot_fit_diagnostics;
pub use forecast::plot_forecast;
pub use residuals::plot_residual_diagnostics;
pub use simulation::plot_simulation_paths;

use std::path::Path;

use crate::error::VizError;

pub(crate) fn ensure_dir(dir: &Path) -> Result<(), VizError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        VizError::io(format!("Failed to create directory '{}': {e}", dir.display()))
    })
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), VizError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    Ok(())
}

pub(crate) fn render_error(path: &Path, err: impl std::fmt::Display) -> VizError {
    VizError::render(format!("Failed to render '{}': {err}", path.display()))
}

/// Axis bounds with 5% padding. Degenerate or non-finite input falls back to
/// a unit span so chart construction never sees an empty range.
pub(crate) fn padded_range(min: f64, max: f64) -> (f64, f64) {
    if !(min.is_finite() && max.is_finite()) || max < min {
        return (0.0, 1.0);
    }
    let span = max - min;
    let pad = if span < 1e-12 { 0.5 } else { span * 0.05 };
    (min - pad, max + pad)
}

/// Equal-width histogram bins normalized to a probability density.
///
/// Returns `(bin_start, bin_end, density)` triples; empty input yields no
/// bins. A degenerate value range is widened to a unit span.
pub(crate) fn histogram_bins(values: &[f64], n_bins: usize) -> Vec<(f64, f64, f64)> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || n_bins == 0 {
        return Vec::new();
    }

    let mut lo = crate::stats::min(&finite);
    let mut hi = crate::stats::max(&finite);
    if (hi - lo).abs() < 1e-12 {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / n_bins as f64;

    let mut counts = vec![0usize; n_bins];
    for v in &finite {
        let idx = (((v - lo) / width) as usize).min(n_bins - 1);
        counts[idx] += 1;
    }

    let n = finite.len() as f64;
    counts
        .iter()
        .enumerate()
        .map(|(i, count)| {
            let start = lo + i as f64 * width;
            (start, start + width, *count as f64 / (n * width))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_range_handles_degenerate_input() {
        let (lo, hi) = padded_range(1.0, 1.0);
        assert!((lo - 0.5).abs() < 1e-12);
        assert!((hi - 1.5).abs() < 1e-12);

        let (lo, hi) = padded_range(f64::NAN, 1.0);
        assert_eq!((lo, hi), (0.0, 1.0));
    }

    #[test]
    fn histogram_density_integrates_to_one() {
        let values: Vec<f64> = (0..100).map(|i| i as f64 / 10.0).collect();
        let bins = histogram_bins(&values, 30);
        assert_eq!(bins.len(), 30);
        let integral: f64 = bins.iter().map(|(lo, hi, d)| (hi - lo) * d).sum();
        assert!((integral - 1.0).abs() < 1e-9);
    }

    #[test]
    fn histogram_of_empty_input_is_empty() {
        assert!(histogram_bins(&[], 30).is_empty());
    }
}
