//! Markdown report generation.
//!
//! Each report is a fixed template instantiated with a timestamp, the
//! formatted model spec, summary statistics, conditional sections for
//! optional inputs, an image reference, interpretive bullets, and a closing
//! bibliography.
//!
//! Renderers (`render_*_report`) are pure: the timestamp is a parameter, so
//! identical inputs produce byte-identical documents. The `generate_*`
//! wrappers stamp wall-clock time, create parent directories, and overwrite
//! the output file.
//!
//! Reports are best-effort above the loader boundary: absent diagnostics,
//! absent parameter sub-fields, or an unreadable image degrade to reduced or
//! omitted content, never to an error.

pub mod diagnostics;
pub mod fit;
pub mod forecast;
pub mod simulation;

pub use diagnostics::{generate_diagnostics_report, render_diagnostics_report};
pub use fit::{generate_fit_report, render_fit_report};
pub use forecast::{generate_forecast_report, render_forecast_report};
pub use simulation::{generate_simulation_report, render_simulation_report};

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::NaiveDateTime;

use crate::error::VizError;

/// Sequential Markdown assembly: fixed blocks plus conditional blocks.
///
/// Keeping each section a separate block (rather than one format string)
/// keeps per-section optionality tractable and testable in isolation.
pub(crate) struct ReportBuilder {
    out: String,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self { out: String::new() }
    }

    pub fn block(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.out.push_str(text.as_ref());
        self
    }

    pub fn maybe(&mut self, block: Option<String>) -> &mut Self {
        if let Some(text) = block {
            self.out.push_str(&text);
        }
        self
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Markdown image reference: a base64 data URI when embedding is requested
/// and the file is readable, a relative filename link otherwise. Best-effort
/// by contract; never fails.
pub(crate) fn image_markdown(image_path: &Path, alt_text: &str, use_data_uri: bool) -> String {
    if use_data_uri && image_path.exists() {
        if let Ok(bytes) = std::fs::read(image_path) {
            let ext = image_path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("png")
                .to_ascii_lowercase();
            let mime = if ext == "png" {
                "image/png".to_string()
            } else {
                format!("image/{ext}")
            };
            return format!("![{alt_text}](data:{mime};base64,{})", BASE64.encode(&bytes));
        }
    }
    let name = image_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("plot.png");
    format!("![{alt_text}]({name})")
}

pub(crate) fn write_report(path: &Path, contents: &str) -> Result<PathBuf, VizError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                VizError::io(format!(
                    "Failed to create directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }
    }
    std::fs::write(path, contents)
        .map_err(|e| VizError::io(format!("Failed to write report '{}': {e}", path.display())))?;
    Ok(path.to_path_buf())
}

pub(crate) fn timestamp_full(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub(crate) fn timestamp_date(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%d").to_string()
}

pub(crate) fn footer(now: NaiveDateTime) -> String {
    format!(
        "\n---\n\n*Report generated by ag-viz on {}*\n",
        now.format("%Y-%m-%d at %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn builder_appends_fixed_and_conditional_blocks() {
        let mut b = ReportBuilder::new();
        b.block("# Title\n")
            .maybe(Some("present\n".to_string()))
            .maybe(None)
            .block("end\n");
        assert_eq!(b.finish(), "# Title\npresent\nend\n");
    }

    #[test]
    fn image_markdown_embeds_existing_file_as_data_uri() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"not-really-a-png").unwrap();
        let md = image_markdown(file.path(), "Plot", true);
        assert!(md.starts_with("![Plot](data:image/png;base64,"));
    }

    #[test]
    fn image_markdown_falls_back_to_relative_link() {
        let md = image_markdown(Path::new("out/forecast.png"), "Plot", false);
        assert_eq!(md, "![Plot](forecast.png)");

        // Embedding requested but the file does not exist: degrade, don't fail.
        let md = image_markdown(Path::new("missing/never.png"), "Plot", true);
        assert_eq!(md, "![Plot](never.png)");
    }
}
