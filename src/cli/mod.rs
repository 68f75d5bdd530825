//! Command-line parsing for the ARIMA-GARCH visualization tool.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the loader/plot/report code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "ag-viz",
    version,
    about = "Visualization tools for ARIMA-GARCH models"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands, one per engine operation.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit an ARIMA-GARCH model and generate diagnostic plots.
    Fit(FitArgs),
    /// Generate forecasts and plot with confidence intervals.
    Forecast(ForecastArgs),
    /// Generate comprehensive residual diagnostic plots.
    Diagnostics(DiagnosticsArgs),
    /// Simulate paths and visualize distributions.
    Simulate(SimulateArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Input data file in CSV format.
    #[arg(short = 'd', long = "data")]
    pub data: PathBuf,

    /// ARIMA order as p,d,q (e.g. 1,0,1).
    #[arg(short = 'a', long)]
    pub arima: String,

    /// GARCH order as p,q (e.g. 1,1).
    #[arg(short = 'g', long)]
    pub garch: String,

    /// Output model file in JSON format.
    #[arg(short = 'o', long, default_value = "model.json")]
    pub output: PathBuf,

    /// Directory to save diagnostic plots.
    #[arg(long = "plot-dir", default_value = "./output")]
    pub plot_dir: PathBuf,

    /// Write a Markdown fit report to this path.
    #[arg(long)]
    pub markdown: Option<PathBuf>,

    /// Embed plot images into the report as data URIs.
    #[arg(long)]
    pub embed_images: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct ForecastArgs {
    /// Input model file in JSON format.
    #[arg(short = 'm', long = "model")]
    pub model: PathBuf,

    /// Forecast horizon (number of steps ahead).
    #[arg(short = 'n', long, default_value_t = 10)]
    pub horizon: usize,

    /// Output forecast file in CSV format.
    #[arg(short = 'o', long, default_value = "forecast.csv")]
    pub output: PathBuf,

    /// Path to save the forecast plot.
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Confidence levels for the plotted intervals.
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = crate::plot::forecast::DEFAULT_CONFIDENCE_LEVELS
    )]
    pub confidence: Vec<f64>,

    /// Write a Markdown forecast report to this path.
    #[arg(long)]
    pub markdown: Option<PathBuf>,

    /// Embed plot images into the report as data URIs.
    #[arg(long)]
    pub embed_images: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct DiagnosticsArgs {
    /// Input model file in JSON format.
    #[arg(short = 'm', long = "model")]
    pub model: PathBuf,

    /// Input data file in CSV format.
    #[arg(short = 'd', long = "data")]
    pub data: PathBuf,

    /// Output directory for diagnostic plots and JSON.
    #[arg(short = 'o', long = "output", default_value = "./diagnostics")]
    pub output_dir: PathBuf,

    /// Write a Markdown diagnostics report to this path.
    #[arg(long)]
    pub markdown: Option<PathBuf>,

    /// Embed plot images into the report as data URIs.
    #[arg(long)]
    pub embed_images: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Input model file in JSON format.
    #[arg(short = 'm', long = "model")]
    pub model: PathBuf,

    /// Number of simulation paths to generate.
    #[arg(short = 'p', long, default_value_t = 100)]
    pub paths: usize,

    /// Number of observations per path.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub length: usize,

    /// Random seed for reproducibility.
    #[arg(short = 's', long, default_value_t = 42)]
    pub seed: u64,

    /// Output simulation file in CSV format.
    #[arg(short = 'o', long, default_value = "simulation.csv")]
    pub output: PathBuf,

    /// Path to save the simulation plot.
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Number of paths to plot.
    #[arg(long = "n-plot", default_value_t = 10)]
    pub n_plot: usize,

    /// Ask the engine to compute and display summary statistics.
    #[arg(long)]
    pub stats: bool,

    /// Write a Markdown simulation report to this path.
    #[arg(long)]
    pub markdown: Option<PathBuf>,

    /// Embed plot images into the report as data URIs.
    #[arg(long)]
    pub embed_images: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fit_command() {
        let cli = Cli::try_parse_from([
            "ag-viz", "fit", "-d", "data.csv", "-a", "1,0,1", "-g", "1,1", "-o", "model.json",
        ])
        .unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit subcommand");
        };
        assert_eq!(args.arima, "1,0,1");
        assert_eq!(args.output, PathBuf::from("model.json"));
        assert_eq!(args.plot_dir, PathBuf::from("./output"));
        assert!(args.markdown.is_none());
    }

    #[test]
    fn forecast_defaults() {
        let cli = Cli::try_parse_from(["ag-viz", "forecast", "-m", "model.json"]).unwrap();
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast subcommand");
        };
        assert_eq!(args.horizon, 10);
        assert_eq!(args.confidence, vec![0.68, 0.95]);
        assert_eq!(args.output, PathBuf::from("forecast.csv"));
    }

    #[test]
    fn simulate_parses_flags() {
        let cli = Cli::try_parse_from([
            "ag-viz", "simulate", "-m", "model.json", "-p", "500", "-n", "250", "--n-plot", "20",
            "--stats",
        ])
        .unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate subcommand");
        };
        assert_eq!(args.paths, 500);
        assert_eq!(args.length, 250);
        assert_eq!(args.n_plot, 20);
        assert!(args.stats);
    }
}
