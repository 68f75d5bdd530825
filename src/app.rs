//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - invokes the external `ag` engine to produce raw artifacts
//! - loads and validates the artifacts
//! - renders charts and optional Markdown reports
//!
//! Every stage is one-shot and stateless; nothing is held across
//! invocations.

use std::ffi::{OsStr, OsString};
use std::process::Output;

use clap::Parser;

use crate::cli::{Cli, Command, DiagnosticsArgs, FitArgs, ForecastArgs, SimulateArgs};
use crate::error::VizError;
use crate::{engine, io, plot, report};

/// Entry point for the `ag-viz` binary.
pub fn run() -> Result<(), VizError> {
    let cli = Cli::parse();

    if engine::find_engine().is_none() {
        eprintln!(
            "Warning: ag executable not found. Build the engine or set the {} environment variable.",
            engine::ENGINE_ENV_VAR
        );
    }

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Forecast(args) => handle_forecast(args),
        Command::Diagnostics(args) => handle_diagnostics(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), VizError> {
    println!("Fitting model: ARIMA({})-GARCH({})...", args.arima, args.garch);

    let output = engine::run_engine(engine_args(&[
        OsStr::new("fit"),
        OsStr::new("-d"),
        args.data.as_os_str(),
        OsStr::new("-a"),
        OsStr::new(&args.arima),
        OsStr::new("-g"),
        OsStr::new(&args.garch),
        OsStr::new("-o"),
        args.output.as_os_str(),
    ]))?;
    print_engine_stdout(&output);

    println!("\nGenerating diagnostic plots in {}...", args.plot_dir.display());
    let series = io::load_series_csv(&args.data)?;
    let model = io::load_model_json(&args.output)?;

    let plot_path = plot::plot_fit_diagnostics(&series, &model, &args.plot_dir)?;
    println!("\u{2713} Saved fit diagnostics to: {}", plot_path.display());

    if let Some(report_path) = &args.markdown {
        let written = report::generate_fit_report(
            &series,
            &model,
            &plot_path,
            report_path,
            args.embed_images,
        )?;
        println!("\u{2713} Saved fit report to: {}", written.display());
    }

    println!("\n\u{2713} Model saved to: {}", args.output.display());
    Ok(())
}

fn handle_forecast(args: ForecastArgs) -> Result<(), VizError> {
    println!("Generating {}-step forecast...", args.horizon);

    let horizon = args.horizon.to_string();
    let output = engine::run_engine(engine_args(&[
        OsStr::new("forecast"),
        OsStr::new("-m"),
        args.model.as_os_str(),
        OsStr::new("-n"),
        OsStr::new(&horizon),
        OsStr::new("-o"),
        args.output.as_os_str(),
    ]))?;
    print_engine_stdout(&output);

    println!("\nGenerating forecast plot...");
    let model = io::load_model_json(&args.model)?;
    let forecast = io::load_forecast_csv(&args.output)?;

    let plot_path =
        plot::plot_forecast(&model, &forecast, &args.confidence, args.plot.as_deref())?;
    println!("\u{2713} Saved forecast plot to: {}", plot_path.display());

    if let Some(report_path) = &args.markdown {
        let written = report::generate_forecast_report(
            &model,
            &forecast,
            &plot_path,
            report_path,
            args.embed_images,
        )?;
        println!("\u{2713} Saved forecast report to: {}", written.display());
    }

    println!("\u{2713} Forecast saved to: {}", args.output.display());
    Ok(())
}

fn handle_diagnostics(args: DiagnosticsArgs) -> Result<(), VizError> {
    println!("Running diagnostics...");

    std::fs::create_dir_all(&args.output_dir).map_err(|e| {
        VizError::io(format!(
            "Failed to create directory '{}': {e}",
            args.output_dir.display()
        ))
    })?;
    let diag_json = args.output_dir.join("diagnostics.json");

    let output = engine::run_engine(engine_args(&[
        OsStr::new("diagnostics"),
        OsStr::new("-m"),
        args.model.as_os_str(),
        OsStr::new("-d"),
        args.data.as_os_str(),
        OsStr::new("-o"),
        diag_json.as_os_str(),
    ]))?;
    print_engine_stdout(&output);

    println!("\nGenerating diagnostic plots in {}...", args.output_dir.display());
    let model = io::load_model_json(&args.model)?;
    let series = io::load_series_csv(&args.data)?;

    let plot_path = plot::plot_residual_diagnostics(&model, &series, &args.output_dir)?;
    println!("\u{2713} Saved residual diagnostics to: {}", plot_path.display());

    // A missing diagnostics file means "not computed" and is not an error;
    // the report renders a reduced section instead.
    let diagnostics = if diag_json.exists() {
        Some(io::load_diagnostics_json(&diag_json)?)
    } else {
        None
    };

    if let Some(report_path) = &args.markdown {
        let written = report::generate_diagnostics_report(
            &model,
            &series,
            diagnostics.as_ref(),
            &plot_path,
            report_path,
            args.embed_images,
        )?;
        println!("\u{2713} Saved diagnostics report to: {}", written.display());
    }

    println!("\u{2713} Diagnostics saved to: {}", diag_json.display());
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), VizError> {
    println!(
        "Simulating {} paths with {} observations each...",
        args.paths, args.length
    );

    let paths = args.paths.to_string();
    let length = args.length.to_string();
    let seed = args.seed.to_string();
    let mut engine_argv = engine_args(&[
        OsStr::new("simulate"),
        OsStr::new("-m"),
        args.model.as_os_str(),
        OsStr::new("-p"),
        OsStr::new(&paths),
        OsStr::new("-n"),
        OsStr::new(&length),
        OsStr::new("-s"),
        OsStr::new(&seed),
        OsStr::new("-o"),
        args.output.as_os_str(),
    ]);
    if args.stats {
        engine_argv.push(OsString::from("--stats"));
    }

    let output = engine::run_engine(engine_argv)?;
    print_engine_stdout(&output);

    println!("\nGenerating simulation plot...");
    let model = io::load_model_json(&args.model)?;
    let panel = io::load_simulation_csv(&args.output)?;

    let plot_path = plot::plot_simulation_paths(&panel, args.n_plot, args.plot.as_deref())?;
    println!("\u{2713} Saved simulation plot to: {}", plot_path.display());

    if let Some(report_path) = &args.markdown {
        let written = report::generate_simulation_report(
            &model,
            &panel,
            &plot_path,
            report_path,
            args.embed_images,
        )?;
        println!("\u{2713} Saved simulation report to: {}", written.display());
    }

    println!("\u{2713} Simulation data saved to: {}", args.output.display());
    Ok(())
}

fn engine_args(args: &[&OsStr]) -> Vec<OsString> {
    args.iter().map(|a| a.to_os_string()).collect()
}

fn print_engine_stdout(output: &Output) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stdout = stdout.trim_end();
    if !stdout.is_empty() {
        println!("{stdout}");
    }
}
