//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::{CsvBarReader, CsvTableWriter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::build_pipeline_config;
use crate::domain::error::FeatError;
use crate::domain::pipeline::{PipelineConfig, planned_columns, run_pipeline};
use crate::domain::summary::StrategySummary;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::BarSource;
use crate::ports::table_port::TableSink;

#[derive(Parser, Debug)]
#[command(
    name = "futfeat",
    about = "Feature and strategy-return builder for daily futures bars"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the feature table from a CSV of daily bars
    Build {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [input] path
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Overrides [output] path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Validate and list the planned columns without reading data
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a pipeline configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show row counts and date range of an input file
    Info {
        #[arg(short, long)]
        input: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Build {
            config,
            input,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_build(&config, input.as_deref(), output.as_deref())
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::Info { input } => run_info(&input),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, FeatError> {
    FileConfigAdapter::from_file(path).map_err(|e| FeatError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Command-line override first, then `[section] path`.
pub fn resolve_path(
    override_path: Option<&Path>,
    config: &dyn ConfigPort,
    section: &str,
) -> Result<PathBuf, FeatError> {
    if let Some(p) = override_path {
        return Ok(p.to_path_buf());
    }
    config
        .get_string(section, "path")
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| FeatError::ConfigMissing {
            section: section.to_string(),
            key: "path".to_string(),
        })
}

fn report(err: FeatError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

fn run_build(config_path: &Path, input: Option<&Path>, output: Option<&Path>) -> ExitCode {
    match build(config_path, input, output) {
        Ok(summaries) => {
            print_summary(&summaries);
            ExitCode::SUCCESS
        }
        Err(e) => report(e),
    }
}

/// Load, compute and write. Nothing is written unless loading succeeds.
pub fn build(
    config_path: &Path,
    input: Option<&Path>,
    output: Option<&Path>,
) -> Result<Vec<StrategySummary>, FeatError> {
    info!(path = %config_path.display(), "loading config");
    let adapter = load_config(config_path)?;
    let config = build_pipeline_config(&adapter)?;
    let input = resolve_path(input, &adapter, "input")?;
    let output = resolve_path(output, &adapter, "output")?;

    info!(path = %input.display(), "loading bars");
    let loaded = CsvBarReader::new(&input).load()?;
    info!(
        original = loaded.original_rows,
        cleaned = loaded.cleaned_rows,
        duplicates = loaded.warnings.len(),
        non_positive = loaded.non_positive_rows,
        "input loaded"
    );
    if loaded.bars.is_empty() {
        warn!(path = %input.display(), "no usable bars in input");
    }

    let result = run_pipeline(loaded.bars, &config)?;
    let summaries = StrategySummary::compute_all(&result.table);

    CsvTableWriter::new(&output).write_table(&result.table)?;
    info!(
        path = %output.display(),
        rows = result.table.len(),
        columns = result.table.keys().len() + 5,
        "feature table written"
    );
    Ok(summaries)
}

fn print_summary(summaries: &[StrategySummary]) {
    if summaries.is_empty() {
        return;
    }
    eprintln!("\n=== Strategy Summary ===");
    eprintln!(
        "  {:<28} {:>6} {:>7} {:>11} {:>10} {:>8}",
        "column", "days", "active", "mean", "total", "hit"
    );
    for s in summaries {
        let hit = s
            .hit_rate
            .map(|h| format!("{:.1}%", h * 100.0))
            .unwrap_or_else(|| "-".to_string());
        eprintln!(
            "  {:<28} {:>6} {:>7} {:>10.4}% {:>9.2}% {:>8}",
            s.column.to_string(),
            s.observations,
            s.active_days,
            s.mean_return * 100.0,
            s.total_return * 100.0,
            hit,
        );
    }
}

fn print_sweep(config: &PipelineConfig) {
    eprintln!("\nTrend-following sweep:");
    for combo in config.trend.combos() {
        eprintln!("  {} {}/{}", combo.ma, combo.fast, combo.slow);
    }
    eprintln!("\nCounter-trend sweep:");
    for combo in config.counter_trend.combos() {
        eprintln!(
            "  {} period {} x{}",
            combo.direction, combo.period, combo.retracement
        );
    }
}

pub fn run_dry_run(config_path: &Path) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path).and_then(|a| build_pipeline_config(&a)) {
        Ok(c) => c,
        Err(e) => return report(e),
    };
    eprintln!("Config validated successfully");

    print_sweep(&config);

    let columns = match planned_columns(&config) {
        Ok(c) => c,
        Err(e) => return report(e),
    };
    eprintln!("\nOutput columns ({}):", columns.len() + 5);
    eprintln!("  Date\n  Open\n  High\n  Low\n  Close");
    for key in &columns {
        eprintln!("  {}", key);
    }

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path).and_then(|a| build_pipeline_config(&a)) {
        Ok(c) => c,
        Err(e) => return report(e),
    };

    eprintln!(
        "  returns:        past {:?}, future {:?}",
        config.past_periods, config.future_periods
    );
    eprintln!(
        "  moving:         ma {:?}, vol {:?}, range {:?}",
        config.ma_windows, config.vol_windows, config.range_windows
    );
    eprintln!("  ema_smoothing:  {}", config.ema_smoothing);
    eprintln!("  z-score scales: {:?}", config.z_scales.windows());
    eprintln!("  trend:          {} strategies", config.trend.combos().len());
    eprintln!(
        "  counter-trend:  {} strategies",
        config.counter_trend.combos().len()
    );

    eprintln!("\nPipeline configuration is valid.");
    ExitCode::SUCCESS
}

fn run_info(input: &Path) -> ExitCode {
    let loaded = match CsvBarReader::new(input).load() {
        Ok(r) => r,
        Err(e) => return report(e),
    };

    println!(
        "{}: {} rows, {} usable bars",
        input.display(),
        loaded.original_rows,
        loaded.cleaned_rows
    );
    match (loaded.bars.first(), loaded.bars.last()) {
        (Some(first), Some(last)) => println!("  {} to {}", first.date, last.date),
        _ => println!("  no data"),
    }
    let inconsistent = loaded.bars.iter().filter(|b| !b.is_consistent()).count();
    if inconsistent > 0 {
        println!("  {} bars with high/low not bracketing open/close", inconsistent);
    }
    if loaded.non_positive_rows > 0 {
        println!("  {} bars with a zero or negative price", loaded.non_positive_rows);
    }
    for w in &loaded.warnings {
        println!("  warning: {}", w);
    }
    ExitCode::SUCCESS
}
