//! Validate command - extract every report in a CSV and compare it with the
//! structured columns.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use radval_core::models::config::RadvalConfig;
use radval_core::pipeline::{OutputRow, RunSummary};
use radval_core::table::{read_input_file, write_output_csv, write_output_json};
use radval_core::{build_extractor, Backend, Comparator, Pipeline, ReportExtractor, StructuredGroundTruth};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Input CSV file or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Extraction backend (default: from config)
    #[arg(short, long, value_enum)]
    backend: Option<BackendArg>,

    /// Allowed size difference in millimetres
    #[arg(long)]
    tolerance: Option<f64>,

    /// Bedrock region
    #[arg(long)]
    region: Option<String>,

    /// Bedrock model identifier
    #[arg(long)]
    model_id: Option<String>,

    /// Sampling temperature for the hosted model
    #[arg(long)]
    temperature: Option<f32>,

    /// Response token cap for the hosted model
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Exit with an error when any row mismatches or fails
    #[arg(long)]
    fail_on_mismatch: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// CSV with a header row
    Csv,
    /// Pretty-printed JSON array
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum BackendArg {
    /// Rule-based extractor
    Local,
    /// Hosted model through Amazon Bedrock
    Bedrock,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Local => Backend::Local,
            BackendArg::Bedrock => Backend::Bedrock,
        }
    }
}

impl ValidateArgs {
    /// Command-line flags win over the config file and environment.
    fn apply_to(&self, config: &mut RadvalConfig) {
        if let Some(backend) = self.backend {
            config.extraction.backend = backend.into();
        }
        if let Some(tolerance) = self.tolerance {
            config.validation.size_tolerance_mm = tolerance;
        }
        if let Some(region) = &self.region {
            config.remote.region = region.clone();
        }
        if let Some(model_id) = &self.model_id {
            config.remote.model_id = model_id.clone();
        }
        if let Some(temperature) = self.temperature {
            config.remote.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.remote.max_output_tokens = max_tokens;
        }
    }
}

pub fn run(args: ValidateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = super::load_config(config_path)?;
    args.apply_to(&mut config);

    let comparator = Comparator::new(config.validation.size_tolerance_mm)?;
    let extractor = build_extractor(&config);

    let files = expand_input(&args.input)?;
    let mut rows: Vec<StructuredGroundTruth> = Vec::new();
    for path in &files {
        let file_rows = read_input_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        debug!("Loaded {} rows from {}", file_rows.len(), path.display());
        rows.extend(file_rows);
    }

    info!(
        "Validating {} rows from {} file(s) with the {} extractor",
        rows.len(),
        files.len(),
        extractor.name()
    );

    let pb = ProgressBar::new(rows.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows")?
            .progress_chars("=>-"),
    );

    let pipeline = Pipeline::new(&*extractor, comparator);
    let result = pipeline.validate_rows(&rows, |_, _| pb.inc(1));
    pb.finish_and_clear();
    let run = result?;

    match &args.output {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            write_rows(writer, &run.rows, args.format)?;
            eprintln!(
                "{} Results written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => write_rows(io::stdout().lock(), &run.rows, args.format)?,
    }

    print_summary(&run.summary, &run.rows, start);

    if args.fail_on_mismatch && !run.summary.is_clean() {
        anyhow::bail!(
            "{} of {} rows mismatched, {} failed",
            run.summary.rows_with_mismatches,
            run.summary.rows,
            run.summary.failed_rows
        );
    }

    Ok(())
}

/// Resolve the input argument to one or more CSV files.
fn expand_input(input: &str) -> anyhow::Result<Vec<PathBuf>> {
    let direct = PathBuf::from(input);
    if direct.is_file() {
        return Ok(vec![direct]);
    }

    let mut files: Vec<PathBuf> = glob(input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No input files found for: {}", input);
    }
    Ok(files)
}

fn write_rows<W: Write>(writer: W, rows: &[OutputRow], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Csv => write_output_csv(writer, rows)?,
        OutputFormat::Json => write_output_json(writer, rows)?,
    }
    Ok(())
}

/// Summary goes to stderr so stdout stays machine-readable.
fn print_summary(summary: &RunSummary, rows: &[OutputRow], start: Instant) {
    eprintln!();
    eprintln!(
        "{} Validated {} rows in {:?}",
        style("✓").green(),
        summary.rows,
        start.elapsed()
    );
    eprintln!(
        "   {} clean, {} with mismatches ({} total), {} failed",
        style(summary.rows - summary.rows_with_mismatches - summary.failed_rows).green(),
        style(summary.rows_with_mismatches).yellow(),
        summary.total_mismatches,
        style(summary.failed_rows).red()
    );

    let failed: Vec<_> = rows.iter().filter(|r| r.is_failed()).collect();
    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed rows:").red());
        for row in failed {
            eprintln!(
                "  - {}: {}",
                row.patient_id,
                row.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
