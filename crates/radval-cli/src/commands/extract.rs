//! Extract command - run one extractor over a single report.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use radval_core::{build_extractor, ReportExtractor};

use super::validate::BackendArg;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Report text (reads stdin when neither TEXT nor --file is given)
    #[arg(conflicts_with = "file")]
    text: Option<String>,

    /// Read the report from a file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Extraction backend (default: from config)
    #[arg(short, long, value_enum)]
    backend: Option<BackendArg>,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(backend) = args.backend {
        config.extraction.backend = backend.into();
    }

    let report = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?,
        (None, None) => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let extractor = build_extractor(&config);
    debug!("Extracting with the {} extractor", extractor.name());

    let record = extractor.extract(&report)?;
    println!("{}", serde_json::to_string_pretty(&record)?);

    Ok(())
}
