//! Batch command - convert every PDF in a directory.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::debug;

use docsift_core::{Engine, SiftConfig};

use super::{ModeArg, OcrArgs};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input directory
    #[arg(required = true)]
    input: PathBuf,

    /// Write one JSON file per document into this directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Text-acquisition mode
    #[arg(short, long, value_enum, default_value = "auto")]
    mode: ModeArg,

    /// Remove each input file after its conversion, successful or not
    #[arg(long)]
    delete: bool,

    #[command(flatten)]
    ocr: OcrArgs,
}

pub fn run(args: BatchArgs, config: &SiftConfig) -> anyhow::Result<()> {
    let start = Instant::now();

    let engine = Engine::from_config(config)?;
    let opts = args.ocr.options(config, args.mode, args.delete);
    let report = engine.convert_directory(&args.input, &opts)?;

    if let Some(output_dir) = &args.output_dir {
        fs::create_dir_all(output_dir)?;
        for (file, record) in &report.records {
            let stem = PathBuf::from(file)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.clone());
            let output_path = output_dir.join(format!("{stem}.json"));
            fs::write(&output_path, serde_json::to_string_pretty(record)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&report.records)?);
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        report.records.len() + report.errors.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(report.records.len()).green(),
        style(report.errors.len()).red()
    );

    if !report.errors.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for failure in &report.errors {
            println!("  - {}: {}", failure.file, failure.error);
        }
    }

    Ok(())
}
