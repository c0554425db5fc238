//! Convert command - classify and extract a single document.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::debug;

use docsift_core::{Engine, SiftConfig};

use super::{ModeArg, OcrArgs};

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Input PDF document
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Text-acquisition mode
    #[arg(short, long, value_enum, default_value = "auto")]
    mode: ModeArg,

    /// Remove the input file after conversion, successful or not
    #[arg(long)]
    delete: bool,

    #[command(flatten)]
    ocr: OcrArgs,
}

pub fn run(args: ConvertArgs, config: &SiftConfig) -> anyhow::Result<()> {
    let start = Instant::now();

    let engine = Engine::from_config(config)?;
    let opts = args.ocr.options(config, args.mode, args.delete);
    let record = engine.convert_document(&args.input, &opts)?;

    let output = serde_json::to_string_pretty(&record)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{output}");
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
