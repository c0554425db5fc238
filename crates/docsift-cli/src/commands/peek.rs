//! Peek command - dump the raw text of a page selection.

use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use docsift_core::{Engine, PageSelector, SiftConfig};

use super::{ModeArg, OcrArgs};

/// Arguments for the peek command.
#[derive(Args)]
pub struct PeekArgs {
    /// Input PDF document
    #[arg(required = true)]
    input: PathBuf,

    /// Page selection: "a" (all), "l" (last) or a 1-based page number
    #[arg(short, long, default_value = "a")]
    pages: PageSelector,

    /// Text-acquisition mode
    #[arg(short, long, value_enum, default_value = "auto")]
    mode: ModeArg,

    #[command(flatten)]
    ocr: OcrArgs,
}

pub fn run(args: PeekArgs, config: &SiftConfig) -> anyhow::Result<()> {
    let engine = Engine::from_config(config)?;
    let opts = args.ocr.options(config, args.mode, false);
    let page = engine.peek_text(&args.input, args.pages, &opts)?;

    debug!("Text source: {:?}", page.source);
    println!("{}", page.text);

    Ok(())
}
