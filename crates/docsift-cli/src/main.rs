//! CLI application for template-based document conversion.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use docsift_core::SiftConfig;

use commands::{batch, convert, peek, template};

/// Classify documents against stored templates and extract their fields
#[derive(Parser)]
#[command(name = "docsift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single PDF document
    Convert(convert::ConvertArgs),

    /// Convert every PDF in a directory
    Batch(batch::BatchArgs),

    /// Show the raw text of a page selection
    Peek(peek::PeekArgs),

    /// Manage template definitions
    Template(template::TemplateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &cli.config {
        Some(path) => SiftConfig::from_file(path)?,
        None => SiftConfig::default(),
    };

    match cli.command {
        Commands::Convert(args) => convert::run(args, &config),
        Commands::Batch(args) => batch::run(args, &config),
        Commands::Peek(args) => peek::run(args, &config),
        Commands::Template(args) => template::run(args, &config),
    }
}
