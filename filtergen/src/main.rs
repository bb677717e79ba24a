//! Filter generator - Main entry point
//!
//! Reads the configuration store, compiles every category pair into the
//! complete filter document, and writes the document plus its style sidecar.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filtergen::{DocumentAssembler, DocumentStore, GeneratorConfig};
use filtergen_common::Language;

/// Command-line arguments for filtergen
#[derive(Parser, Debug)]
#[command(name = "filtergen")]
#[command(about = "Compiles the configuration store into a complete item filter")]
#[command(version)]
struct Args {
    /// Configuration store root (falls back to FILTERGEN_ROOT, then
    /// filtergen.toml, then ./filter_data)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Output filter document path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output style sidecar path
    #[arg(long)]
    sidecar: Option<PathBuf>,

    /// Header text language (en or ch)
    #[arg(short, long)]
    language: Option<Language>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "filtergen=debug"
    } else {
        "filtergen=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = GeneratorConfig::resolve(
        args.root_folder.as_deref(),
        args.output.as_deref(),
        args.sidecar.as_deref(),
        args.language,
    );
    info!("Configuration store: {}", config.root.display());

    let store = DocumentStore::load(&config)
        .with_context(|| format!("Failed to load store at {}", config.root.display()))?;
    info!(
        categories = store.pairs.len(),
        skipped = store.skipped,
        "Store loaded"
    );

    let output = DocumentAssembler::new(&config).assemble(&store);
    output
        .write(&config)
        .with_context(|| format!("Failed to write {}", config.output_path.display()))?;

    info!(
        blocks = output.block_count,
        styles = output.sidecar.len(),
        "Wrote {}",
        config.output_path.display()
    );
    Ok(())
}
