//! layerprune - trim a BERT-family encoder to a subset of its blocks.
//!
//! Usage:
//!   layerprune -m bert_uncased/ -o bert_uncased_prune/ -s 1,2,3
//!   layerprune -m bert_uncased/ -s 4                 # first 4 blocks
//!   layerprune -m bert_uncased/ -s 0,11 --dry-run    # report only

use clap::Parser;
use layerprune::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Keep a subset of a BERT model's encoder blocks and save the shallower model.
#[derive(Parser, Debug)]
#[command(name = "layerprune", version, about, long_about = None)]
struct Cli {
    /// Source model directory (config.json, weights, tokenizer files)
    #[arg(short = 'm', long, default_value = "")]
    model_path: PathBuf,

    /// Destination directory, created if missing
    #[arg(short = 'o', long, default_value = layerprune::DEFAULT_OUTPUT_DIR)]
    prune_model_path: PathBuf,

    /// Blocks to keep: N for the first N blocks, or a list such as 1,2,3
    #[arg(short = 's', long, default_value = "2", value_parser = parse_selection)]
    select_layers: LayerSelection,

    /// Keep parameters outside embeddings/encoder/pooler (task heads)
    #[arg(long)]
    keep_unclassified: bool,

    /// Print every source parameter with its shape before pruning
    #[arg(long)]
    print_params: bool,

    /// Run the transform and report, but write nothing
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long)]
    quiet: bool,
}

fn parse_selection(s: &str) -> std::result::Result<LayerSelection, String> {
    s.parse().map_err(|e: PruneError| e.to_string())
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let policy = if cli.keep_unclassified {
        UnclassifiedPolicy::Keep
    } else {
        UnclassifiedPolicy::Drop
    };

    let job = PruneJob::builder()
        .model_path(&cli.model_path)
        .output_path(&cli.prune_model_path)
        .selection(cli.select_layers.clone())
        .unclassified(policy)
        .dry_run(cli.dry_run)
        .list_parameters(cli.print_params)
        .build();

    match job.run() {
        Ok(report) => {
            for row in &report.source_parameters {
                println!("{row}");
            }
            println!("Pruning complete");
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            match err.downcast_ref::<PruneError>() {
                Some(PruneError::SourceNotFound(_)) => ExitCode::from(3),
                Some(PruneError::EmptySelection) => ExitCode::from(4),
                _ => ExitCode::FAILURE,
            }
        }
    }
}
