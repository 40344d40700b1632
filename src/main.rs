//! NeuroTrace CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "neurotrace")]
#[command(about = "Neuron morphology reconstruction and analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a reconstruction and print summary statistics
    Stats {
        /// Input file (.swc, .json, or .asc)
        file: PathBuf,

        /// Emit machine-readable JSON instead of the text summary
        #[arg(long)]
        json: bool,
    },
    /// Parse a reconstruction and report every warning
    Validate {
        file: PathBuf,
    },
    /// Convert any supported format to canonical SWC
    Convert {
        file: PathBuf,

        /// Output path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Compute full morphometrics for one reconstruction
    Morpho {
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },
    /// Sholl analysis: intersection counts on concentric shells
    Sholl {
        file: PathBuf,

        /// Shell spacing in µm
        #[arg(long, default_value = "10")]
        step: f64,

        /// Write the series as CSV to this path instead of stdout
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Morphometrics over many files on a worker pool
    Batch {
        files: Vec<PathBuf>,

        /// Worker threads (defaults to available parallelism, capped at 8)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Write one CSV row per file to this path
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("neurotrace={}", log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Stats { file, json } => commands::stats(file, json),
        Commands::Validate { file } => commands::validate(file),
        Commands::Convert { file, output } => commands::convert(file, output),
        Commands::Morpho { file, json } => commands::morpho(file, json),
        Commands::Sholl { file, step, csv } => commands::sholl(file, step, csv),
        Commands::Batch { files, jobs, csv } => commands::batch(files, jobs, csv),
        Commands::Version => {
            println!("NeuroTrace v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
