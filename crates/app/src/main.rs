//! huffpar: compress and decompress files with Huffman coding.
//!
//! - `huffpar encode <IN> <OUT> [-p N] [--backend pool|farm]`
//! - `huffpar decode <IN> <OUT>`

mod config;
mod logging;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use huffpar_core::{decode_with, encode_with, Metrics};
use tracing::info;

use crate::config::{Backend, Config, Mode};

/// Huffman file compressor with parallel encoding.
#[derive(Parser)]
#[command(name = "huffpar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Print the resolved configuration before running
    #[arg(long, global = true)]
    print_config: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file.
    ///
    /// Without --workers the file is encoded on one thread. Every worker
    /// count and backend produces the same output.
    Encode {
        #[command(flatten)]
        files: Files,

        /// Number of parallel workers
        #[arg(short = 'p', long)]
        workers: Option<usize>,

        /// Parallel backend used with --workers
        #[arg(long, value_enum, default_value_t = Backend::Pool)]
        backend: Backend,
    },

    /// Decompress a file produced by `encode`.
    Decode {
        #[command(flatten)]
        files: Files,
    },
}

#[derive(Args)]
struct Files {
    /// File to read
    input: PathBuf,

    /// File to write
    output: PathBuf,

    /// Replace the output file if it exists
    #[arg(long)]
    overwrite: bool,

    /// Print per-stage timings
    #[arg(long)]
    timings: bool,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let (mut config, files) = match self.command {
            Commands::Encode {
                files,
                workers,
                backend,
            } => (
                Config::encode(files.input.clone(), files.output.clone(), workers, backend)?,
                files,
            ),
            Commands::Decode { files } => (
                Config::decode(files.input.clone(), files.output.clone()),
                files,
            ),
        };
        config.overwrite = files.overwrite;
        config.timings = files.timings;
        config.print_config = self.print_config;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level)?;

    let config = cli.into_config()?;
    if config.print_config {
        config.print();
    }
    config.validate()?;

    let metrics = run(&config)?;
    if config.timings {
        println!("{}", metrics.summary());
    }
    Ok(())
}

fn run(config: &Config) -> Result<Metrics> {
    let input = fs::read(&config.input)
        .with_context(|| format!("failed to read {}", config.input.display()))?;

    let mut metrics = Metrics::new();
    metrics.input_bytes = input.len() as u64;
    metrics.workers = config.strategy.workers();

    let output = match config.mode {
        Mode::Encode => encode_with(&input, config.strategy, &mut metrics)
            .with_context(|| format!("failed to encode {}", config.input.display()))?,
        Mode::Decode => decode_with(&input, &mut metrics)
            .with_context(|| format!("failed to decode {}", config.input.display()))?,
    };

    fs::write(&config.output, &output)
        .with_context(|| format!("failed to write {}", config.output.display()))?;
    metrics.output_bytes = output.len() as u64;
    metrics.complete();

    info!(
        mode = ?config.mode,
        input = metrics.input_bytes,
        output = metrics.output_bytes,
        elapsed_ms = metrics.duration().as_millis() as u64,
        "done"
    );
    Ok(metrics)
}
