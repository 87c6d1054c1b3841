//! Configuration for the huffpar application.
//!
//! The clap arguments are resolved into a [`Config`] once, validated against
//! the filesystem, and printed on request so a run can be reproduced.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use huffpar_core::Strategy;

/// Which direction to run the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encode,
    Decode,
}

/// Parallel encoder backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Backend {
    /// Reusable worker threads with per-worker task queues
    #[default]
    Pool,
    /// rayon thread pool
    Farm,
}

/// Complete configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    // === Files ===
    /// File to read
    pub input: PathBuf,

    /// File to write
    pub output: PathBuf,

    /// Replace `output` if it exists
    pub overwrite: bool,

    // === Codec ===
    /// Encode or decode
    pub mode: Mode,

    /// How to encode; ignored when decoding
    pub strategy: Strategy,

    // === Behavior ===
    /// Print the resolved configuration before running
    pub print_config: bool,

    /// Print per-stage timings after running
    pub timings: bool,
}

impl Config {
    /// Build an encode configuration.
    ///
    /// Without `workers` the text is encoded on the calling thread.
    pub fn encode(
        input: PathBuf,
        output: PathBuf,
        workers: Option<usize>,
        backend: Backend,
    ) -> Result<Self> {
        let strategy = match (workers, backend) {
            (None, _) => Strategy::Sequential,
            (Some(0), _) => bail!("--workers must be at least 1"),
            (Some(workers), Backend::Pool) => Strategy::Pool { workers },
            (Some(workers), Backend::Farm) => Strategy::Farm { workers },
        };

        Ok(Self {
            input,
            output,
            overwrite: false,
            mode: Mode::Encode,
            strategy,
            print_config: false,
            timings: false,
        })
    }

    /// Build a decode configuration.
    pub fn decode(input: PathBuf, output: PathBuf) -> Self {
        Self {
            input,
            output,
            overwrite: false,
            mode: Mode::Decode,
            strategy: Strategy::Sequential,
            print_config: false,
            timings: false,
        }
    }

    /// Check the configuration against the filesystem.
    ///
    /// The input must be an existing file, and the output must not exist
    /// unless overwriting was requested.
    pub fn validate(&self) -> Result<()> {
        if !self.input.is_file() {
            bail!("input file {} does not exist", self.input.display());
        }
        if exists(&self.output) && !self.overwrite {
            bail!(
                "output file {} already exists (use --overwrite to replace it)",
                self.output.display()
            );
        }
        Ok(())
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        println!("Mode:        {:?}", self.mode);
        println!("Input file:  {}", self.input.display());
        println!("Output file: {}", self.output.display());
        println!("Overwrite:   {}", self.overwrite);
        if self.mode == Mode::Encode {
            match self.strategy {
                Strategy::Sequential => println!("Strategy:    sequential"),
                Strategy::Pool { workers } => println!("Strategy:    pool, {workers} workers"),
                Strategy::Farm { workers } => println!("Strategy:    farm, {workers} workers"),
            }
        }
        println!();
    }
}

fn exists(path: &Path) -> bool {
    path.try_exists().unwrap_or(true)
}
