//! CLI argument definitions for the contvoc command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use clap::{Parser, Subcommand};

/// contvoc - Continuous vocoder excitation synthesis
#[derive(Parser)]
#[command(name = "contvoc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Log per-run details (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Generate a peak-normalized excitation from pitch and MVF contours
    Excite {
        /// Log-F0 contour (raw float32)
        #[arg(long)]
        lf0: String,

        /// Log-MVF contour (raw float32)
        #[arg(long)]
        mvf: String,

        /// Residual codebook file
        #[arg(long, conflicts_with = "preset")]
        codebook: Option<String>,

        /// Preset codebook (male, female)
        #[arg(long, value_parser = ["male", "female"])]
        preset: Option<String>,

        /// Directory holding the preset codebooks
        #[arg(long, default_value = ".")]
        codebook_dir: String,

        /// Output path for raw float32 little-endian samples
        #[arg(short, long)]
        output: String,

        /// Generator variant (pulse-noise, residual, envelope, envelope:<type>)
        #[arg(long, default_value = "envelope")]
        variant: String,

        /// Envelope type for the envelope variant (Amplitude, Hilbert, Triangular, True)
        #[arg(long)]
        envelope: Option<String>,

        /// JSON config file; flags override its values
        #[arg(long)]
        config: Option<String>,

        /// Base noise seed
        #[arg(long)]
        seed: Option<u32>,

        /// Output machine-readable JSON summary (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Print the layout of a residual codebook
    Codebook {
        /// Codebook file
        #[arg(short, long)]
        input: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}
