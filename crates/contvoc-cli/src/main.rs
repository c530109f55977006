//! contvoc CLI - Command-line interface for continuous vocoder excitation
//!
//! This binary loads pitch/MVF contours and a residual codebook, builds the
//! excitation and writes it as raw float32 samples for the synthesis filter.

mod cli_args;

use clap::Parser;
use std::process::ExitCode;

use cli_args::{Cli, Commands};
// Use modules from the library crate
use contvoc_cli::commands;
use contvoc_cli::commands::excite::ExciteOptions;

/// Installs the log subscriber. JSON mode keeps stderr quiet.
fn init_logging(verbose: bool, json: bool) {
    if json {
        return;
    }
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Excite {
            lf0,
            mvf,
            codebook,
            preset,
            codebook_dir,
            output,
            variant,
            envelope,
            config,
            seed,
            json,
        } => {
            init_logging(cli.verbose, json);
            commands::excite::run(&ExciteOptions {
                lf0: &lf0,
                mvf: &mvf,
                codebook: codebook.as_deref(),
                preset: preset.as_deref(),
                codebook_dir: &codebook_dir,
                output: &output,
                variant: &variant,
                envelope: envelope.as_deref(),
                config: config.as_deref(),
                seed,
                json,
            })
        }
        Commands::Codebook { input, json } => {
            init_logging(cli.verbose, json);
            commands::codebook::run(&input, json)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
