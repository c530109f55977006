//! Codebook command implementation
//!
//! Prints the entry count and per-entry lengths of a residual codebook file.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::process::ExitCode;

use contvoc_excitation::{ExcitationConfig, ResidualCodebook};

use super::json_output::{CommandOutput, JsonError};

/// Layout of a codebook file.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CodebookSummary {
    pub path: String,
    pub entries: usize,
    pub entry_lengths: Vec<usize>,
    /// Index selected at the default MVF ceiling (the lowest reachable index).
    pub ceiling_index: i64,
    /// Lowest MVF that still maps inside the codebook.
    pub min_covered_mvf_hz: f64,
    /// Whether every positive MVF up to the ceiling maps to an existing entry.
    pub covers_mvf_range: bool,
}

/// Run the codebook command
///
/// # Arguments
/// * `input` - Path to the codebook file
/// * `json_output` - Whether to output machine-readable JSON
pub fn run(input: &str, json_output: bool) -> Result<ExitCode> {
    if json_output {
        let (output, code) = match summarize(input) {
            Ok(summary) => (CommandOutput::success(summary), ExitCode::SUCCESS),
            Err(e) => (
                CommandOutput::failure(JsonError::from_anyhow(&e)),
                ExitCode::from(1),
            ),
        };
        let json = serde_json::to_string_pretty(&output).context("Failed to serialize output")?;
        println!("{}", json);
        return Ok(code);
    }

    let summary = summarize(input)?;
    println!("{} {}", "Codebook:".cyan().bold(), summary.path);
    println!("  {} {}", "Entries:".dimmed(), summary.entries);
    if let (Some(min), Some(max)) = (
        summary.entry_lengths.iter().min(),
        summary.entry_lengths.iter().max(),
    ) {
        println!("  {} {}..={} samples", "Lengths:".dimmed(), min, max);
    }
    println!(
        "  {} index {} at the MVF ceiling",
        "Highest band:".dimmed(),
        summary.ceiling_index
    );
    if !summary.covers_mvf_range {
        println!(
            "  {} MVF below {:.1} Hz selects an index past the last entry",
            "WARNING".yellow().bold(),
            summary.min_covered_mvf_hz
        );
    }
    Ok(ExitCode::SUCCESS)
}

/// Loads `input` and describes it.
pub fn summarize(input: &str) -> Result<CodebookSummary> {
    let codebook = ResidualCodebook::load(input)
        .with_context(|| format!("Failed to load codebook: {}", input))?;
    let config = ExcitationConfig::default();
    let ceiling_index = ResidualCodebook::index_for_mvf(config.mvf_ceiling_hz, &config);
    // Indices grow as MVF falls; solve index_for_mvf(mvf) < len for mvf.
    let min_covered_mvf_hz = ((config.nyquist_hz()
        - codebook.len() as f64 * config.codebook_bin_hz)
        / config.voiced_cutoff_ratio)
        .max(0.0);

    Ok(CodebookSummary {
        path: input.to_string(),
        entries: codebook.len(),
        entry_lengths: codebook.entry_lengths(),
        ceiling_index,
        min_covered_mvf_hz,
        covers_mvf_range: ceiling_index >= 0 && min_covered_mvf_hz == 0.0,
    })
}
