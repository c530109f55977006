//! Excite command implementation
//!
//! Loads pitch/MVF contours and a residual codebook, builds the excitation and
//! writes it as raw float32 little-endian samples.

use anyhow::{Context, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;

use contvoc_excitation::rng::derive_component_seed;
use contvoc_excitation::{
    CodebookPreset, DecodedExcitation, EnvelopeType, ExcitationConfig, GeneratorVariant,
    MvfContour, PitchContour, ResidualCodebook, Vocoder,
};

use super::json_output::{error_codes, CommandOutput, JsonError};

/// Options for one `excite` run.
#[derive(Debug, Clone, Default)]
pub struct ExciteOptions<'a> {
    pub lf0: &'a str,
    pub mvf: &'a str,
    /// Explicit codebook file; takes precedence over `preset`.
    pub codebook: Option<&'a str>,
    pub preset: Option<&'a str>,
    pub codebook_dir: &'a str,
    pub output: &'a str,
    pub variant: &'a str,
    /// Overrides the envelope type of an envelope variant.
    pub envelope: Option<&'a str>,
    pub config: Option<&'a str>,
    pub seed: Option<u32>,
    pub json: bool,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExciteSummary {
    pub output: String,
    pub variant: String,
    pub frames: usize,
    pub samples: usize,
    pub pulse_count: usize,
    pub raw_peak: f64,
    pub seed: u32,
}

/// Run the excite command
///
/// # Returns
/// Exit code: 0 on success, 1 on failure
pub fn run(options: &ExciteOptions<'_>) -> Result<ExitCode> {
    if options.json {
        run_json(options)
    } else {
        run_human(options)
    }
}

fn run_human(options: &ExciteOptions<'_>) -> Result<ExitCode> {
    println!("{} {}", "Exciting:".cyan().bold(), options.lf0);

    let summary = execute(options)?;

    println!("  {} {}", "Variant:".dimmed(), summary.variant);
    println!("  {} {}", "Frames:".dimmed(), summary.frames);
    println!("  {} {}", "Samples:".dimmed(), summary.samples);
    println!("  {} {}", "Pulses:".dimmed(), summary.pulse_count);
    println!("  {} {:.6}", "Raw peak:".dimmed(), summary.raw_peak);
    println!(
        "\n{} wrote {}",
        "SUCCESS".green().bold(),
        summary.output.bold()
    );

    Ok(ExitCode::SUCCESS)
}

fn run_json(options: &ExciteOptions<'_>) -> Result<ExitCode> {
    let (output, code) = match execute(options) {
        Ok(summary) => (CommandOutput::success(summary), ExitCode::SUCCESS),
        Err(e) => (
            CommandOutput::failure(JsonError::from_anyhow(&e)),
            ExitCode::from(1),
        ),
    };
    let json = serde_json::to_string_pretty(&output).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(code)
}

/// Does the work shared by both output modes.
pub fn execute(options: &ExciteOptions<'_>) -> Result<ExciteSummary> {
    let mut config = load_config(options.config)?;
    if let Some(seed) = options.seed {
        config.seed = seed;
    }
    // Each utterance gets its own noise stream under one base seed.
    let stem = Path::new(options.lf0)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(options.lf0);
    config.seed = derive_component_seed(config.seed, stem);
    debug!(stem, seed = config.seed, "derived noise seed");

    let variant = resolve_variant(options.variant, options.envelope)?;
    let codebook = load_codebook(options)?;

    let pitch = PitchContour::load(options.lf0)
        .with_context(|| format!("Failed to load pitch contour: {}", options.lf0))?;
    let mvf = MvfContour::load(options.mvf)
        .with_context(|| format!("Failed to load MVF contour: {}", options.mvf))?;

    let seed = config.seed;
    let vocoder = Vocoder::new(config, Arc::new(codebook)).context("Invalid configuration")?;
    let decoded = vocoder
        .excitation(variant, &pitch, &mvf)
        .with_context(|| format!("Failed to generate excitation for {}", options.lf0))?;

    write_raw_f32(Path::new(options.output), &decoded.samples)
        .with_context(|| format!("Failed to write output: {}", options.output))?;

    Ok(summarize(options.output, &decoded, seed))
}

fn summarize(output: &str, decoded: &DecodedExcitation, seed: u32) -> ExciteSummary {
    ExciteSummary {
        output: output.to_string(),
        variant: decoded.variant.to_string(),
        frames: decoded.frames,
        samples: decoded.samples.len(),
        pulse_count: decoded.pulse_count,
        raw_peak: decoded.raw_peak,
        seed,
    }
}

fn load_config(path: Option<&str>) -> Result<ExcitationConfig> {
    let Some(path) = path else {
        return Ok(ExcitationConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read config: {}", path))?;
    ExcitationConfig::from_json(&text)
        .with_context(|| format!("{}: invalid config {}", error_codes::CONFIG_PARSE, path))
}

/// Parses the variant; `envelope` replaces the type of an envelope variant.
pub fn resolve_variant(variant: &str, envelope: Option<&str>) -> Result<GeneratorVariant> {
    let parsed: GeneratorVariant = variant.parse()?;
    match (parsed, envelope) {
        (GeneratorVariant::ResidualWithEnvelope(_), Some(name)) => {
            let kind: EnvelopeType = name.parse()?;
            Ok(GeneratorVariant::ResidualWithEnvelope(kind))
        }
        (_, Some(name)) => anyhow::bail!(
            "{}: --envelope {} only applies to the envelope variant, not '{}'",
            error_codes::USAGE,
            name,
            parsed
        ),
        (parsed, None) => Ok(parsed),
    }
}

fn load_codebook(options: &ExciteOptions<'_>) -> Result<ResidualCodebook> {
    if let Some(path) = options.codebook {
        return ResidualCodebook::load(path)
            .with_context(|| format!("Failed to load codebook: {}", path));
    }
    let name = options.preset.ok_or_else(|| {
        anyhow::anyhow!("{}: either --codebook or --preset is required", error_codes::USAGE)
    })?;
    let preset = CodebookPreset::from_name(name)
        .ok_or_else(|| anyhow::anyhow!("{}: unknown preset '{}'", error_codes::USAGE, name))?;
    ResidualCodebook::load_preset(options.codebook_dir, preset).with_context(|| {
        format!(
            "Failed to load {} codebook from {}",
            name, options.codebook_dir
        )
    })
}

/// Writes samples as float32 little-endian.
pub fn write_raw_f32(path: &Path, samples: &[f64]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(fs::File::create(path)?);
    for &s in samples {
        writer.write_f32::<LittleEndian>(s as f32)?;
    }
    writer.flush()?;
    Ok(())
}
