//! End-to-end decoding: contours to normalized excitation, then to speech.

use std::sync::Arc;

use tracing::{debug, info};

use crate::codebook::ResidualCodebook;
use crate::config::{ExcitationConfig, SynthesisFilterParams};
use crate::contour::{align_contours, MvfContour, PitchContour};
use crate::error::ExcitationResult;
use crate::excitation::{Excitation, ExcitationGenerator, GeneratorVariant};
use crate::excite::{ImpulseGenerator, PulseExcite};
use crate::normalize::normalize;

/// Cepstral vocal-tract filter that turns an excitation into speech.
pub trait SynthesisFilter {
    /// Filters `excitation` frame by frame.
    ///
    /// # Arguments
    /// * `excitation` - Peak-normalized excitation samples
    /// * `coeffs` - Cepstral coefficients, `params.order + 1` per frame
    /// * `hop` - Samples per frame
    /// * `params` - Order, warping factor and stage
    fn synthesize(
        &self,
        excitation: &[f64],
        coeffs: &[f64],
        hop: usize,
        params: &SynthesisFilterParams,
    ) -> ExcitationResult<Vec<f64>>;
}

/// Normalized excitation and run statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedExcitation {
    /// Samples with peak absolute value 1.0.
    pub samples: Vec<f64>,
    /// Peak of the raw buffer before normalization.
    pub raw_peak: f64,
    /// Number of glottal pulses.
    pub pulse_count: usize,
    /// Frames used after aligning the contours.
    pub frames: usize,
    /// Variant that produced the excitation.
    pub variant: GeneratorVariant,
}

/// Config, codebook and impulse generator bundled for repeated decoding.
///
/// The codebook sits behind an `Arc` so one load can serve concurrent vocoders.
pub struct Vocoder {
    config: ExcitationConfig,
    codebook: Arc<ResidualCodebook>,
    impulses: Box<dyn ImpulseGenerator>,
}

impl Vocoder {
    /// Creates a vocoder using the pulse/noise impulse generator from `config`.
    pub fn new(config: ExcitationConfig, codebook: Arc<ResidualCodebook>) -> ExcitationResult<Self> {
        let impulses = PulseExcite::new(config.noise, config.seed);
        Self::with_impulse_generator(config, codebook, Box::new(impulses))
    }

    /// Creates a vocoder with a custom impulse generator.
    pub fn with_impulse_generator(
        config: ExcitationConfig,
        codebook: Arc<ResidualCodebook>,
        impulses: Box<dyn ImpulseGenerator>,
    ) -> ExcitationResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            codebook,
            impulses,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &ExcitationConfig {
        &self.config
    }

    /// The shared codebook.
    pub fn codebook(&self) -> &Arc<ResidualCodebook> {
        &self.codebook
    }

    /// Generator borrowing this vocoder's state.
    pub fn generator(&self) -> ExcitationGenerator<'_> {
        ExcitationGenerator::new(&self.config, &self.codebook, self.impulses.as_ref())
    }

    /// Raw excitation without normalization. Contours are aligned first.
    pub fn raw_excitation(
        &self,
        variant: GeneratorVariant,
        pitch: &PitchContour,
        mvf: &MvfContour,
    ) -> ExcitationResult<Excitation> {
        let (pitch, mvf) = align_contours(pitch.clone(), mvf.clone());
        self.generator().generate(variant, &pitch, &mvf)
    }

    /// Peak-normalized excitation.
    pub fn excitation(
        &self,
        variant: GeneratorVariant,
        pitch: &PitchContour,
        mvf: &MvfContour,
    ) -> ExcitationResult<DecodedExcitation> {
        let frames = pitch.len().min(mvf.len());
        let Excitation {
            mut samples,
            pulse_count,
            variant,
            ..
        } = self.raw_excitation(variant, pitch, mvf)?;

        let raw_peak = normalize(&mut samples)?;
        info!(
            %variant,
            frames,
            samples = samples.len(),
            pulse_count,
            raw_peak,
            "generated excitation"
        );

        Ok(DecodedExcitation {
            samples,
            raw_peak,
            pulse_count,
            frames,
            variant,
        })
    }

    /// Generates the excitation and runs it through `filter`.
    pub fn synthesize(
        &self,
        variant: GeneratorVariant,
        pitch: &PitchContour,
        mvf: &MvfContour,
        coeffs: &[f64],
        filter: &dyn SynthesisFilter,
    ) -> ExcitationResult<Vec<f64>> {
        let excitation = self.excitation(variant, pitch, mvf)?;
        debug!(
            coeffs = coeffs.len(),
            order = self.config.filter.order,
            alpha = self.config.filter.alpha,
            "running synthesis filter"
        );
        filter.synthesize(
            &excitation.samples,
            coeffs,
            self.config.frame_shift,
            &self.config.filter,
        )
    }
}
