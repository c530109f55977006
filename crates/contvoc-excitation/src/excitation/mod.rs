//! Pitch-synchronous excitation generator.
//!
//! A run has three passes:
//!
//! 1. Impulse trains: a voiced train from the pitch contour and an all-unvoiced
//!    noise train of the same length.
//! 2. Pulse detection over the voiced train ([`detect_pulses`]).
//! 3. Rendering each pulse into a pulse-local frame and overlap-adding the
//!    frames into a zeroed buffer in pulse order.
//!
//! Rendering a pulse depends only on its own event, so the result does not
//! depend on how pulses are scheduled.

mod pulse;
mod render;


use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::codebook::ResidualCodebook;
use crate::config::ExcitationConfig;
use crate::contour::{MvfContour, PitchContour};
use crate::envelope::{self, EnvelopeType};
use crate::error::{ExcitationError, ExcitationResult};
use crate::excite::ImpulseGenerator;

pub use pulse::{detect_pulses, PulseEvent};
pub use render::{overlap_add, PulseFrame};

use render::Renderer;

/// Which components a run sums into the excitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorVariant {
    /// Plain pulse/noise train; frames with low MVF are silenced.
    PulseNoise,
    /// Codebook shapes plus attenuated highpassed noise.
    ResidualWithoutEnvelope,
    /// Codebook shapes, highpassed noise and envelope-modulated noise.
    ResidualWithEnvelope(EnvelopeType),
}

impl Default for GeneratorVariant {
    fn default() -> Self {
        GeneratorVariant::ResidualWithEnvelope(EnvelopeType::default())
    }
}

impl fmt::Display for GeneratorVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorVariant::PulseNoise => f.write_str("pulse-noise"),
            GeneratorVariant::ResidualWithoutEnvelope => f.write_str("residual"),
            GeneratorVariant::ResidualWithEnvelope(envelope) => write!(f, "envelope:{}", envelope),
        }
    }
}

impl FromStr for GeneratorVariant {
    type Err = ExcitationError;

    /// Parses `pulse-noise`, `residual`, `envelope` or `envelope:<type>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pulse-noise" | "pulsenoise" => Ok(GeneratorVariant::PulseNoise),
            "residual" => Ok(GeneratorVariant::ResidualWithoutEnvelope),
            "envelope" => Ok(GeneratorVariant::ResidualWithEnvelope(EnvelopeType::default())),
            _ => match s.strip_prefix("envelope:") {
                Some(name) => Ok(GeneratorVariant::ResidualWithEnvelope(name.parse()?)),
                None => Err(ExcitationError::invalid_param(
                    "variant",
                    format!(
                        "unknown generator variant '{}' (expected pulse-noise, residual or envelope:<type>)",
                        s
                    ),
                )),
            },
        }
    }
}

/// Raw (not yet normalized) excitation from one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Excitation {
    /// Output samples, `frames * frame_shift` long.
    pub samples: Vec<f64>,
    /// Pulses that were rendered, in sample order. Empty for the pulse-noise baseline.
    pub pulses: Vec<PulseEvent>,
    /// Number of impulses in the source train.
    pub pulse_count: usize,
    /// Variant that produced the buffer.
    pub variant: GeneratorVariant,
}

/// Builds excitation buffers from contours.
///
/// Holds only shared references, so one generator can serve many runs.
pub struct ExcitationGenerator<'a> {
    config: &'a ExcitationConfig,
    codebook: &'a ResidualCodebook,
    impulses: &'a dyn ImpulseGenerator,
}

impl<'a> ExcitationGenerator<'a> {
    /// Creates a generator.
    pub fn new(
        config: &'a ExcitationConfig,
        codebook: &'a ResidualCodebook,
        impulses: &'a dyn ImpulseGenerator,
    ) -> Self {
        Self {
            config,
            codebook,
            impulses,
        }
    }

    /// Runs one variant.
    ///
    /// The contours must have the same number of frames (see
    /// [`align_contours`](crate::contour::align_contours)).
    pub fn generate(
        &self,
        variant: GeneratorVariant,
        pitch: &PitchContour,
        mvf: &MvfContour,
    ) -> ExcitationResult<Excitation> {
        if pitch.len() != mvf.len() {
            return Err(ExcitationError::invalid_contour(format!(
                "pitch has {} frames but mvf has {}",
                pitch.len(),
                mvf.len()
            )));
        }

        match variant {
            GeneratorVariant::PulseNoise => Ok(self.pulse_noise(pitch, mvf)),
            GeneratorVariant::ResidualWithoutEnvelope => self.residual(pitch, mvf, None),
            GeneratorVariant::ResidualWithEnvelope(envelope) => {
                self.residual(pitch, mvf, Some(envelope))
            }
        }
    }

    /// Detects the pulses a residual run would render.
    pub fn pulses(&self, pitch: &PitchContour, mvf: &MvfContour) -> ExcitationResult<Vec<PulseEvent>> {
        let train = self.voiced_train(pitch);
        detect_pulses(&train, mvf, self.config)
    }

    fn voiced_train(&self, pitch: &PitchContour) -> Vec<f64> {
        let periods = pitch.periods(self.config.sample_rate_hz());
        self.impulses.generate_impulses(&periods, self.config.frame_shift)
    }

    fn pulse_noise(&self, pitch: &PitchContour, mvf: &MvfContour) -> Excitation {
        let threshold = self.config.pulse_noise_mvf_ratio * mvf.mean();
        let sample_rate = self.config.sample_rate_hz();
        let periods: Vec<f64> = pitch
            .values()
            .iter()
            .zip(mvf.values())
            .map(|(&f0, &m)| {
                if m < threshold || f0 <= 0.0 {
                    0.0
                } else {
                    sample_rate / f0
                }
            })
            .collect();

        let samples = self
            .impulses
            .generate_impulses(&periods, self.config.frame_shift);
        let pulse_count = samples
            .iter()
            .filter(|&&v| v > self.config.pulse_threshold)
            .count();
        debug!(
            frames = periods.len(),
            silenced = periods.iter().filter(|&&p| p == 0.0).count(),
            pulse_count,
            "pulse-noise excitation"
        );

        Excitation {
            samples,
            pulses: Vec::new(),
            pulse_count,
            variant: GeneratorVariant::PulseNoise,
        }
    }

    fn residual(
        &self,
        pitch: &PitchContour,
        mvf: &MvfContour,
        envelope_type: Option<EnvelopeType>,
    ) -> ExcitationResult<Excitation> {
        let train = self.voiced_train(pitch);
        let unvoiced = vec![0.0; pitch.len()];
        let noise = self
            .impulses
            .generate_impulses(&unvoiced, self.config.frame_shift);

        let pulses = detect_pulses(&train, mvf, self.config)?;
        let reference = envelope_type.map(|kind| envelope::apply(self.codebook.reference(), kind));

        let renderer = Renderer {
            config: self.config,
            codebook: self.codebook,
            noise: &noise,
            envelope: reference.as_deref(),
        };
        let frames = pulses
            .iter()
            .map(|event| renderer.render(event))
            .collect::<ExcitationResult<Vec<_>>>()?;

        let mut samples = vec![0.0; train.len()];
        for frame in &frames {
            overlap_add(&mut samples, frame);
        }

        let variant = match envelope_type {
            Some(kind) => GeneratorVariant::ResidualWithEnvelope(kind),
            None => GeneratorVariant::ResidualWithoutEnvelope,
        };
        debug!(
            %variant,
            samples = samples.len(),
            pulse_count = pulses.len(),
            min_index = pulses.iter().map(|p| p.codebook_index).min(),
            max_index = pulses.iter().map(|p| p.codebook_index).max(),
            "residual excitation"
        );

        Ok(Excitation {
            samples,
            pulse_count: pulses.len(),
            pulses,
            variant,
        })
    }
}
