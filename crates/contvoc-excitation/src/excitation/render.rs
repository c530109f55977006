//! Per-pulse rendering and the overlap-add merge.
//!
//! Each pulse renders into its own scratch frame (voiced shape plus shaped
//! noise), positioned so the frame centre sits on the pulse. Frames are then
//! accumulated into the output buffer in pulse order.

use tracing::warn;

use super::pulse::PulseEvent;
use crate::codebook::ResidualCodebook;
use crate::config::ExcitationConfig;
use crate::envelope;
use crate::error::ExcitationResult;
use crate::filter::{self, BandType};
use crate::normalize::normalize_energy;
use crate::window::apply_hann;

/// A pulse rendered into scratch space.
#[derive(Debug, Clone, PartialEq)]
pub struct PulseFrame {
    /// Buffer position of `samples[0]`; negative when the frame starts before the buffer.
    pub start: isize,
    /// Rendered samples, one codebook entry long.
    pub samples: Vec<f64>,
}

/// Shared inputs for rendering every pulse of one run.
pub(crate) struct Renderer<'a> {
    pub config: &'a ExcitationConfig,
    pub codebook: &'a ResidualCodebook,
    /// All-unvoiced noise train, same length as the output.
    pub noise: &'a [f64],
    /// Envelope of codebook entry 0, when the envelope noise path is on.
    pub envelope: Option<&'a [f64]>,
}

impl Renderer<'_> {
    /// Renders one pulse.
    pub fn render(&self, event: &PulseEvent) -> ExcitationResult<PulseFrame> {
        let voiced = self
            .codebook
            .get(event.codebook_index)
            .map_err(|e| e.at_sample(event.sample_index))?;
        let len = voiced.len();
        let segment = noise_segment(self.noise, event.sample_index, len);

        let highpass = filter::design(
            self.config.unvoiced_cutoff_ratio * event.mvf_hz,
            self.config.sample_rate_hz(),
            self.config.highpass_order,
            self.config.passband_ripple_db,
            BandType::High,
        )
        .map_err(|e| e.at_sample(event.sample_index))?;

        let mut samples = voiced.to_vec();

        let mut plain = highpass.apply(segment);
        apply_hann(&mut plain);
        for (out, n) in samples.iter_mut().zip(&plain) {
            *out += n * self.config.noise_scaling;
        }

        if let Some(reference) = self.envelope {
            let shape = envelope::resample(reference, segment.len());
            let modulated: Vec<f64> = segment.iter().zip(&shape).map(|(n, e)| n * e).collect();
            let mut shaped = highpass.apply(&modulated);
            apply_hann(&mut shaped);

            if normalize_energy(&mut shaped) {
                let gain = self.config.envelope_gain(event.mvf_hz);
                for (out, n) in samples.iter_mut().zip(&shaped) {
                    *out += n * gain;
                }
            } else {
                warn!(
                    sample_index = event.sample_index,
                    "envelope-modulated noise has zero energy, skipping it"
                );
            }
        }

        Ok(PulseFrame {
            start: event.sample_index as isize - (len / 2) as isize,
            samples,
        })
    }
}

/// Noise segment of up to `len` samples for a pulse at `index`.
///
/// Taken forward from the pulse when it fits, otherwise the `len` samples
/// ending at the pulse. Near the start of a short buffer the segment is cut
/// rather than padded.
pub(crate) fn noise_segment(noise: &[f64], index: usize, len: usize) -> &[f64] {
    if index + len < noise.len() {
        &noise[index..index + len]
    } else {
        let end = index.min(noise.len());
        &noise[end.saturating_sub(len)..end]
    }
}

/// Accumulates `frame` into `buffer`, clipped to the buffer bounds.
pub fn overlap_add(buffer: &mut [f64], frame: &PulseFrame) {
    let len = buffer.len() as isize;
    let j_start = (-frame.start).max(0);
    let j_end = (frame.samples.len() as isize).min(len - frame.start);
    for j in j_start..j_end {
        buffer[(frame.start + j) as usize] += frame.samples[j as usize];
    }
}
