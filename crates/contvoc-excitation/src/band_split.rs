//! Pitch-synchronous split of an analysis residual into bands above and below the MVF.
//!
//! Used to inspect what the codebook shapes and the shaped noise stand in for:
//! the lower band is what the voiced codebook models, the upper band what the
//! highpassed noise models.

use tracing::debug;

use crate::config::ExcitationConfig;
use crate::contour::{MvfContour, PitchContour};
use crate::error::{ExcitationError, ExcitationResult};
use crate::excite::ImpulseGenerator;
use crate::filter::{self, BandType};
use crate::window::apply_hann;

/// Upper and lower band of a residual.
#[derive(Debug, Clone, PartialEq)]
pub struct BandSplit {
    /// Highpassed above `unvoiced_cutoff_ratio * mvf`.
    pub upper: Vec<f64>,
    /// Lowpassed below `voiced_cutoff_ratio * mvf`.
    pub lower: Vec<f64>,
    /// Pulses whose two-period window fit inside the buffer.
    pub frames_used: usize,
}

impl BandSplit {
    /// Sum of both bands.
    pub fn combined(&self) -> Vec<f64> {
        self.upper
            .iter()
            .zip(&self.lower)
            .map(|(u, l)| u + l)
            .collect()
    }
}

/// Splits `residual` around every glottal pulse of `pitch`.
///
/// For a pulse at `i` with period `T0 = floor(fs / f0)`, the window
/// `[i - T0, i + T0)` is highpassed and lowpassed at the frame's MVF,
/// Hann-windowed, and overlap-added back at the same place. Pulses with
/// `i <= T0` or `i + 2 T0 >= len` are skipped. MVF is not clamped here.
pub fn split_residual(
    residual: &[f64],
    pitch: &PitchContour,
    mvf: &MvfContour,
    impulses: &dyn ImpulseGenerator,
    config: &ExcitationConfig,
) -> ExcitationResult<BandSplit> {
    if pitch.len() != mvf.len() {
        return Err(ExcitationError::invalid_contour(format!(
            "pitch has {} frames but mvf has {}",
            pitch.len(),
            mvf.len()
        )));
    }

    let sample_rate = config.sample_rate_hz();
    let train = impulses.generate_impulses(&pitch.periods(sample_rate), config.frame_shift);
    let len = train.len();

    let mut upper = vec![0.0; len];
    let mut lower = vec![0.0; len];
    let mut frames_used = 0;

    for (i, &value) in train.iter().enumerate() {
        if value <= config.pulse_threshold {
            continue;
        }
        let frame = i / config.frame_shift;
        let (f0, mvf_hz) = pitch
            .values()
            .get(frame)
            .copied()
            .zip(mvf.get(frame))
            .ok_or_else(|| {
                ExcitationError::invalid_contour(format!(
                    "pulse at sample {} falls in frame {} but the contours have {} frames",
                    i,
                    frame,
                    pitch.len()
                ))
            })?;
        if f0 <= 0.0 {
            continue;
        }
        let t0 = (sample_rate / f0).floor() as usize;
        if !(i > t0 && i + 2 * t0 < len && i + t0 <= residual.len()) {
            continue;
        }

        let window = &residual[i - t0..i + t0];

        let highpass = filter::design(
            config.unvoiced_cutoff_ratio * mvf_hz,
            sample_rate,
            config.highpass_order,
            config.passband_ripple_db,
            BandType::High,
        )
        .map_err(|e| e.at_sample(i))?;
        let mut high = highpass.apply(window);
        apply_hann(&mut high);

        let lowpass = filter::design(
            config.voiced_cutoff_ratio * mvf_hz,
            sample_rate,
            config.lowpass_order,
            config.passband_ripple_db,
            BandType::Low,
        )
        .map_err(|e| e.at_sample(i))?;
        let mut low = lowpass.apply(window);
        apply_hann(&mut low);

        for (k, (h, l)) in high.iter().zip(&low).enumerate() {
            upper[i - t0 + k] += h;
            lower[i - t0 + k] += l;
        }
        frames_used += 1;
    }

    debug!(samples = len, frames_used, "split residual");
    Ok(BandSplit {
        upper,
        lower,
        frames_used,
    })
}
