//! Time-domain envelopes for modulating the noise component.
//!
//! Each envelope maps a frame to a same-length frame and has no side effects.
//! The production path uses [`EnvelopeType::Hilbert`] over codebook entry 0.

use std::fmt;
use std::str::FromStr;

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};

use crate::error::{ExcitationError, ExcitationResult};

/// Order of the amplitude envelope scaling, `1 / (2N + 1)`.
const AMPLITUDE_ORDER: usize = 10;

/// Triangle support as fractions of the frame length.
const TRIANGLE_START: f64 = 0.35;
const TRIANGLE_END: f64 = 0.65;

/// Number of low quefrency bins bounded by the cepstral floor.
const TRUE_ENVELOPE_BINS: usize = 100;

/// Weight applied to the bounded log spectrum before inversion.
const TRUE_ENVELOPE_WEIGHT: f64 = 20.0;

/// Keeps `log10` finite on empty spectral bins.
const LOG_FLOOR: f64 = 1e-12;

/// Supported envelope shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EnvelopeType {
    /// Rectified magnitude scaled by `1/21`.
    Amplitude,
    /// Magnitude of the analytic signal.
    #[default]
    Hilbert,
    /// Triangle over the middle 30% of the frame.
    Triangular,
    /// Cepstrally floored log spectrum, inverted back to time.
    True,
}

impl EnvelopeType {
    /// All supported envelopes.
    pub const ALL: [EnvelopeType; 4] = [
        EnvelopeType::Amplitude,
        EnvelopeType::Hilbert,
        EnvelopeType::Triangular,
        EnvelopeType::True,
    ];

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            EnvelopeType::Amplitude => "Amplitude",
            EnvelopeType::Hilbert => "Hilbert",
            EnvelopeType::Triangular => "Triangular",
            EnvelopeType::True => "True",
        }
    }
}

impl fmt::Display for EnvelopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EnvelopeType {
    type Err = ExcitationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EnvelopeType::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ExcitationError::UnsupportedEnvelope {
                name: s.to_string(),
            })
    }
}

/// Computes the envelope of `frame`.
pub fn apply(frame: &[f64], envelope: EnvelopeType) -> Vec<f64> {
    match envelope {
        EnvelopeType::Amplitude => amplitude(frame),
        EnvelopeType::Hilbert => hilbert_magnitude(frame),
        EnvelopeType::Triangular => triangular(frame.len()),
        EnvelopeType::True => true_envelope(frame),
    }
}

/// Computes the envelope named `name`.
///
/// Fails with [`ExcitationError::UnsupportedEnvelope`] for unknown names.
pub fn apply_named(frame: &[f64], name: &str) -> ExcitationResult<Vec<f64>> {
    Ok(apply(frame, name.parse()?))
}

/// Linearly resamples `envelope` to `target_len` points, keeping both endpoints.
pub fn resample(envelope: &[f64], target_len: usize) -> Vec<f64> {
    if envelope.is_empty() {
        return vec![0.0; target_len];
    }
    if envelope.len() == target_len {
        return envelope.to_vec();
    }

    let last = envelope.len() - 1;
    let scale = last as f64 / (target_len.saturating_sub(1)).max(1) as f64;
    (0..target_len)
        .map(|i| {
            let pos = i as f64 * scale;
            let idx_low = (pos.floor() as usize).min(last);
            let idx_high = (idx_low + 1).min(last);
            let frac = pos - idx_low as f64;
            envelope[idx_low] * (1.0 - frac) + envelope[idx_high] * frac
        })
        .collect()
}

fn amplitude(frame: &[f64]) -> Vec<f64> {
    let scale = 1.0 / (2 * AMPLITUDE_ORDER + 1) as f64;
    frame.iter().map(|s| s.abs() * scale).collect()
}

/// `|x + j H{x}|`, with the Hilbert transform taken in the frequency domain.
fn hilbert_magnitude(frame: &[f64]) -> Vec<f64> {
    let n = frame.len();
    if n == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::new();
    let mut spectrum = to_complex(frame);
    planner.plan_fft_forward(n).process(&mut spectrum);

    // Keep DC (and Nyquist for even n), double positive bins, zero negative ones.
    let positive_end = if n % 2 == 0 { n / 2 } else { (n + 1) / 2 };
    for (k, bin) in spectrum.iter_mut().enumerate() {
        if k == 0 || (n % 2 == 0 && k == n / 2) {
            continue;
        }
        if k < positive_end {
            *bin *= 2.0;
        } else {
            *bin = Complex::new(0.0, 0.0);
        }
    }

    planner.plan_fft_inverse(n).process(&mut spectrum);
    let scale = 1.0 / n as f64;
    spectrum.iter().map(|c| c.norm() * scale).collect()
}

/// Triangle rising from 0 at 35% of the frame to 1 at 50%, back to 0 at 65%.
///
/// The abscissa is the sample index, so every index outside
/// `[0.35 L, 0.65 L)` is exactly zero.
fn triangular(len: usize) -> Vec<f64> {
    let l = len as f64;
    let a = TRIANGLE_START * l;
    let c = TRIANGLE_END * l;
    let b = (a + c) / 2.0;

    (0..len)
        .map(|i| {
            let z = i as f64;
            if z <= a || z >= c {
                0.0
            } else if z <= b {
                (z - a) / (b - a)
            } else {
                (c - z) / (c - b)
            }
        })
        .collect()
}

/// Cepstrally floored log spectrum returned to the time domain.
///
/// 1. `c = |IFFT(20 log10 |X|)|`, the real cepstrum magnitude.
/// 2. `TE = 10 log10 |X|`.
/// 3. For the first 100 bins, `TE[k] = max(TE[k], c[k - 1])` with `c[-1]`
///    wrapping to the last quefrency bin.
/// 4. Output is the real part of `IFFT(20 * TE)`.
fn true_envelope(frame: &[f64]) -> Vec<f64> {
    let n = frame.len();
    if n == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::new();
    let forward = planner.plan_fft_forward(n);
    let inverse = planner.plan_fft_inverse(n);
    let scale = 1.0 / n as f64;

    let mut spectrum = to_complex(frame);
    forward.process(&mut spectrum);
    let magnitude: Vec<f64> = spectrum.iter().map(|c| c.norm() + LOG_FLOOR).collect();

    let mut cepstrum: Vec<Complex<f64>> = magnitude
        .iter()
        .map(|m| Complex::new(20.0 * m.log10(), 0.0))
        .collect();
    inverse.process(&mut cepstrum);
    let floor: Vec<f64> = cepstrum.iter().map(|c| c.norm() * scale).collect();

    let mut envelope: Vec<f64> = magnitude.iter().map(|m| 10.0 * m.log10()).collect();
    for k in 0..TRUE_ENVELOPE_BINS.min(n) {
        let prev = (k + n - 1) % n;
        envelope[k] = envelope[k].max(floor[prev]);
    }

    let mut out: Vec<Complex<f64>> = envelope
        .iter()
        .map(|v| Complex::new(TRUE_ENVELOPE_WEIGHT * v, 0.0))
        .collect();
    inverse.process(&mut out);
    out.iter().map(|c| c.re * scale).collect()
}

fn to_complex(frame: &[f64]) -> Vec<Complex<f64>> {
    frame.iter().map(|&s| Complex::new(s, 0.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(n: usize, cycles: f64) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * cycles * i as f64 / n as f64).sin())
            .collect()
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Hilbert".parse::<EnvelopeType>().unwrap(), EnvelopeType::Hilbert);
        assert_eq!("true".parse::<EnvelopeType>().unwrap(), EnvelopeType::True);
        let err = "Gaussian".parse::<EnvelopeType>().unwrap_err();
        assert!(matches!(err, ExcitationError::UnsupportedEnvelope { ref name } if name == "Gaussian"));
    }

    #[test]
    fn test_apply_named_unknown() {
        assert!(apply_named(&[1.0, 2.0], "Square").is_err());
        assert_eq!(apply_named(&[1.0, 2.0], "Triangular").unwrap().len(), 2);
    }

    #[test]
    fn test_amplitude_scaling() {
        let out = apply(&[-21.0, 0.0, 42.0], EnvelopeType::Amplitude);
        assert_eq!(out, vec![1.0, 0.0, 2.0]);
    }

    #[test]
    fn test_hilbert_of_sine_is_flat() {
        // Integer number of cycles: the analytic signal has unit magnitude everywhere.
        for n in [256, 255] {
            let out = apply(&sine(n, 8.0), EnvelopeType::Hilbert);
            assert_eq!(out.len(), n);
            for v in out {
                assert!((v - 1.0).abs() < 1e-9, "n = {}, v = {}", n, v);
            }
        }
    }

    #[test]
    fn test_hilbert_of_dc() {
        let out = apply(&[0.5; 16], EnvelopeType::Hilbert);
        for v in out {
            assert!((v - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_triangular_shape() {
        let out = apply(&[0.0; 100], EnvelopeType::Triangular);
        assert_eq!(out[35], 0.0);
        assert!((out[50] - 1.0).abs() < 1e-12);
        assert!((out[40] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(out[65], 0.0);
        assert!(out[..=35].iter().all(|&v| v == 0.0));
        assert!(out[65..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_true_envelope_finite() {
        let out = apply(&sine(512, 5.0), EnvelopeType::True);
        assert_eq!(out.len(), 512);
        assert!(out.iter().all(|v| v.is_finite()));

        let silent = apply(&[0.0; 64], EnvelopeType::True);
        assert!(silent.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_empty_frames() {
        for envelope in EnvelopeType::ALL {
            assert!(apply(&[], envelope).is_empty());
        }
    }

    #[test]
    fn test_resample() {
        assert_eq!(resample(&[1.0, 2.0], 2), vec![1.0, 2.0]);
        assert_eq!(resample(&[0.0, 2.0], 3), vec![0.0, 1.0, 2.0]);
        assert_eq!(resample(&[0.0, 1.0, 2.0, 3.0, 4.0], 3), vec![0.0, 2.0, 4.0]);
        assert_eq!(resample(&[], 2), vec![0.0, 0.0]);
        assert!(resample(&[1.0, 2.0], 0).is_empty());
        assert_eq!(resample(&[5.0], 3), vec![5.0; 3]);
    }

    #[test]
    fn test_default_is_hilbert() {
        assert_eq!(EnvelopeType::default(), EnvelopeType::Hilbert);
        assert_eq!(EnvelopeType::Hilbert.to_string(), "Hilbert");
    }
}
