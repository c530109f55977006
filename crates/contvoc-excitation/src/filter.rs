//! Filter bank: Chebyshev type I lowpass/highpass design and application.
//!
//! Designs are pure functions of (cutoff, sample rate, order, band, ripple).
//! [`FilterSpec::apply`] runs the filter from zero state on every call, so the
//! same input always gives bit-identical output.
//!
//! The transfer function is available as a single coefficient pair through
//! [`FilterSpec::transfer_function`], but filtering runs the equivalent cascade
//! of second-order sections: at order 10 the expanded polynomial form loses
//! stability near DC and Nyquist.

mod biquad;
mod chebyshev;

use rustfft::num_complex::Complex;

use crate::error::{ExcitationError, ExcitationResult};

pub use biquad::{BiquadCoeffs, BiquadFilter};

/// Passband ripple of the default designs, in dB.
pub const PASSBAND_RIPPLE_DB: f64 = 0.1;

/// Filter band type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandType {
    /// Passes frequencies below the cutoff.
    Low,
    /// Passes frequencies above the cutoff.
    High,
}

/// A designed IIR filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    /// Cutoff frequency in Hz.
    pub cutoff_hz: f64,
    /// Sample rate in Hz.
    pub sample_rate_hz: f64,
    /// Filter order.
    pub order: usize,
    /// Band type.
    pub band: BandType,
    sections: Vec<BiquadCoeffs>,
}

/// Designs a Chebyshev type I lowpass with 0.1 dB ripple.
pub fn design_lowpass(cutoff_hz: f64, sample_rate_hz: f64, order: usize) -> ExcitationResult<FilterSpec> {
    design(cutoff_hz, sample_rate_hz, order, PASSBAND_RIPPLE_DB, BandType::Low)
}

/// Designs a Chebyshev type I highpass with 0.1 dB ripple.
pub fn design_highpass(cutoff_hz: f64, sample_rate_hz: f64, order: usize) -> ExcitationResult<FilterSpec> {
    design(cutoff_hz, sample_rate_hz, order, PASSBAND_RIPPLE_DB, BandType::High)
}

/// Designs a Chebyshev type I filter.
///
/// # Arguments
/// * `cutoff_hz` - Cutoff frequency, must lie in `(0, sample_rate_hz / 2)`
/// * `sample_rate_hz` - Sample rate in Hz
/// * `order` - Filter order (at least 1)
/// * `ripple_db` - Passband ripple in dB
/// * `band` - Lowpass or highpass
pub fn design(
    cutoff_hz: f64,
    sample_rate_hz: f64,
    order: usize,
    ripple_db: f64,
    band: BandType,
) -> ExcitationResult<FilterSpec> {
    let nyquist = sample_rate_hz / 2.0;
    if !(cutoff_hz > 0.0 && cutoff_hz < nyquist) {
        return Err(ExcitationError::InvalidCutoff {
            cutoff_hz,
            sample_rate_hz,
            sample_index: None,
        });
    }
    if order == 0 {
        return Err(ExcitationError::invalid_param("order", "must be at least 1"));
    }
    if !(ripple_db > 0.0 && ripple_db.is_finite()) {
        return Err(ExcitationError::invalid_param("ripple_db", "must be positive"));
    }

    let zpk = chebyshev::design_zpk(order, ripple_db, cutoff_hz / nyquist, band);
    Ok(FilterSpec {
        cutoff_hz,
        sample_rate_hz,
        order,
        band,
        sections: zpk.to_sections(),
    })
}

impl FilterSpec {
    /// Second-order sections, applied in order.
    pub fn sections(&self) -> &[BiquadCoeffs] {
        &self.sections
    }

    /// Expanded transfer function `(b, a)` with `a[0] == 1`.
    pub fn transfer_function(&self) -> (Vec<f64>, Vec<f64>) {
        let mut b = vec![1.0];
        let mut a = vec![1.0];
        for section in &self.sections {
            b = convolve(&b, &section.numerator());
            a = convolve(&a, &section.denominator());
        }
        // First-order sections pad with a trailing zero.
        b.truncate(self.order + 1);
        a.truncate(self.order + 1);
        (b, a)
    }

    /// Magnitude response at `freq_hz`.
    pub fn magnitude_at(&self, freq_hz: f64) -> f64 {
        let omega = 2.0 * std::f64::consts::PI * freq_hz / self.sample_rate_hz;
        let z = Complex::from_polar(1.0, omega);
        self.sections
            .iter()
            .fold(Complex::new(1.0, 0.0), |acc, s| acc * s.response(z))
            .norm()
    }

    /// Filters `frame` from zero initial state. Output has the same length.
    pub fn apply(&self, frame: &[f64]) -> Vec<f64> {
        let mut out = frame.to_vec();
        self.apply_in_place(&mut out);
        out
    }

    /// Filters `buffer` in place from zero initial state.
    pub fn apply_in_place(&self, buffer: &mut [f64]) {
        for coeffs in &self.sections {
            BiquadFilter::new(*coeffs).process_buffer(buffer);
        }
    }
}

fn convolve(x: &[f64], y: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; x.len() + y.len() - 1];
    for (i, &xi) in x.iter().enumerate() {
        for (j, &yj) in y.iter().enumerate() {
            out[i + j] += xi * yj;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::MSequence;

    fn noise(n: usize) -> Vec<f64> {
        let mut seq = MSequence::new();
        (0..n).map(|_| seq.next_value()).collect()
    }

    /// Linear gain of a 0.1 dB ripple floor.
    fn ripple_floor() -> f64 {
        10f64.powf(-PASSBAND_RIPPLE_DB / 20.0)
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let spec = design_lowpass(1000.0, 16000.0, 10).unwrap();
        let dc = spec.magnitude_at(0.0);
        assert!(dc <= 1.0 + 1e-9 && dc >= ripple_floor() - 1e-9, "dc = {}", dc);
        assert!(spec.magnitude_at(7999.0) < 1e-6);
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let spec = design_highpass(3150.0, 16000.0, 10).unwrap();
        assert!(spec.magnitude_at(0.0) < 1e-9);
        let near_nyquist = spec.magnitude_at(7999.0);
        assert!(near_nyquist >= ripple_floor() - 1e-6 && near_nyquist <= 1.0 + 1e-6);
    }

    #[test]
    fn test_stopband_attenuation() {
        let spec = design_highpass(3150.0, 16000.0, 10).unwrap();
        // One octave below cutoff a 10th-order Chebyshev is far down.
        assert!(spec.magnitude_at(1575.0) < 1e-3);
    }

    #[test]
    fn test_invalid_cutoffs() {
        for cutoff in [0.0, -10.0, 8000.0, 9000.0, f64::NAN] {
            let err = design_lowpass(cutoff, 16000.0, 10).unwrap_err();
            assert!(matches!(err, ExcitationError::InvalidCutoff { .. }));
            assert!(design_highpass(cutoff, 16000.0, 10).is_err());
        }
    }

    #[test]
    fn test_zero_order_rejected() {
        assert!(matches!(
            design_lowpass(1000.0, 16000.0, 0),
            Err(ExcitationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_apply_preserves_length_and_is_deterministic() {
        let spec = design_highpass(1050.0, 16000.0, 10).unwrap();
        let input = noise(1024);
        let a = spec.apply(&input);
        let b = spec.apply(&input);
        assert_eq!(a.len(), input.len());
        assert_eq!(a, b);
    }

    #[test]
    fn test_stable_at_extreme_cutoffs() {
        let input = noise(4000);
        for cutoff in [105.0, 7875.0] {
            for spec in [
                design_lowpass(cutoff, 16000.0, 10).unwrap(),
                design_highpass(cutoff, 16000.0, 10).unwrap(),
            ] {
                let out = spec.apply(&input);
                assert!(out.iter().all(|v| v.is_finite() && v.abs() < 10.0));
            }
        }
    }

    #[test]
    fn test_transfer_function_shape() {
        for order in [5, 10] {
            let spec = design_lowpass(2000.0, 16000.0, order).unwrap();
            let (b, a) = spec.transfer_function();
            assert_eq!(b.len(), order + 1);
            assert_eq!(a.len(), order + 1);
            assert_eq!(a[0], 1.0);
            assert!(b.iter().chain(a.iter()).all(|c| c.is_finite()));

            // DC gain from the expanded polynomial matches the cascade.
            let dc = b.iter().sum::<f64>() / a.iter().sum::<f64>();
            assert!((dc - spec.magnitude_at(0.0)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_odd_order_has_unity_dc() {
        let spec = design_lowpass(2000.0, 16000.0, 5).unwrap();
        assert!((spec.magnitude_at(0.0) - 1.0).abs() < 1e-9);
        assert_eq!(spec.sections().len(), 3);
    }
}
