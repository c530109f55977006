//! Immutable synthesis configuration.
//!
//! Every constant the excitation generator depends on lives here instead of in
//! module-level state. A config is built once (from defaults, a JSON file, or
//! CLI overrides), validated, and then passed by reference to every run.

use serde::{Deserialize, Serialize};

use crate::error::{ExcitationError, ExcitationResult};

/// Noise source used for unvoiced regions of the impulse train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Maximum-length sequence of +1/-1 values.
    #[default]
    MSequence,
    /// Seeded Gaussian white noise.
    ///
    /// Samples can exceed the pulse threshold, so unvoiced stretches of the
    /// voiced train may yield spurious pulses.
    Gaussian,
}

/// Parameters forwarded untouched to the external cepstral synthesis filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisFilterParams {
    /// Cepstral order.
    pub order: usize,
    /// Frequency warping factor.
    pub alpha: f64,
    /// Generalized cepstrum stage (0 = mel-cepstrum).
    pub stage: u32,
}

impl Default for SynthesisFilterParams {
    fn default() -> Self {
        Self {
            order: 59,
            alpha: 0.58,
            stage: 0,
        }
    }
}

/// Excitation synthesis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcitationConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Analysis hop in samples (one pitch/MVF value per hop).
    pub frame_shift: usize,
    /// MVF values above this are clamped before use.
    pub mvf_ceiling_hz: f64,
    /// Width of one codebook band in Hz.
    pub codebook_bin_hz: f64,
    /// Voicing boundary ratio used for codebook selection and low-band splits.
    pub voiced_cutoff_ratio: f64,
    /// Highpass cutoff ratio applied to the MVF for the noise component.
    pub unvoiced_cutoff_ratio: f64,
    /// Chebyshev highpass order.
    pub highpass_order: usize,
    /// Chebyshev lowpass order.
    pub lowpass_order: usize,
    /// Chebyshev passband ripple in dB.
    pub passband_ripple_db: f64,
    /// Attenuation of the plain highpassed noise component.
    pub noise_scaling: f64,
    /// Impulse-train values above this mark a glottal pulse.
    pub pulse_threshold: f64,
    /// Reference frequency for the envelope noise gain.
    pub envelope_gain_reference_hz: f64,
    /// Multiplier for the envelope noise gain (`mvf / reference * factor`).
    pub envelope_gain_factor: f64,
    /// Frames with `mvf < ratio * mean(mvf)` are silenced by the pulse-noise baseline.
    pub pulse_noise_mvf_ratio: f64,
    /// Unvoiced noise source.
    pub noise: NoiseKind,
    /// Seed for the Gaussian noise source.
    pub seed: u32,
    /// External synthesis filter parameters.
    pub filter: SynthesisFilterParams,
}

impl Default for ExcitationConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            frame_shift: 80,
            mvf_ceiling_hz: 7500.0,
            codebook_bin_hz: 100.0,
            voiced_cutoff_ratio: 0.95,
            unvoiced_cutoff_ratio: 1.05,
            highpass_order: 10,
            lowpass_order: 10,
            passband_ripple_db: 0.1,
            noise_scaling: 0.08,
            pulse_threshold: 2.0,
            envelope_gain_reference_hz: 8000.0,
            envelope_gain_factor: 2.0,
            pulse_noise_mvf_ratio: 0.4,
            noise: NoiseKind::MSequence,
            seed: 1,
            filter: SynthesisFilterParams::default(),
        }
    }
}

impl ExcitationConfig {
    /// Sample rate as `f64`.
    #[inline]
    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate as f64
    }

    /// Nyquist frequency in Hz.
    #[inline]
    pub fn nyquist_hz(&self) -> f64 {
        self.sample_rate_hz() / 2.0
    }

    /// Clamps an MVF value to the configured ceiling.
    #[inline]
    pub fn clamp_mvf(&self, mvf_hz: f64) -> f64 {
        mvf_hz.min(self.mvf_ceiling_hz)
    }

    /// Gain applied to the envelope-modulated noise for a given (clamped) MVF.
    #[inline]
    pub fn envelope_gain(&self, mvf_hz: f64) -> f64 {
        mvf_hz / self.envelope_gain_reference_hz * self.envelope_gain_factor
    }

    /// Returns a copy with a different noise seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Parses a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ExcitationResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ExcitationError::invalid_param("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every field is usable.
    pub fn validate(&self) -> ExcitationResult<()> {
        if self.sample_rate == 0 {
            return Err(ExcitationError::invalid_param(
                "sample_rate",
                "must be positive",
            ));
        }
        if self.frame_shift == 0 {
            return Err(ExcitationError::invalid_param(
                "frame_shift",
                "must be positive",
            ));
        }
        if !(self.mvf_ceiling_hz > 0.0 && self.mvf_ceiling_hz < self.nyquist_hz()) {
            return Err(ExcitationError::invalid_param(
                "mvf_ceiling_hz",
                format!("must be in (0, {})", self.nyquist_hz()),
            ));
        }
        let positive = [
            ("codebook_bin_hz", self.codebook_bin_hz),
            ("voiced_cutoff_ratio", self.voiced_cutoff_ratio),
            ("unvoiced_cutoff_ratio", self.unvoiced_cutoff_ratio),
            ("passband_ripple_db", self.passband_ripple_db),
            ("envelope_gain_reference_hz", self.envelope_gain_reference_hz),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ExcitationError::invalid_param(name, "must be positive"));
            }
        }
        // Pulses at the ceiling are highpassed at this cutoff.
        let ceiling_cutoff = self.unvoiced_cutoff_ratio * self.mvf_ceiling_hz;
        if ceiling_cutoff >= self.nyquist_hz() {
            return Err(ExcitationError::invalid_param(
                "mvf_ceiling_hz",
                format!(
                    "unvoiced_cutoff_ratio * mvf_ceiling_hz = {} Hz must be below {} Hz",
                    ceiling_cutoff,
                    self.nyquist_hz()
                ),
            ));
        }
        if self.highpass_order == 0 || self.lowpass_order == 0 {
            return Err(ExcitationError::invalid_param(
                "filter order",
                "must be at least 1",
            ));
        }
        if !(self.noise_scaling >= 0.0) {
            return Err(ExcitationError::invalid_param(
                "noise_scaling",
                "must be non-negative",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = ExcitationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.nyquist_hz(), 8000.0);
        assert_eq!(config.frame_shift, 80);
    }

    #[test]
    fn test_clamp_mvf() {
        let config = ExcitationConfig::default();
        assert_eq!(config.clamp_mvf(8000.0), 7500.0);
        assert_eq!(config.clamp_mvf(3000.0), 3000.0);
    }

    #[test]
    fn test_envelope_gain() {
        let config = ExcitationConfig::default();
        assert!((config.envelope_gain(4000.0) - 1.0).abs() < 1e-12);
        assert!((config.envelope_gain(7500.0) - 1.875).abs() < 1e-12);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = ExcitationConfig::from_json(r#"{"seed": 7, "noise": "gaussian"}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.noise, NoiseKind::Gaussian);
        assert_eq!(config.sample_rate, 16000);
        assert_eq!(config.filter.order, 59);
    }

    #[test]
    fn test_json_rejects_bad_values() {
        let err = ExcitationConfig::from_json(r#"{"frame_shift": 0}"#).unwrap_err();
        assert!(err.to_string().contains("frame_shift"));

        let err = ExcitationConfig::from_json(r#"{"mvf_ceiling_hz": 9000.0}"#).unwrap_err();
        assert!(err.to_string().contains("mvf_ceiling_hz"));
    }

    #[test]
    fn test_json_rejects_ceiling_with_highpass_above_nyquist() {
        // 1.05 * 7700 = 8085 Hz.
        let err = ExcitationConfig::from_json(r#"{"mvf_ceiling_hz": 7700.0}"#).unwrap_err();
        assert!(matches!(err, ExcitationError::InvalidParameter { .. }));
        assert!(err.to_string().contains("unvoiced_cutoff_ratio"));

        let err = ExcitationConfig::from_json(r#"{"unvoiced_cutoff_ratio": 1.1}"#).unwrap_err();
        assert!(matches!(err, ExcitationError::InvalidParameter { .. }));

        // 1.05 * 7600 = 7980 Hz still fits.
        assert!(ExcitationConfig::from_json(r#"{"mvf_ceiling_hz": 7600.0}"#).is_ok());
    }

    #[test]
    fn test_json_rejects_malformed() {
        assert!(ExcitationConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_roundtrip_through_json() {
        let config = ExcitationConfig::default().with_seed(99);
        let json = serde_json::to_string(&config).unwrap();
        let back = ExcitationConfig::from_json(&json).unwrap();
        assert_eq!(config, back);
    }
}
