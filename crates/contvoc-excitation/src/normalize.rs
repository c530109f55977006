//! Peak normalization of the finished excitation.

use crate::error::{ExcitationError, ExcitationResult};

/// Largest absolute sample value, 0 for an empty buffer.
pub fn peak(samples: &[f64]) -> f64 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f64, |a, b| a.max(b))
}

/// Scales `samples` in place so the peak absolute value is 1.0.
///
/// Returns the peak measured before scaling. Fails with
/// [`ExcitationError::SilentBuffer`] if every sample is zero.
pub fn normalize(samples: &mut [f64]) -> ExcitationResult<f64> {
    let current_peak = peak(samples);
    if !(current_peak > 0.0) {
        return Err(ExcitationError::SilentBuffer { len: samples.len() });
    }

    let gain = 1.0 / current_peak;
    for sample in samples.iter_mut() {
        *sample *= gain;
    }
    Ok(current_peak)
}

/// Returns a peak-normalized copy of `samples`.
pub fn normalized(samples: &[f64]) -> ExcitationResult<Vec<f64>> {
    let mut out = samples.to_vec();
    normalize(&mut out)?;
    Ok(out)
}

/// Scales `samples` in place to unit Euclidean norm.
///
/// Returns `false` and leaves the buffer untouched when its energy is zero.
pub fn normalize_energy(samples: &mut [f64]) -> bool {
    let energy = samples.iter().map(|s| s * s).sum::<f64>().sqrt();
    if !(energy > 0.0) {
        return false;
    }
    for sample in samples.iter_mut() {
        *sample /= energy;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_loud_audio() {
        let mut samples = vec![2.0, -1.5, 3.0, -2.5];
        let before = normalize(&mut samples).unwrap();

        assert_eq!(before, 3.0);
        assert!((peak(&samples) - 1.0).abs() < 1e-12);
        assert!((samples[1] + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_negative_peak() {
        let samples = normalized(&[0.01, -0.04, 0.02]).unwrap();
        assert!((samples[1] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_silent_audio() {
        let mut samples = vec![0.0; 4];
        let err = normalize(&mut samples).unwrap_err();
        assert!(matches!(err, ExcitationError::SilentBuffer { len: 4 }));
        assert!(normalized(&[]).is_err());
    }

    #[test]
    fn test_normalize_energy() {
        let mut samples = vec![3.0, 4.0];
        assert!(normalize_energy(&mut samples));
        assert!((samples[0] - 0.6).abs() < 1e-12);
        assert!((samples[1] - 0.8).abs() < 1e-12);

        let mut silent = vec![0.0; 3];
        assert!(!normalize_energy(&mut silent));
        assert_eq!(silent, vec![0.0; 3]);
    }
}
