//! Impulse-train generation from a per-frame period contour.

use crate::config::NoiseKind;
use crate::rng::NoiseSource;

/// Produces a sample-rate impulse train from per-frame pitch periods.
pub trait ImpulseGenerator: Send + Sync {
    /// Generates the impulse train.
    ///
    /// # Arguments
    /// * `periods` - Pitch period in samples for each frame, 0 for unvoiced
    /// * `hop` - Samples per frame
    ///
    /// # Returns
    /// `periods.len() * hop` samples. Glottal pulses are the values above the
    /// configured pulse threshold.
    fn generate_impulses(&self, periods: &[f64], hop: usize) -> Vec<f64>;
}

/// Classic pulse/noise excitation.
///
/// Within voiced frames the period is linearly interpolated toward the next
/// frame's period, updated every `interpolation_period` samples, and a pulse of
/// height `sqrt(period)` is emitted whenever the phase counter passes the
/// period. Unvoiced frames, and any frame on a voiced/unvoiced boundary, are
/// filled from the noise source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseExcite {
    /// Unvoiced noise source.
    pub noise: NoiseKind,
    /// Seed for Gaussian noise.
    pub seed: u32,
    /// Samples between period updates (at least 1).
    pub interpolation_period: usize,
}

impl Default for PulseExcite {
    fn default() -> Self {
        Self {
            noise: NoiseKind::MSequence,
            seed: 1,
            interpolation_period: 1,
        }
    }
}

impl PulseExcite {
    /// Creates a generator with the given noise source.
    pub fn new(noise: NoiseKind, seed: u32) -> Self {
        Self {
            noise,
            seed,
            ..Self::default()
        }
    }
}

impl ImpulseGenerator for PulseExcite {
    fn generate_impulses(&self, periods: &[f64], hop: usize) -> Vec<f64> {
        let mut out = Vec::with_capacity(periods.len() * hop);
        let Some(&first) = periods.first() else {
            return out;
        };

        let iprd = self.interpolation_period.max(1);
        let mut noise = NoiseSource::new(self.noise, self.seed);
        let mut p1 = first;
        let mut pc = 0.0;

        for (f, &current) in periods.iter().enumerate() {
            let p2 = periods.get(f + 1).copied().unwrap_or(current);

            let inc = if p1 != 0.0 && p2 != 0.0 {
                (p2 - p1) * iprd as f64 / hop as f64
            } else {
                pc = p2;
                p1 = 0.0;
                0.0
            };

            let mut p = p1;
            let mut countdown = (iprd + 1) / 2;
            for _ in 0..hop {
                let x = if p1 == 0.0 {
                    noise.next_sample()
                } else {
                    pc += 1.0;
                    if pc >= p {
                        pc -= p;
                        p.sqrt()
                    } else {
                        0.0
                    }
                };
                out.push(x);

                countdown -= 1;
                if countdown == 0 {
                    p += inc;
                    countdown = iprd;
                }
            }
            p1 = p2;
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse_positions(train: &[f64]) -> Vec<usize> {
        train
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > 2.0)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_output_length() {
        let gen = PulseExcite::default();
        assert_eq!(gen.generate_impulses(&[100.0; 7], 80).len(), 560);
        assert_eq!(gen.generate_impulses(&[0.0; 3], 80).len(), 240);
        assert!(gen.generate_impulses(&[], 80).is_empty());
    }

    #[test]
    fn test_constant_period_spacing() {
        let train = PulseExcite::default().generate_impulses(&[100.0; 20], 80);
        let pulses = pulse_positions(&train);

        assert_eq!(pulses.len(), 16);
        for pair in pulses.windows(2) {
            assert_eq!(pair[1] - pair[0], 100);
        }
        for &i in &pulses {
            assert!((train[i] - 10.0).abs() < 1e-12);
        }
        // Everything between pulses is silent.
        assert_eq!(train.iter().filter(|&&v| v != 0.0).count(), pulses.len());
    }

    #[test]
    fn test_unvoiced_is_bipolar_noise() {
        let train = PulseExcite::default().generate_impulses(&[0.0; 10], 80);
        assert!(train.iter().all(|&v| v == 1.0 || v == -1.0));
        assert!(pulse_positions(&train).is_empty());
    }

    #[test]
    fn test_voicing_boundary_frames_are_noise() {
        let periods = [0.0, 0.0, 100.0, 100.0, 100.0, 100.0, 0.0];
        let train = PulseExcite::default().generate_impulses(&periods, 80);

        // Frame 1 sees the onset as its next period, so it is a boundary frame.
        assert!(train[..160].iter().all(|&v| v.abs() == 1.0));
        let pulses = pulse_positions(&train);
        assert!(!pulses.is_empty());
        assert!(pulses.iter().all(|&i| (160..480).contains(&i)));
        assert!(train[480..].iter().all(|&v| v.abs() == 1.0));
    }

    #[test]
    fn test_gaussian_noise_is_seeded() {
        let a = PulseExcite::new(NoiseKind::Gaussian, 3).generate_impulses(&[0.0; 4], 80);
        let b = PulseExcite::new(NoiseKind::Gaussian, 3).generate_impulses(&[0.0; 4], 80);
        let c = PulseExcite::new(NoiseKind::Gaussian, 4).generate_impulses(&[0.0; 4], 80);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_period_interpolation() {
        // Period glides down from 100; pulse spacing shrinks.
        let periods: Vec<f64> = (0..20).map(|f| 100.0 - 2.5 * f as f64).collect();
        let train = PulseExcite::default().generate_impulses(&periods, 80);
        let pulses = pulse_positions(&train);
        let first_gap = pulses[1] - pulses[0];
        let last_gap = pulses[pulses.len() - 1] - pulses[pulses.len() - 2];
        assert!(last_gap < first_gap);
    }
}
