//! Chebyshev type I design via the bilinear transform.
//!
//! Poles of the analog prototype are computed for a unit cutoff, scaled (or
//! inverted for highpass) to the prewarped cutoff, then mapped to the z-plane
//! with `s = 4 (z - 1) / (z + 1)` (bilinear transform at a normalized rate of 2).
//! The result is kept in zero/pole/gain form and grouped into biquad sections.

use std::f64::consts::PI;

use rustfft::num_complex::Complex;

use super::biquad::BiquadCoeffs;
use super::BandType;

/// Bilinear transform constant `2 * fs` with `fs = 2`.
const BILINEAR_K: f64 = 4.0;

/// Digital zeros, poles and gain.
#[derive(Debug, Clone)]
pub(crate) struct Zpk {
    pub zeros: Vec<Complex<f64>>,
    pub poles: Vec<Complex<f64>>,
    pub gain: f64,
}

fn product(values: impl Iterator<Item = Complex<f64>>) -> Complex<f64> {
    values.fold(Complex::new(1.0, 0.0), |acc, v| acc * v)
}

/// Analog prototype poles for a unit cutoff, ordered by `m = -N+1, -N+3, .., N-1`.
///
/// Pole `i` and pole `N-1-i` are conjugates; for odd `N` the middle pole is real.
fn prototype(order: usize, ripple_db: f64) -> (Vec<Complex<f64>>, f64) {
    let n = order as f64;
    let eps = (10f64.powf(0.1 * ripple_db) - 1.0).sqrt();
    let mu = (1.0 / eps).asinh() / n;

    let poles: Vec<Complex<f64>> = (0..order)
        .map(|i| {
            let m = -(n - 1.0) + 2.0 * i as f64;
            let theta = PI * m / (2.0 * n);
            -Complex::new(mu, theta).sinh()
        })
        .collect();

    let mut gain = product(poles.iter().map(|p| -*p)).re;
    if order % 2 == 0 {
        gain /= (1.0 + eps * eps).sqrt();
    }
    (poles, gain)
}

/// Designs a digital Chebyshev type I filter.
///
/// `normalized_cutoff` is the cutoff divided by Nyquist, in `(0, 1)`.
pub(crate) fn design_zpk(
    order: usize,
    ripple_db: f64,
    normalized_cutoff: f64,
    band: BandType,
) -> Zpk {
    let (proto_poles, proto_gain) = prototype(order, ripple_db);
    let warped = BILINEAR_K * (PI * normalized_cutoff / 2.0).tan();

    let (analog_zeros, analog_poles, analog_gain) = match band {
        BandType::Low => {
            let poles: Vec<_> = proto_poles.iter().map(|p| *p * warped).collect();
            (Vec::new(), poles, proto_gain * warped.powi(order as i32))
        }
        BandType::High => {
            let poles: Vec<_> = proto_poles
                .iter()
                .map(|p| Complex::new(warped, 0.0) / *p)
                .collect();
            let gain = proto_gain * product(proto_poles.iter().map(|p| -*p)).inv().re;
            (vec![Complex::new(0.0, 0.0); order], poles, gain)
        }
    };

    let k = Complex::new(BILINEAR_K, 0.0);
    let mut zeros: Vec<_> = analog_zeros.iter().map(|z| (k + *z) / (k - *z)).collect();
    let poles: Vec<_> = analog_poles.iter().map(|p| (k + *p) / (k - *p)).collect();
    // Zeros at infinity land on z = -1.
    zeros.resize(poles.len(), Complex::new(-1.0, 0.0));

    let gain = analog_gain
        * (product(analog_zeros.iter().map(|z| k - *z))
            / product(analog_poles.iter().map(|p| k - *p)))
            .re;

    Zpk {
        zeros,
        poles,
        gain,
    }
}

impl Zpk {
    /// Groups the design into biquad sections. The gain goes on the first one.
    pub fn to_sections(&self) -> Vec<BiquadCoeffs> {
        let order = self.poles.len();
        let mut sections = Vec::with_capacity((order + 1) / 2);

        for i in 0..order / 2 {
            let zeros = (self.zeros[2 * i].re, self.zeros[2 * i + 1].re);
            sections.push(BiquadCoeffs::from_pole_pair(zeros, self.poles[i], 1.0));
        }
        if order % 2 == 1 {
            let pole = self.poles[order / 2].re;
            let zero = self.zeros[order - 1].re;
            sections.push(BiquadCoeffs::first_order(zero, pole, 1.0));
        }

        if let Some(first) = sections.first_mut() {
            first.b0 *= self.gain;
            first.b1 *= self.gain;
            first.b2 *= self.gain;
        }
        sections
    }
}
