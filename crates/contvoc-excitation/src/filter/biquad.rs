//! Second-order IIR sections.
//!
//! Higher-order designs are run as a cascade of these. Each section is a plain
//! direct-form biquad with `a0` normalized to 1.

use rustfft::num_complex::Complex;

/// Biquad section coefficients (`a0 == 1`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoeffs {
    /// Section with a pair of real zeros and a complex-conjugate pole pair.
    ///
    /// # Arguments
    /// * `zeros` - The two (real) zeros
    /// * `pole` - One pole of the conjugate pair
    /// * `gain` - Scale applied to the numerator
    pub fn from_pole_pair(zeros: (f64, f64), pole: Complex<f64>, gain: f64) -> Self {
        Self {
            b0: gain,
            b1: -gain * (zeros.0 + zeros.1),
            b2: gain * zeros.0 * zeros.1,
            a1: -2.0 * pole.re,
            a2: pole.norm_sqr(),
        }
    }

    /// First-order section (one real zero, one real pole) stored as a biquad.
    pub fn first_order(zero: f64, pole: f64, gain: f64) -> Self {
        Self {
            b0: gain,
            b1: -gain * zero,
            b2: 0.0,
            a1: -pole,
            a2: 0.0,
        }
    }

    /// Numerator `[b0, b1, b2]`.
    pub fn numerator(&self) -> [f64; 3] {
        [self.b0, self.b1, self.b2]
    }

    /// Denominator `[1, a1, a2]`.
    pub fn denominator(&self) -> [f64; 3] {
        [1.0, self.a1, self.a2]
    }

    /// Evaluates the section's complex response at `z`.
    pub fn response(&self, z: Complex<f64>) -> Complex<f64> {
        let zi = z.inv();
        let zi2 = zi * zi;
        let num = zi2 * self.b2 + zi * self.b1 + self.b0;
        let den = zi2 * self.a2 + zi * self.a1 + 1.0;
        num / den
    }
}

/// Biquad section with its delay-line state.
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    coeffs: BiquadCoeffs,
    // Delay line for input samples
    x1: f64,
    x2: f64,
    // Delay line for output samples
    y1: f64,
    y2: f64,
}

impl BiquadFilter {
    /// Creates a section at zero state.
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Processes a single sample through the section.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let c = &self.coeffs;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Processes a buffer of samples in place.
    pub fn process_buffer(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}
