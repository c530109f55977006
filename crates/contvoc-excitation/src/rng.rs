//! Deterministic noise sources.
//!
//! All randomness in the excitation path flows through this module. Gaussian
//! noise is drawn from PCG32 seeded from a `u32`; per-file seeds are derived
//! with BLAKE3 so that files in a batch get independent streams. The default
//! M-sequence source is a pure shift register and needs no seed at all.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::NoiseKind;

/// Creates a PCG32 RNG from a 32-bit seed.
///
/// The 32-bit seed is expanded to 64 bits by duplicating the value in both
/// halves, as required by PCG32's state initialization.
pub fn create_rng(seed: u32) -> Pcg32 {
    let seed64 = (seed as u64) | ((seed as u64) << 32);
    Pcg32::seed_from_u64(seed64)
}

/// Derives a seed for a named stream (usually a file stem) from the base seed.
///
/// Uses BLAKE3 over `base_seed` (little-endian) followed by the UTF-8 key and
/// keeps the first four bytes of the digest.
pub fn derive_component_seed(base_seed: u32, key: &str) -> u32 {
    let mut input = Vec::with_capacity(4 + key.len());
    input.extend_from_slice(&base_seed.to_le_bytes());
    input.extend_from_slice(key.as_bytes());

    let hash = blake3::hash(&input);
    let b = hash.as_bytes();
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

/// 31-stage maximum-length sequence generator producing +1/-1.
///
/// Taps at bits 0 and 28 of a signed register with arithmetic right shift,
/// starting from `0x55555555`. Every fresh generator yields the same sequence.
#[derive(Debug, Clone)]
pub struct MSequence {
    register: i32,
}

impl Default for MSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl MSequence {
    const B0: i32 = 0x0000_0001;
    const B28: i32 = 0x1000_0000;

    /// Creates a generator at the canonical start state.
    pub fn new() -> Self {
        Self {
            register: 0x5555_5555,
        }
    }

    /// Returns the next value, either `1.0` or `-1.0`.
    #[inline]
    pub fn next_value(&mut self) -> f64 {
        self.register >>= 1;
        let x0: i32 = if self.register & Self::B0 != 0 { 1 } else { -1 };
        let x28: i32 = if self.register & Self::B28 != 0 { 1 } else { -1 };
        if x0 + x28 != 0 {
            self.register &= i32::MAX;
        } else {
            self.register |= i32::MIN;
        }
        x0 as f64
    }
}

/// Noise source feeding unvoiced stretches of an impulse train.
#[derive(Debug, Clone)]
pub enum NoiseSource {
    /// +1/-1 M-sequence.
    MSequence(MSequence),
    /// Standard normal samples from a seeded PCG32.
    Gaussian(Pcg32),
}

impl NoiseSource {
    /// Creates a noise source of the given kind.
    pub fn new(kind: NoiseKind, seed: u32) -> Self {
        match kind {
            NoiseKind::MSequence => NoiseSource::MSequence(MSequence::new()),
            NoiseKind::Gaussian => NoiseSource::Gaussian(create_rng(seed)),
        }
    }

    /// Returns the next noise sample.
    #[inline]
    pub fn next_sample(&mut self) -> f64 {
        match self {
            NoiseSource::MSequence(seq) => seq.next_value(),
            NoiseSource::Gaussian(rng) => gaussian(rng),
        }
    }
}

/// Box-Muller draw of one standard normal value.
fn gaussian(rng: &mut Pcg32) -> f64 {
    // gen::<f64>() is in [0, 1); shift to (0, 1] so ln never sees zero
    let u1 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
