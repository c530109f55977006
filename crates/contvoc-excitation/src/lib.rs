//! Continuous Vocoder Excitation
//!
//! This crate rebuilds the excitation (source) signal of a continuous
//! parametric vocoder from per-frame pitch and maximum voiced frequency (MVF)
//! contours and a residual codebook:
//!
//! - **Voiced component** - a codebook residual shape per glottal pulse,
//!   selected by the MVF of the pulse's frame
//! - **Unvoiced component** - white noise highpassed above the MVF
//! - **Envelope-modulated noise** - noise shaped by a time envelope of the
//!   reference residual, scaled with the MVF
//!
//! # Overview
//!
//! Every pulse is rendered into a scratch frame centred on the pulse and the
//! frames are overlap-added into the output buffer. The result is
//! peak-normalized and handed to an external cepstral synthesis filter.
//!
//! # Determinism
//!
//! Given the same contours, codebook and config, output is bit-identical
//! across runs. The default noise is an M-sequence; Gaussian noise uses PCG32
//! with seeds derived via BLAKE3 hashing.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use contvoc_excitation::{
//!     CodebookPreset, ExcitationConfig, GeneratorVariant, MvfContour, PitchContour,
//!     ResidualCodebook, Vocoder,
//! };
//!
//! let codebook = Arc::new(ResidualCodebook::load_preset("codebooks", CodebookPreset::Female)?);
//! let vocoder = Vocoder::new(ExcitationConfig::default(), codebook)?;
//!
//! let pitch = PitchContour::load("arctic_a0001.lf0")?;
//! let mvf = MvfContour::load("arctic_a0001.mvf")?;
//! let excitation = vocoder.excitation(GeneratorVariant::default(), &pitch, &mvf)?;
//! ```
//!
//! # Crate Structure
//!
//! - [`codebook`] - Residual codebook loading and MVF-to-index mapping
//! - [`filter`] - Chebyshev type I lowpass/highpass design and filtering
//! - [`envelope`] - Time envelopes for the modulated noise
//! - [`excitation`] - Pulse detection, per-pulse rendering, overlap-add
//! - [`normalize`] - Peak and energy normalization
//! - [`excite`] - Impulse-train generation from pitch periods
//! - [`band_split`] - Upper/lower band split of an analysis residual
//! - [`vocoder`] - End-to-end pipeline and the synthesis filter interface

pub mod band_split;
pub mod codebook;
pub mod config;
pub mod contour;
pub mod envelope;
pub mod error;
pub mod excitation;
pub mod excite;
pub mod filter;
pub mod normalize;
pub mod rng;
pub mod vocoder;
pub mod window;

// Re-export main types at crate root
pub use band_split::{split_residual, BandSplit};
pub use codebook::{CodebookPreset, ResidualCodebook};
pub use config::{ExcitationConfig, NoiseKind, SynthesisFilterParams};
pub use contour::{align_contours, MvfContour, PitchContour};
pub use envelope::EnvelopeType;
pub use error::{ExcitationError, ExcitationResult};
pub use excitation::{Excitation, ExcitationGenerator, GeneratorVariant, PulseEvent};
pub use excite::{ImpulseGenerator, PulseExcite};
pub use filter::{BandType, FilterSpec};
pub use vocoder::{DecodedExcitation, SynthesisFilter, Vocoder};
