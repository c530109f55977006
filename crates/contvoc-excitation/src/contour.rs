//! Per-frame pitch and MVF contours.
//!
//! Both contours arrive as raw little-endian `f32` arrays holding natural logs
//! (`ln F0`, `ln MVF`), one value per analysis hop. Unvoiced pitch frames are
//! stored as `-inf` (or NaN) and become 0 Hz after `exp`.

use std::fs;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use tracing::debug;

use crate::error::{ExcitationError, ExcitationResult};

fn decode_log_f32(bytes: &[u8]) -> ExcitationResult<Vec<f64>> {
    if bytes.len() % 4 != 0 {
        return Err(ExcitationError::invalid_contour(format!(
            "byte length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    let mut raw = vec![0.0f32; bytes.len() / 4];
    LittleEndian::read_f32_into(bytes, &mut raw);
    Ok(raw.into_iter().map(|v| (v as f64).exp()).collect())
}

fn read_file(path: &Path) -> ExcitationResult<Vec<u8>> {
    let bytes = fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "read contour file");
    Ok(bytes)
}

/// Fundamental frequency per frame in Hz; 0 marks an unvoiced frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchContour {
    values: Vec<f64>,
}

impl PitchContour {
    /// Builds a contour from F0 values in Hz.
    ///
    /// Negative or non-finite values are rejected.
    pub fn from_hz(values: Vec<f64>) -> ExcitationResult<Self> {
        if let Some(i) = values.iter().position(|v| !(v.is_finite() && *v >= 0.0)) {
            return Err(ExcitationError::invalid_contour(format!(
                "pitch frame {} is {}",
                i, values[i]
            )));
        }
        Ok(Self { values })
    }

    /// Decodes a log-F0 float32 array. Non-finite results become 0 (unvoiced).
    pub fn from_log_f32(bytes: &[u8]) -> ExcitationResult<Self> {
        let values = decode_log_f32(bytes)?
            .into_iter()
            .map(|f0| if f0.is_finite() { f0 } else { 0.0 })
            .collect();
        Ok(Self { values })
    }

    /// Loads a `.lf0` file.
    pub fn load(path: impl AsRef<Path>) -> ExcitationResult<Self> {
        Self::from_log_f32(&read_file(path.as_ref())?)
    }

    /// F0 values in Hz.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no frames.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of voiced frames.
    pub fn voiced_frames(&self) -> usize {
        self.values.iter().filter(|&&f0| f0 > 0.0).count()
    }

    /// Pitch period in samples per frame (`sample_rate / f0`), 0 where unvoiced.
    pub fn periods(&self, sample_rate: f64) -> Vec<f64> {
        self.values
            .iter()
            .map(|&f0| if f0 > 0.0 { sample_rate / f0 } else { 0.0 })
            .collect()
    }

    fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }
}

/// Maximum voiced frequency per frame in Hz.
#[derive(Debug, Clone, PartialEq)]
pub struct MvfContour {
    values: Vec<f64>,
}

impl MvfContour {
    /// Builds a contour from MVF values in Hz.
    pub fn from_hz(values: Vec<f64>) -> ExcitationResult<Self> {
        if let Some(i) = values.iter().position(|v| !(v.is_finite() && *v >= 0.0)) {
            return Err(ExcitationError::invalid_contour(format!(
                "mvf frame {} is {}",
                i, values[i]
            )));
        }
        Ok(Self { values })
    }

    /// Decodes a log-MVF float32 array.
    ///
    /// Unlike pitch, every MVF frame must decode to a finite frequency.
    pub fn from_log_f32(bytes: &[u8]) -> ExcitationResult<Self> {
        Self::from_hz(decode_log_f32(bytes)?)
    }

    /// Loads a `.mvf` file.
    pub fn load(path: impl AsRef<Path>) -> ExcitationResult<Self> {
        Self::from_log_f32(&read_file(path.as_ref())?)
    }

    /// MVF values in Hz.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no frames.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// MVF of frame `index`.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Arithmetic mean, 0 for an empty contour.
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }
}

/// Truncates both contours to the shorter of the two.
pub fn align_contours(mut pitch: PitchContour, mut mvf: MvfContour) -> (PitchContour, MvfContour) {
    let len = pitch.len().min(mvf.len());
    if pitch.len() != mvf.len() {
        debug!(
            pitch_frames = pitch.len(),
            mvf_frames = mvf.len(),
            kept = len,
            "contour lengths differ, truncating"
        );
    }
    pitch.truncate(len);
    mvf.truncate(len);
    (pitch, mvf)
}
