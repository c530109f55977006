//! Residual codebook store.
//!
//! A codebook is a fixed table of low-pass filtered pitch-period residual
//! waveforms, one per 100 Hz band of maximum voiced frequency. Entry 0 is the
//! reference shape that seeds the time envelope of the modulated noise.
//!
//! # Binary layout (little-endian)
//!
//! ```text
//! i32 entry_count
//! repeat entry_count times:
//!     i32 length
//!     f64 values[length]
//! ```
//!
//! Every entry carries its own length prefix; entries are not assumed to be the
//! same length.

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::{info, warn};

use crate::config::ExcitationConfig;
use crate::error::{ExcitationError, ExcitationResult};

const MEMORY_SOURCE: &str = "<memory>";

/// Speaker presets shipped alongside the vocoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodebookPreset {
    /// Male speaker (AWB).
    Male,
    /// Female speaker (SLT).
    Female,
}

impl CodebookPreset {
    /// File name of the preset codebook.
    pub fn file_name(self) -> &'static str {
        match self {
            CodebookPreset::Male => "resid_cdbk_awb_0080_pca.bin",
            CodebookPreset::Female => "resid_cdbk_slt_0080_pca.bin",
        }
    }

    /// Parses `male`/`female` (also accepts the speaker ids `awb`/`slt`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "male" | "awb" => Some(CodebookPreset::Male),
            "female" | "slt" => Some(CodebookPreset::Female),
            _ => None,
        }
    }
}

/// Read-only table of residual shapes.
///
/// Never resized after loading; share it across threads behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualCodebook {
    entries: Vec<Vec<f64>>,
}

impl ResidualCodebook {
    /// Builds a codebook from already-decoded entries.
    ///
    /// Fails if the table is empty or any entry is empty, the same conditions
    /// the binary loader rejects.
    pub fn new(entries: Vec<Vec<f64>>) -> ExcitationResult<Self> {
        if entries.is_empty() {
            return Err(ExcitationError::corrupt(MEMORY_SOURCE, "no entries"));
        }
        if let Some(i) = entries.iter().position(|e| e.is_empty()) {
            return Err(ExcitationError::corrupt(
                MEMORY_SOURCE,
                format!("entry {} is empty", i),
            ));
        }
        Ok(Self { entries })
    }

    /// Loads a codebook file.
    pub fn load(path: impl AsRef<Path>) -> ExcitationResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let codebook = Self::parse(&bytes, &path.display().to_string())?;
        info!(
            path = %path.display(),
            entries = codebook.len(),
            "loaded residual codebook"
        );
        Ok(codebook)
    }

    /// Loads one of the preset codebooks from a directory.
    pub fn load_preset(dir: impl AsRef<Path>, preset: CodebookPreset) -> ExcitationResult<Self> {
        Self::load(dir.as_ref().join(preset.file_name()))
    }

    /// Parses a codebook from an in-memory buffer.
    pub fn from_bytes(bytes: &[u8]) -> ExcitationResult<Self> {
        Self::parse(bytes, MEMORY_SOURCE)
    }

    fn parse(bytes: &[u8], source: &str) -> ExcitationResult<Self> {
        let mut cursor = Cursor::new(bytes);
        let truncated = |what: String| ExcitationError::corrupt(source, what);

        let count = cursor
            .read_i32::<LittleEndian>()
            .map_err(|_| truncated("truncated before entry count".to_string()))?;
        if count <= 0 {
            return Err(ExcitationError::corrupt(
                source,
                format!("non-positive entry count {}", count),
            ));
        }

        // Each entry needs at least 12 bytes; don't trust the header for capacity.
        let mut entries = Vec::with_capacity((count as usize).min(bytes.len() / 12));
        for i in 0..count as usize {
            let length = cursor
                .read_i32::<LittleEndian>()
                .map_err(|_| truncated(format!("truncated before length of entry {}", i)))?;
            if length <= 0 {
                return Err(ExcitationError::corrupt(
                    source,
                    format!("entry {} has non-positive length {}", i, length),
                ));
            }
            let length = length as usize;

            // Check the remaining size up front so a bogus length cannot drive
            // a huge allocation.
            let remaining = bytes.len() - cursor.position() as usize;
            if remaining < length * 8 {
                return Err(truncated(format!(
                    "entry {} declares {} values but only {} bytes remain",
                    i, length, remaining
                )));
            }

            let mut values = vec![0.0; length];
            cursor
                .read_f64_into::<LittleEndian>(&mut values)
                .map_err(|_| truncated(format!("truncated inside entry {}", i)))?;
            entries.push(values);
        }

        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest)?;
        if !rest.is_empty() {
            warn!(
                source,
                trailing_bytes = rest.len(),
                "ignoring trailing bytes after codebook"
            );
        }

        Ok(Self { entries })
    }

    /// Serializes the codebook in the binary layout `load` reads.
    pub fn to_bytes(&self) -> Vec<u8> {
        let total: usize = self.entries.iter().map(|e| 4 + e.len() * 8).sum();
        let mut out = Vec::with_capacity(4 + total);
        out.extend_from_slice(&(self.entries.len() as i32).to_le_bytes());
        for entry in &self.entries {
            out.extend_from_slice(&(entry.len() as i32).to_le_bytes());
            for &v in entry {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        out
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a loaded codebook; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns entry `index`.
    pub fn get(&self, index: i64) -> ExcitationResult<&[f64]> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.entries.get(i))
            .map(Vec::as_slice)
            .ok_or(ExcitationError::IndexOutOfRange {
                index,
                len: self.entries.len(),
                sample_index: None,
            })
    }

    /// The reference low-pass shape (entry 0).
    pub fn reference(&self) -> &[f64] {
        &self.entries[0]
    }

    /// Length of every entry, in order.
    pub fn entry_lengths(&self) -> Vec<usize> {
        self.entries.iter().map(Vec::len).collect()
    }

    /// Maps a clamped MVF to a codebook index.
    ///
    /// `floor((nyquist - voiced_ratio * mvf) / bin_hz)`: 100 Hz bands counted
    /// down from Nyquist. The result is not range-checked here.
    pub fn index_for_mvf(mvf_hz: f64, config: &ExcitationConfig) -> i64 {
        ((config.nyquist_hz() - config.voiced_cutoff_ratio * mvf_hz) / config.codebook_bin_hz)
            .floor() as i64
    }

    /// Looks up the voiced shape for a clamped MVF.
    pub fn shape_for_mvf(&self, mvf_hz: f64, config: &ExcitationConfig) -> ExcitationResult<&[f64]> {
        self.get(Self::index_for_mvf(mvf_hz, config))
    }
}
