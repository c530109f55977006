//! Error types for excitation synthesis.

use thiserror::Error;

/// Result type for excitation operations.
pub type ExcitationResult<T> = Result<T, ExcitationError>;

/// Errors that can occur while loading inputs or synthesizing an excitation.
///
/// All of these abort the current run. None of them are retried: they point
/// at malformed input data or at a codebook/MVF range mismatch.
#[derive(Debug, Error)]
pub enum ExcitationError {
    /// Malformed codebook header or body.
    #[error("corrupt codebook '{source_name}': {reason}")]
    CorruptCodebook {
        /// File the codebook was read from (`<memory>` for in-memory data).
        source_name: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Codebook access outside `[0, len)`.
    #[error("codebook index {index} out of range (codebook has {len} entries){}", fmt_sample(.sample_index))]
    IndexOutOfRange {
        /// Requested index. Signed so MVF-derived negative indices are reported as-is.
        index: i64,
        /// Number of entries in the codebook.
        len: usize,
        /// Pulse position that produced the index, when known.
        sample_index: Option<usize>,
    },

    /// Filter design with a cutoff outside `(0, sample_rate / 2)`.
    #[error("invalid cutoff {cutoff_hz} Hz for sample rate {sample_rate_hz} Hz{}", fmt_sample(.sample_index))]
    InvalidCutoff {
        /// Requested cutoff.
        cutoff_hz: f64,
        /// Sample rate the filter was designed for.
        sample_rate_hz: f64,
        /// Pulse whose MVF produced the cutoff, when known.
        sample_index: Option<usize>,
    },

    /// Unknown envelope name.
    #[error("unsupported envelope type '{name}'")]
    UnsupportedEnvelope {
        /// The name that failed to parse.
        name: String,
    },

    /// Peak normalization of an all-zero buffer.
    #[error("cannot normalize silent buffer of {len} samples")]
    SilentBuffer {
        /// Buffer length.
        len: usize,
    },

    /// Malformed pitch or MVF contour data.
    #[error("invalid contour: {reason}")]
    InvalidContour {
        /// What was wrong with it.
        reason: String,
    },

    /// Invalid configuration or parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// Failure reported by the external synthesis filter.
    #[error("synthesis error: {message}")]
    Synthesis {
        /// Error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_sample(sample_index: &Option<usize>) -> String {
    match sample_index {
        Some(i) => format!(" at sample {}", i),
        None => String::new(),
    }
}

impl ExcitationError {
    /// Creates a corrupt codebook error.
    pub fn corrupt(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptCodebook {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid contour error.
    pub fn invalid_contour(reason: impl Into<String>) -> Self {
        Self::InvalidContour {
            reason: reason.into(),
        }
    }

    /// Creates a synthesis error.
    pub fn synthesis(message: impl Into<String>) -> Self {
        Self::Synthesis {
            message: message.into(),
        }
    }

    /// Attaches the pulse position to a codebook or filter-design error.
    pub fn at_sample(self, sample: usize) -> Self {
        match self {
            Self::IndexOutOfRange { index, len, .. } => Self::IndexOutOfRange {
                index,
                len,
                sample_index: Some(sample),
            },
            Self::InvalidCutoff {
                cutoff_hz,
                sample_rate_hz,
                ..
            } => Self::InvalidCutoff {
                cutoff_hz,
                sample_rate_hz,
                sample_index: Some(sample),
            },
            other => other,
        }
    }

    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ExcitationError::CorruptCodebook { .. } => "EXC_001",
            ExcitationError::IndexOutOfRange { .. } => "EXC_002",
            ExcitationError::InvalidCutoff { .. } => "EXC_003",
            ExcitationError::UnsupportedEnvelope { .. } => "EXC_004",
            ExcitationError::SilentBuffer { .. } => "EXC_005",
            ExcitationError::InvalidContour { .. } => "EXC_006",
            ExcitationError::InvalidParameter { .. } => "EXC_007",
            ExcitationError::Synthesis { .. } => "EXC_008",
            ExcitationError::Io(_) => "EXC_009",
        }
    }

    /// Error category.
    pub fn category(&self) -> &'static str {
        "excitation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_error_reports_sample() {
        let err = ExcitationError::IndexOutOfRange {
            index: 90,
            len: 80,
            sample_index: None,
        }
        .at_sample(1234);
        let msg = err.to_string();
        assert!(msg.contains("90"));
        assert!(msg.contains("80 entries"));
        assert!(msg.contains("at sample 1234"));
    }

    #[test]
    fn test_index_error_without_sample() {
        let err = ExcitationError::IndexOutOfRange {
            index: -1,
            len: 80,
            sample_index: None,
        };
        assert!(!err.to_string().contains("at sample"));
    }

    #[test]
    fn test_cutoff_error_reports_sample() {
        let err = ExcitationError::InvalidCutoff {
            cutoff_hz: 8085.0,
            sample_rate_hz: 16000.0,
            sample_index: None,
        }
        .at_sample(321);
        assert!(err.to_string().ends_with("at sample 321"));
    }

    #[test]
    fn test_at_sample_leaves_other_errors_alone() {
        let err = ExcitationError::SilentBuffer { len: 4 }.at_sample(7);
        assert!(matches!(err, ExcitationError::SilentBuffer { len: 4 }));
    }

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            ExcitationError::corrupt("x", "y"),
            ExcitationError::IndexOutOfRange {
                index: 0,
                len: 0,
                sample_index: None,
            },
            ExcitationError::InvalidCutoff {
                cutoff_hz: 0.0,
                sample_rate_hz: 16000.0,
                sample_index: None,
            },
            ExcitationError::UnsupportedEnvelope { name: "x".into() },
            ExcitationError::SilentBuffer { len: 0 },
            ExcitationError::invalid_contour("x"),
            ExcitationError::invalid_param("x", "y"),
            ExcitationError::synthesis("x"),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_invalid_param_helper() {
        let err = ExcitationError::invalid_param("frame_shift", "must be positive");
        assert!(err.to_string().contains("frame_shift"));
        assert!(err.to_string().contains("must be positive"));
    }
}
