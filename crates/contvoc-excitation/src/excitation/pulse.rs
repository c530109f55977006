//! Pulse detection: impulse train in, typed pulse events out.

use tracing::{trace, warn};

use crate::codebook::ResidualCodebook;
use crate::config::ExcitationConfig;
use crate::contour::MvfContour;
use crate::error::{ExcitationError, ExcitationResult};

/// One glottal pulse and everything needed to render it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseEvent {
    /// Position of the pulse in the output buffer.
    pub sample_index: usize,
    /// Analysis frame containing the pulse.
    pub frame_index: usize,
    /// MVF of that frame after clamping.
    pub mvf_hz: f64,
    /// Voiced shape for this pulse. Not range-checked until rendering.
    pub codebook_index: i64,
}

/// Scans `train` for pulses and resolves MVF and codebook index for each.
///
/// Events come out in increasing `sample_index` order.
pub fn detect_pulses(
    train: &[f64],
    mvf: &MvfContour,
    config: &ExcitationConfig,
) -> ExcitationResult<Vec<PulseEvent>> {
    let mut events = Vec::new();
    let mut clamped = 0usize;

    for (sample_index, &value) in train.iter().enumerate() {
        if value <= config.pulse_threshold {
            continue;
        }

        let frame_index = sample_index / config.frame_shift;
        let raw_mvf = mvf.get(frame_index).ok_or_else(|| {
            ExcitationError::invalid_contour(format!(
                "pulse at sample {} falls in frame {} but the mvf contour has {} frames",
                sample_index,
                frame_index,
                mvf.len()
            ))
        })?;
        let mvf_hz = config.clamp_mvf(raw_mvf);
        if mvf_hz < raw_mvf {
            clamped += 1;
        }

        let codebook_index = ResidualCodebook::index_for_mvf(mvf_hz, config);
        trace!(sample_index, frame_index, mvf_hz, codebook_index, "pulse");
        events.push(PulseEvent {
            sample_index,
            frame_index,
            mvf_hz,
            codebook_index,
        });
    }

    if clamped > 0 {
        warn!(
            clamped,
            ceiling_hz = config.mvf_ceiling_hz,
            "clamped mvf at pulse positions"
        );
    }
    Ok(events)
}
