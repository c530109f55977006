//! Tapering windows.

use std::f64::consts::PI;

/// Symmetric Hann window value at index `i` of a window of `size` points.
///
/// Zero at both ends; a single-point window is `[1.0]`.
#[inline]
pub fn hann(i: usize, size: usize) -> f64 {
    if size <= 1 {
        return 1.0;
    }
    0.5 - 0.5 * (2.0 * PI * i as f64 / (size - 1) as f64).cos()
}

/// Multiplies `frame` by a symmetric Hann window of its own length.
pub fn apply_hann(frame: &mut [f64]) {
    let size = frame.len();
    for (i, sample) in frame.iter_mut().enumerate() {
        *sample *= hann(i, size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_endpoints_and_peak() {
        assert!(hann(0, 9).abs() < 1e-15);
        assert!(hann(8, 9).abs() < 1e-15);
        assert!((hann(4, 9) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_hann_symmetric() {
        for i in 0..10 {
            assert!((hann(i, 10) - hann(9 - i, 10)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_degenerate_sizes() {
        assert_eq!(hann(0, 1), 1.0);
        let mut empty: [f64; 0] = [];
        apply_hann(&mut empty);
    }

    #[test]
    fn test_apply_hann() {
        let mut frame = vec![2.0; 5];
        apply_hann(&mut frame);
        assert_eq!(frame[0], 0.0);
        assert!((frame[2] - 2.0).abs() < 1e-12);
    }
}
