//! Block-level DSP helper functions.

/// Multiply every sample in `block` by `gain`.
#[inline]
pub fn scale(block: &mut [f32], gain: f32) {
    for sample in block.iter_mut() {
        *sample *= gain;
    }
}

/// Add `src * gain` into `dst` sample-by-sample.
///
/// Only the overlapping prefix of the two slices is touched.
#[inline]
pub fn accumulate_scaled(dst: &mut [f32], src: &[f32], gain: f32) {
    if gain == 1.0 {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d += s;
        }
    } else {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d += s * gain;
        }
    }
}

/// Multiply `dst` by `src` sample-by-sample (ring modulation, VCA).
#[inline]
pub fn multiply(dst: &mut [f32], src: &[f32]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d *= s;
    }
}

/// Largest absolute sample value, 0.0 for an empty block.
pub fn peak_abs(block: &[f32]) -> f32 {
    block.iter().fold(0.0f32, |peak, &s| peak.max(libm::fabsf(s)))
}

/// Sum of squared samples, accumulated in `f64` to keep long windows exact.
pub fn sum_squares(block: &[f32]) -> f64 {
    block.iter().map(|&s| f64::from(s) * f64::from(s)).sum()
}
