//! Small numeric helpers shared by the voices and the output stage.
//!
//! Everything here is `#[inline]`, allocation-free and `no_std`.

use libm::expf;

/// Decibels to a linear amplitude factor, `10^(db / 20)`.
///
/// ```rust
/// use subsynth_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
/// assert!((db_to_linear(-12.0) - 0.2512).abs() < 1e-3);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    const LN10_OVER_20: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * LN10_OVER_20)
}

/// Clamp `x` into `[-ceiling, ceiling]`.
///
/// NaN becomes silence rather than propagating to the host buffer.
///
/// ```rust
/// use subsynth_core::hard_clip;
///
/// assert_eq!(hard_clip(1.7, 0.95), 0.95);
/// assert_eq!(hard_clip(-0.4, 0.95), -0.4);
/// ```
#[inline]
pub fn hard_clip(x: f32, ceiling: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(-ceiling, ceiling) }
}

/// Milliseconds to a (fractional) sample count.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * 0.001 * sample_rate
}

/// Zero out values too small to matter.
///
/// Filter integrators decay toward zero forever once a voice falls silent;
/// cutting them off at 1e-20 keeps them out of the subnormal range.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}
