//! Parameter handling with smoothing for zipper-free changes.
//!
//! Audio parameters (gain, cutoff, mix) need smooth transitions to avoid
//! audible "zipper noise" when the host moves them. [`SmoothedParam`] is a
//! one-pole exponential smoother with a fixed per-sample coefficient:
//!
//! ```text
//! y[n] = y[n-1] + k * (target - y[n-1])
//! ```
//!
//! The distance to the target shrinks by the factor `(1 - k)` every sample,
//! so after `n` samples a step has decayed to `(1 - k)^n` of its size.
//! [`SmoothedParam::settle_samples`] inverts that relation.
//!
//! ## Usage
//!
//! ```rust
//! use subsynth_core::SmoothedParam;
//!
//! let mut gain = SmoothedParam::with_coefficient(1.0, 0.01);
//!
//! // Set new target - smoothing happens automatically
//! gain.set_target(0.5);
//!
//! // In audio callback, get smoothed value each sample
//! for _ in 0..1000 {
//!     let smoothed_gain = gain.advance();
//!     // Use smoothed_gain for processing...
//! }
//! assert!((gain.get() - 0.5).abs() < 1e-3);
//! ```

use libm::{ceilf, logf};

/// A parameter with built-in smoothing for zipper-free changes.
///
/// The smoothed value only moves through [`advance`](Self::advance) (once per
/// sample) and only jumps through [`snap_to_target`](Self::snap_to_target).
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    /// Current smoothed value
    current: f32,
    /// Target value we're smoothing towards
    target: f32,
    /// Fraction of the remaining distance covered per sample (1 = instant)
    coeff: f32,
}

impl SmoothedParam {
    /// Create a new smoothed parameter with initial value.
    ///
    /// Smoothing is disabled (coefficient 1.0, instant changes) until
    /// [`set_coefficient`](Self::set_coefficient) is called.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
        }
    }

    /// Create a smoothed parameter with the given per-sample coefficient.
    ///
    /// The coefficient is clamped to `(0, 1]`; see
    /// [`set_coefficient`](Self::set_coefficient).
    pub fn with_coefficient(initial: f32, coeff: f32) -> Self {
        let mut param = Self::new(initial);
        param.set_coefficient(coeff);
        param
    }

    /// Set the per-sample smoothing coefficient.
    ///
    /// Range: `1e-6` to `1.0`. Values are clamped; a non-finite value
    /// disables smoothing.
    pub fn set_coefficient(&mut self, coeff: f32) {
        self.coeff = if coeff.is_finite() {
            coeff.clamp(1e-6, 1.0)
        } else {
            1.0
        };
    }

    /// Get the per-sample smoothing coefficient.
    #[inline]
    pub fn coefficient(&self) -> f32 {
        self.coeff
    }

    /// Set the target value (parameter will smooth towards this).
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Get the next smoothed value (advances by one sample).
    ///
    /// Call this exactly once per sample in the audio processing loop.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Get the current smoothed value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Get the target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Skip ahead to the target value immediately.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    /// Number of samples after which a step change has decayed below
    /// `fraction` of its initial size.
    ///
    /// Solves `(1 - k)^n < fraction` for `n`. Returns 1 when smoothing is
    /// disabled (`k = 1`) or `fraction` is not in `(0, 1)`.
    pub fn settle_samples(&self, fraction: f32) -> usize {
        if self.coeff >= 1.0 || fraction <= 0.0 || fraction >= 1.0 {
            return 1;
        }
        let n = logf(fraction) / logf(1.0 - self.coeff);
        ceilf(n) as usize + 1
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}
