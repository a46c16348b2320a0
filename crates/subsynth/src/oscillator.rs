//! Band-limited additive oscillators.
//!
//! Each non-sine waveform is a finite harmonic sum (at most
//! [`MAX_HARMONICS`] partials, never above Nyquist), so a voice never produces
//! the hard discontinuities of a naive ramp or pulse.
//!
//! # Evaluation
//!
//! Partials are generated with the Chebyshev recurrence
//!
//! ```text
//! sin((n+1)x) = 2 cos(x) sin(nx) - sin((n-1)x)
//! ```
//!
//! so a sample costs one `sincos` plus a multiply-add per partial.
//!
//! # Overshoot
//!
//! Truncated Fourier series ring at the discontinuities of saw and square
//! (about 18% for square). Those two waveforms are tapered with Lanczos
//! σ-factors `sinc(n / (top + 1))`, which keeps every waveform within
//! ±1.05 at any harmonic count. Triangle converges fast enough (`1/n²`) to be
//! summed untapered.

use core::f32::consts::{PI, TAU};
use libm::{floorf, sincosf, sinf};

/// Upper bound on the number of partials summed per sample.
pub const MAX_HARMONICS: usize = 30;

/// Oscillator waveform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Waveform {
    /// Pure fundamental.
    Sine,
    /// All harmonics at `1/n`, bright.
    #[default]
    Saw,
    /// Odd harmonics at `1/n`, hollow.
    Square,
    /// Odd harmonics at `1/n²` with alternating sign, soft.
    Triangle,
}

impl Waveform {
    /// Display names, indexed by [`Waveform::index`].
    pub const LABELS: &'static [&'static str] = &["Sine", "Saw", "Square", "Triangle"];

    /// All waveforms in parameter order.
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Saw,
        Waveform::Square,
        Waveform::Triangle,
    ];

    /// Position of this waveform in the parameter's value list.
    pub const fn index(self) -> usize {
        match self {
            Waveform::Sine => 0,
            Waveform::Saw => 1,
            Waveform::Square => 2,
            Waveform::Triangle => 3,
        }
    }

    /// Waveform for a (rounded, clamped) parameter value.
    pub fn from_value(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        let idx = libm::roundf(value.clamp(0.0, 3.0)) as usize;
        Self::ALL[idx.min(3)]
    }

    /// Display name.
    pub fn label(self) -> &'static str {
        Self::LABELS[self.index()]
    }
}

/// Lanczos σ-factor for harmonic `n` of a series whose top partial is `top`.
fn sigma(n: usize, top: usize) -> f32 {
    let x = PI * n as f32 / (top + 1) as f32;
    sinf(x) / x
}

/// Per-partial gains for `waveform` limited to partials `1..=limit`.
///
/// Entry `i` is the gain of harmonic `i + 1`. Entries past the limit are 0.
fn harmonic_gains(waveform: Waveform, limit: usize) -> [f32; MAX_HARMONICS] {
    let mut gains = [0.0; MAX_HARMONICS];
    let limit = limit.clamp(1, MAX_HARMONICS);
    match waveform {
        Waveform::Sine => gains[0] = 1.0,
        Waveform::Saw => {
            for n in 1..=limit {
                gains[n - 1] = (2.0 / PI) * sigma(n, limit) / n as f32;
            }
        }
        Waveform::Square => {
            let top = if limit % 2 == 1 { limit } else { limit - 1 };
            for n in (1..=top).step_by(2) {
                gains[n - 1] = (4.0 / PI) * sigma(n, top) / n as f32;
            }
        }
        Waveform::Triangle => {
            for n in (1..=limit).step_by(2) {
                let sign = if (n / 2) % 2 == 0 { 1.0 } else { -1.0 };
                gains[n - 1] = sign * (8.0 / (PI * PI)) / (n * n) as f32;
            }
        }
    }
    gains
}

/// Additive oscillator with phase in radians.
///
/// # Example
///
/// ```rust
/// use subsynth::{Oscillator, Waveform};
///
/// let mut osc = Oscillator::new(48000.0);
/// osc.set_waveform(Waveform::Square);
/// osc.set_frequency(261.63);
///
/// for _ in 0..480 {
///     let s = osc.next_sample();
///     assert!(s.abs() <= 1.05);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator {
    /// Current phase in `[0, 2π)`
    phase: f32,
    /// Phase increment per sample in radians
    phase_inc: f32,
    sample_rate: f32,
    frequency: f32,
    waveform: Waveform,
    /// Number of partials below Nyquist, at most `MAX_HARMONICS`
    partials: usize,
    gains: [f32; MAX_HARMONICS],
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Oscillator {
    /// Create a saw oscillator at 440 Hz.
    pub fn new(sample_rate: f32) -> Self {
        let mut osc = Self {
            phase: 0.0,
            phase_inc: 0.0,
            sample_rate,
            frequency: 440.0,
            waveform: Waveform::default(),
            partials: MAX_HARMONICS,
            gains: [0.0; MAX_HARMONICS],
        };
        osc.recalculate();
        osc
    }

    /// Set frequency in Hz, clamped to `[0, sample_rate / 2]`.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        let nyquist = self.sample_rate * 0.5;
        self.frequency = if freq_hz.is_nan() {
            0.0
        } else {
            freq_hz.clamp(0.0, nyquist)
        };
        self.recalculate();
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Select the waveform. Takes effect on the next sample.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        if waveform != self.waveform {
            self.waveform = waveform;
            self.recalculate();
        }
    }

    /// Current waveform.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Set sample rate; keeps the frequency in Hz.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.set_frequency(self.frequency);
    }

    /// Reset phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Current phase in radians, always in `[0, 2π)`.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Number of partials currently summed.
    pub fn partials(&self) -> usize {
        match self.waveform {
            Waveform::Sine => 1,
            _ => self.partials,
        }
    }

    fn recalculate(&mut self) {
        self.phase_inc = TAU * self.frequency / self.sample_rate;
        let below_nyquist = if self.frequency > 0.0 {
            floorf(self.sample_rate * 0.5 / self.frequency) as usize
        } else {
            MAX_HARMONICS
        };
        self.partials = below_nyquist.clamp(1, MAX_HARMONICS);
        self.gains = harmonic_gains(self.waveform, self.partials);
    }

    /// Generate the sample at the current phase, then advance.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let (s1, c1) = sincosf(self.phase);
        let out = if self.waveform == Waveform::Sine {
            s1
        } else {
            let two_cos = 2.0 * c1;
            let mut prev = 0.0;
            let mut cur = s1;
            let mut acc = 0.0;
            for &gain in &self.gains[..self.partials] {
                acc += gain * cur;
                let next = two_cos * cur - prev;
                prev = cur;
                cur = next;
            }
            acc
        };

        self.phase += self.phase_inc;
        if self.phase >= TAU {
            self.phase -= TAU;
            if self.phase >= TAU {
                self.phase = 0.0;
            }
        }
        out
    }
}
