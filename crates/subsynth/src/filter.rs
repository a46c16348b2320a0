//! Multi-mode resonant voice filter.
//!
//! Three responses (lowpass, highpass, bandpass) at two slopes. The 12 dB/oct
//! modes run one [`StateVariableFilter`] stage; the 24 dB/oct modes cascade
//! two stages tuned to the same cutoff, each receiving half the Q so the
//! combined peak stays controlled.
//!
//! Resonance is a normalized `[0, 1]` control mapped onto Q:
//!
//! ```text
//! Q = 0.707 + resonance × (MAX_RESONANCE_Q − 0.707)
//! ```
//!
//! Cutoff and resonance are clamped before they reach the difference
//! equation, which is what keeps the top of the resonance range stable.

use subsynth_core::{Effect, StateVariableFilter, SvfOutput};

/// Q reached at resonance 1.0.
pub const MAX_RESONANCE_Q: f32 = 10.0;

/// Q at resonance 0.0 (Butterworth).
pub const MIN_RESONANCE_Q: f32 = core::f32::consts::FRAC_1_SQRT_2;

/// Filter response and slope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Lowpass, 12 dB/oct.
    Lpf12,
    /// Highpass, 12 dB/oct.
    Hpf12,
    /// Bandpass, 12 dB/oct.
    Bpf12,
    /// Lowpass, 24 dB/oct.
    #[default]
    Lpf24,
    /// Highpass, 24 dB/oct.
    Hpf24,
    /// Bandpass, 24 dB/oct.
    Bpf24,
}

impl FilterMode {
    /// Display names, indexed by [`FilterMode::index`].
    pub const LABELS: &'static [&'static str] =
        &["LPF12", "HPF12", "BPF12", "LPF24", "HPF24", "BPF24"];

    /// All modes in parameter order.
    pub const ALL: [FilterMode; 6] = [
        FilterMode::Lpf12,
        FilterMode::Hpf12,
        FilterMode::Bpf12,
        FilterMode::Lpf24,
        FilterMode::Hpf24,
        FilterMode::Bpf24,
    ];

    /// Position in the parameter's value list.
    pub const fn index(self) -> usize {
        match self {
            FilterMode::Lpf12 => 0,
            FilterMode::Hpf12 => 1,
            FilterMode::Bpf12 => 2,
            FilterMode::Lpf24 => 3,
            FilterMode::Hpf24 => 4,
            FilterMode::Bpf24 => 5,
        }
    }

    /// Mode for a (rounded, clamped) parameter value.
    pub fn from_value(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        let idx = libm::roundf(value.clamp(0.0, 5.0)) as usize;
        Self::ALL[idx.min(5)]
    }

    /// Display name.
    pub fn label(self) -> &'static str {
        Self::LABELS[self.index()]
    }

    /// Response type of each stage.
    pub const fn response(self) -> SvfOutput {
        match self {
            FilterMode::Lpf12 | FilterMode::Lpf24 => SvfOutput::Lowpass,
            FilterMode::Hpf12 | FilterMode::Hpf24 => SvfOutput::Highpass,
            FilterMode::Bpf12 | FilterMode::Bpf24 => SvfOutput::Bandpass,
        }
    }

    /// Whether this mode cascades two stages.
    pub const fn is_four_pole(self) -> bool {
        matches!(
            self,
            FilterMode::Lpf24 | FilterMode::Hpf24 | FilterMode::Bpf24
        )
    }
}

/// Map normalized resonance to Q.
#[inline]
pub fn resonance_to_q(resonance: f32) -> f32 {
    let r = if resonance.is_nan() {
        0.0
    } else {
        resonance.clamp(0.0, 1.0)
    };
    MIN_RESONANCE_Q + r * (MAX_RESONANCE_Q - MIN_RESONANCE_Q)
}

/// Two-stage multi-mode filter owned by each voice.
///
/// # Example
///
/// ```rust
/// use subsynth::{FilterMode, ResonantFilter};
/// use subsynth::Effect;
///
/// let mut filter = ResonantFilter::new(48000.0);
/// filter.set_mode(FilterMode::Hpf12);
/// filter.set_cutoff_and_resonance(500.0, 0.3);
/// let y = filter.process(0.25);
/// assert!(y.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct ResonantFilter {
    stage1: StateVariableFilter,
    stage2: StateVariableFilter,
    mode: FilterMode,
    cutoff: f32,
    resonance: f32,
}

impl Default for ResonantFilter {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl ResonantFilter {
    /// Create an LPF24 filter at 1 kHz, resonance 0.2.
    pub fn new(sample_rate: f32) -> Self {
        let mut filter = Self {
            stage1: StateVariableFilter::new(sample_rate),
            stage2: StateVariableFilter::new(sample_rate),
            mode: FilterMode::default(),
            cutoff: 1000.0,
            resonance: 0.2,
        };
        filter.set_mode(FilterMode::default());
        filter.update();
        filter
    }

    /// Select response and slope. Stage memory is kept.
    pub fn set_mode(&mut self, mode: FilterMode) {
        let changed_slope = mode.is_four_pole() != self.mode.is_four_pole();
        self.mode = mode;
        self.stage1.set_output_type(mode.response());
        self.stage2.set_output_type(mode.response());
        if changed_slope {
            self.update();
        }
    }

    /// Current mode.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Cutoff in Hz as last requested (each stage clamps it further).
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Normalized resonance in `[0, 1]`.
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// Set cutoff (Hz) and normalized resonance.
    ///
    /// Coefficients are only recomputed when a value actually changes, so a
    /// settled parameter costs nothing per sample.
    #[inline]
    pub fn set_cutoff_and_resonance(&mut self, cutoff: f32, resonance: f32) {
        let resonance = if resonance.is_nan() {
            0.0
        } else {
            resonance.clamp(0.0, 1.0)
        };
        if cutoff != self.cutoff || resonance != self.resonance {
            self.cutoff = cutoff;
            self.resonance = resonance;
            self.update();
        }
    }

    fn update(&mut self) {
        let q = resonance_to_q(self.resonance);
        if self.mode.is_four_pole() {
            let stage_q = q * 0.5;
            self.stage1.set_cutoff_and_resonance(self.cutoff, stage_q);
            self.stage2.set_cutoff_and_resonance(self.cutoff, stage_q);
        } else {
            self.stage1.set_cutoff_and_resonance(self.cutoff, q);
        }
    }
}

impl Effect for ResonantFilter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let mid = self.stage1.process(input);
        if self.mode.is_four_pole() {
            self.stage2.process(mid)
        } else {
            mid
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.stage1.set_sample_rate(sample_rate);
        self.stage2.set_sample_rate(sample_rate);
        self.update();
    }

    fn reset(&mut self) {
        self.stage1.reset();
        self.stage2.reset();
    }
}
