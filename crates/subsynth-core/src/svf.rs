//! Zero-delay-feedback state-variable filter.
//!
//! One 2-pole stage (12 dB/oct) built from two trapezoidal integrators in
//! the topology-preserving form described by Zavalishin, "The Art of VA
//! Filter Design", chapter 3. Every tick produces the lowpass, bandpass and
//! highpass taps at once; [`SvfOutput`] selects which one [`Effect::process`]
//! returns.
//!
//! The coefficients are cheap to recompute, which is what lets the voices
//! retune the filter on every sample while the cutoff glides.

use core::f32::consts::PI;
use libm::tanf;

use crate::Effect;
use crate::flush_denormal;

/// Cutoff floor in Hz.
pub const MIN_CUTOFF_HZ: f32 = 20.0;
/// Cutoff ceiling in Hz. Further capped at 0.49 × sample rate.
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;

/// Smallest accepted Q.
pub const MIN_Q: f32 = 0.5;
/// Largest accepted Q.
pub const MAX_Q: f32 = 20.0;

const NYQUIST_GUARD: f32 = 0.49;

/// Tap returned by [`Effect::process`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SvfOutput {
    /// Attenuates content above the cutoff.
    #[default]
    Lowpass,
    /// Attenuates content below the cutoff.
    Highpass,
    /// Passes a band centred on the cutoff.
    Bandpass,
}

/// All three taps of one filter tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SvfTaps {
    /// Lowpass response.
    pub low: f32,
    /// Bandpass response.
    pub band: f32,
    /// Highpass response.
    pub high: f32,
}

impl SvfTaps {
    /// Pick one tap.
    #[inline]
    pub fn select(self, output: SvfOutput) -> f32 {
        match output {
            SvfOutput::Lowpass => self.low,
            SvfOutput::Highpass => self.high,
            SvfOutput::Bandpass => self.band,
        }
    }
}

/// Single 12 dB/oct filter stage.
///
/// Cutoff is held inside 20 Hz .. min(20 kHz, 0.49 × sample rate) and Q
/// inside 0.5 ..= 20, so no request can push the stage unstable. NaN falls
/// to the bottom of either range.
///
/// ```rust
/// use subsynth_core::{Effect, StateVariableFilter, SvfOutput};
///
/// let mut stage = StateVariableFilter::new(44100.0);
/// stage.set_output_type(SvfOutput::Highpass);
/// stage.set_cutoff_and_resonance(300.0, 4.0);
/// assert!(stage.process(1.0).is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct StateVariableFilter {
    s1: f32,
    s2: f32,
    g: f32,
    damping: f32,
    sample_rate: f32,
    cutoff: f32,
    q: f32,
    output: SvfOutput,
}

impl Default for StateVariableFilter {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl StateVariableFilter {
    /// Lowpass stage at 1 kHz with a Butterworth Q.
    pub fn new(sample_rate: f32) -> Self {
        let mut stage = Self {
            s1: 0.0,
            s2: 0.0,
            g: 0.0,
            damping: 0.0,
            sample_rate,
            cutoff: 1000.0,
            q: core::f32::consts::FRAC_1_SQRT_2,
            output: SvfOutput::Lowpass,
        };
        stage.retune(1000.0, stage.q);
        stage
    }

    fn retune(&mut self, freq: f32, q: f32) {
        let ceiling = (self.sample_rate * NYQUIST_GUARD).min(MAX_CUTOFF_HZ);
        let floor = MIN_CUTOFF_HZ.min(ceiling);
        self.cutoff = if freq.is_nan() { floor } else { freq.clamp(floor, ceiling) };
        self.q = if q.is_nan() { MIN_Q } else { q.clamp(MIN_Q, MAX_Q) };
        self.g = tanf(PI * self.cutoff / self.sample_rate);
        self.damping = 1.0 / self.q;
    }

    /// Move the cutoff, keeping Q.
    pub fn set_cutoff(&mut self, freq: f32) {
        self.retune(freq, self.q);
    }

    /// Retune both with a single coefficient update. This is the per-sample
    /// path the voices use.
    #[inline]
    pub fn set_cutoff_and_resonance(&mut self, freq: f32, q: f32) {
        self.retune(freq, q);
    }

    /// Effective cutoff in Hz after clamping.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Effective Q after clamping.
    pub fn resonance(&self) -> f32 {
        self.q
    }

    /// Choose the tap [`Effect::process`] returns.
    pub fn set_output_type(&mut self, output: SvfOutput) {
        self.output = output;
    }

    /// Run one sample through the stage and return every tap.
    #[inline]
    pub fn tick(&mut self, input: f32) -> SvfTaps {
        let band = (self.g * (input - self.s2) + self.s1)
            / (1.0 + self.g * (self.g + self.damping));
        let low = self.s2 + self.g * band;

        self.s1 = flush_denormal(2.0 * band - self.s1);
        self.s2 = flush_denormal(2.0 * low - self.s2);

        SvfTaps {
            low,
            band,
            high: input - self.damping * band - low,
        }
    }
}

impl Effect for StateVariableFilter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.tick(input).select(self.output)
    }

    fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.retune(self.cutoff, self.q);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(stage: &mut StateVariableFilter, input: f32, n: usize) -> f32 {
        (0..n).fold(0.0, |_, _| stage.process(input))
    }

    fn tone_rms(stage: &mut StateVariableFilter, hz: f32) -> f32 {
        let step = core::f32::consts::TAU * hz / 48000.0;
        for i in 0..4000 {
            stage.process(libm::sinf(i as f32 * step));
        }
        let sum: f32 = (4000..6000)
            .map(|i| stage.process(libm::sinf(i as f32 * step)))
            .map(|y| y * y)
            .sum();
        libm::sqrtf(sum / 2000.0)
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut stage = StateVariableFilter::new(48000.0);
        let out = settle(&mut stage, 1.0, 1000);
        assert!((out - 1.0).abs() < 0.05, "got {out}");
    }

    #[test]
    fn highpass_rejects_dc() {
        let mut stage = StateVariableFilter::new(48000.0);
        stage.set_output_type(SvfOutput::Highpass);
        let out = settle(&mut stage, 1.0, 1000);
        assert!(out.abs() < 0.1, "got {out}");
    }

    #[test]
    fn bandpass_favours_cutoff() {
        let mut stage = StateVariableFilter::new(48000.0);
        stage.set_output_type(SvfOutput::Bandpass);
        let mut copy = stage.clone();
        let centre = tone_rms(&mut stage, 1000.0);
        let off = tone_rms(&mut copy, 8000.0);
        assert!(centre > off * 2.0, "centre={centre}, off={off}");
    }

    #[test]
    fn taps_sum_back_to_input() {
        // high + damping * band + low == input for the ZDF topology.
        let mut stage = StateVariableFilter::new(48000.0);
        stage.set_cutoff_and_resonance(2500.0, 3.0);
        for i in 0..200 {
            let x = libm::sinf(i as f32 * 0.3);
            let t = stage.tick(x);
            let rebuilt = t.high + t.band / 3.0 + t.low;
            assert!((rebuilt - x).abs() < 1e-4);
        }
    }

    #[test]
    fn reset_clears_integrators() {
        let mut stage = StateVariableFilter::new(48000.0);
        settle(&mut stage, 1.0, 100);
        stage.reset();
        assert_eq!((stage.s1, stage.s2), (0.0, 0.0));
    }

    #[test]
    fn cutoff_and_q_are_clamped() {
        let mut stage = StateVariableFilter::new(48000.0);
        stage.set_cutoff_and_resonance(5.0, 0.0);
        assert_eq!((stage.cutoff(), stage.resonance()), (MIN_CUTOFF_HZ, MIN_Q));
        stage.set_cutoff_and_resonance(30_000.0, 100.0);
        assert_eq!((stage.cutoff(), stage.resonance()), (MAX_CUTOFF_HZ, MAX_Q));
        stage.set_cutoff_and_resonance(f32::NAN, f32::NAN);
        assert_eq!((stage.cutoff(), stage.resonance()), (MIN_CUTOFF_HZ, MIN_Q));
    }

    #[test]
    fn low_sample_rate_caps_below_nyquist() {
        let mut stage = StateVariableFilter::new(22050.0);
        stage.set_cutoff(20_000.0);
        assert!((stage.cutoff() - 22050.0 * NYQUIST_GUARD).abs() < 1e-3);
        assert!(stage.g.is_finite());
    }

    #[test]
    fn sample_rate_change_reclamps_cutoff() {
        let mut stage = StateVariableFilter::new(48000.0);
        stage.set_cutoff(15_000.0);
        stage.set_sample_rate(22050.0);
        assert!(stage.cutoff() < 11025.0);
    }

    #[test]
    fn sweeping_every_sample_stays_finite() {
        let mut stage = StateVariableFilter::new(48000.0);
        for i in 0..4800 {
            let hz = 20.0 + (i as f32 / 4800.0) * 19_980.0;
            stage.set_cutoff_and_resonance(hz, 10.0);
            assert!(stage.process(libm::sinf(i as f32 * 0.05)).is_finite(), "sample {i}");
        }
    }
}
