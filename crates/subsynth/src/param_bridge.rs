//! Lock-free parameter bridge between control and audio contexts.
//!
//! Two halves:
//!
//! - [`SharedParams`]: one atomic f32 target per parameter. Any thread may
//!   write (through a [`SynthHandle`](crate::SynthHandle) or the engine
//!   itself); the render thread reads every target once per block. A write
//!   landing mid-block is picked up by the next block, so staleness is
//!   bounded by one block and never audible as anything but latency.
//! - [`ParamBridge`]: render-thread-owned smoothers. Targets are fed in at
//!   block boundaries, and [`ParamBridge::tick`] advances a parameter by
//!   exactly one sample.
//!
//! f32 values are stored as their bit patterns in `AtomicU32` with
//! `Release`/`Acquire` ordering. Nothing here allocates or blocks.

use std::sync::atomic::{AtomicU32, Ordering};

use subsynth_core::{SmoothedParam, db_to_linear};

use crate::params::{PARAM_COUNT, SynthParam, default_values};

/// Default per-sample smoothing coefficient.
///
/// A step settles to within 1% in about 4600 samples (≈96 ms at 48 kHz).
pub const DEFAULT_SMOOTHING: f32 = 0.001;

/// Atomic target store shared between control threads and the engine.
///
/// Values are plain parameter units (Hz, ms, dB, label index), always
/// clamped to the parameter's range before they are stored.
#[derive(Debug)]
pub struct SharedParams {
    targets: [AtomicU32; PARAM_COUNT],
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedParams {
    /// Store initialised to every parameter's default.
    pub fn new() -> Self {
        let defaults = default_values();
        Self {
            targets: core::array::from_fn(|i| AtomicU32::new(defaults[i].to_bits())),
        }
    }

    /// Clamp and store a new target. Returns the stored value.
    pub fn set(&self, param: SynthParam, value: f32) -> f32 {
        let clamped = param.clamp(value);
        self.targets[param.index()].store(clamped.to_bits(), Ordering::Release);
        clamped
    }

    /// Current target.
    pub fn get(&self, param: SynthParam) -> f32 {
        f32::from_bits(self.targets[param.index()].load(Ordering::Acquire))
    }

    /// Copy of every target, in parameter index order.
    pub fn snapshot(&self) -> [f32; PARAM_COUNT] {
        core::array::from_fn(|i| f32::from_bits(self.targets[i].load(Ordering::Acquire)))
    }
}

/// Convert a plain value into the domain the render loop smooths in.
///
/// Gain is smoothed as a linear factor so a fade is linear in amplitude;
/// everything else is smoothed in its own unit.
#[inline]
fn smoothing_domain(param: SynthParam, plain: f32) -> f32 {
    match param {
        SynthParam::MasterGain => db_to_linear(plain),
        _ => plain,
    }
}

/// Per-sample smoothers for the continuous parameters.
///
/// # Example
///
/// ```rust
/// use subsynth::{ParamBridge, SynthParam};
///
/// let mut bridge = ParamBridge::new(0.01);
/// bridge.set_target(SynthParam::FilterCutoff, 2000.0);
/// let first = bridge.tick(SynthParam::FilterCutoff);
/// assert!(first > 1000.0 && first < 2000.0);
///
/// bridge.force_to_targets();
/// assert_eq!(bridge.current(SynthParam::FilterCutoff), 2000.0);
/// ```
#[derive(Debug, Clone)]
pub struct ParamBridge {
    smoothers: [SmoothedParam; PARAM_COUNT],
}

impl Default for ParamBridge {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING)
    }
}

impl ParamBridge {
    /// Bridge with every smoother settled on its default.
    pub fn new(coefficient: f32) -> Self {
        let defaults = default_values();
        Self {
            smoothers: core::array::from_fn(|i| {
                let param = SynthParam::ALL[i];
                SmoothedParam::with_coefficient(smoothing_domain(param, defaults[i]), coefficient)
            }),
        }
    }

    /// Change the smoothing coefficient of every parameter.
    pub fn set_coefficient(&mut self, coefficient: f32) {
        for s in &mut self.smoothers {
            s.set_coefficient(coefficient);
        }
    }

    /// Smoothing coefficient in use.
    pub fn coefficient(&self) -> f32 {
        self.smoothers[0].coefficient()
    }

    /// Set a parameter's target from a plain value.
    #[inline]
    pub fn set_target(&mut self, param: SynthParam, plain: f32) {
        self.smoothers[param.index()].set_target(smoothing_domain(param, plain));
    }

    /// Advance one sample and return the smoothed value.
    ///
    /// [`SynthParam::MasterGain`] comes back as a linear factor.
    #[inline]
    pub fn tick(&mut self, param: SynthParam) -> f32 {
        self.smoothers[param.index()].advance()
    }

    /// Smoothed value without advancing.
    pub fn current(&self, param: SynthParam) -> f32 {
        self.smoothers[param.index()].get()
    }

    /// Jump every smoothed value onto its target.
    pub fn force_to_targets(&mut self) {
        for s in &mut self.smoothers {
            s.snap_to_target();
        }
    }

    /// Samples a step needs to settle within `fraction` of its size.
    pub fn settle_samples(&self, fraction: f32) -> usize {
        self.smoothers[0].settle_samples(fraction)
    }
}

/// Block-sized buffers holding one smoothed value per sample for each
/// continuous parameter.
///
/// Filled once per block by ticking the bridge, then read by every voice, so
/// each smoother advances exactly once per sample however many voices sound.
#[derive(Debug, Clone, Default)]
pub struct ParamLanes {
    mix: Vec<f32>,
    cutoff: Vec<f32>,
    resonance: Vec<f32>,
    gain: Vec<f32>,
}

/// Borrowed per-sample parameter values for one block.
#[derive(Debug, Clone, Copy)]
pub struct LaneView<'a> {
    /// Oscillator crossfade.
    pub mix: &'a [f32],
    /// Filter cutoff in Hz.
    pub cutoff: &'a [f32],
    /// Normalized filter resonance.
    pub resonance: &'a [f32],
    /// Linear output gain.
    pub gain: &'a [f32],
}

impl ParamLanes {
    /// Allocate lanes for blocks of up to `max_block` samples.
    pub fn with_capacity(max_block: usize) -> Self {
        Self {
            mix: vec![0.0; max_block],
            cutoff: vec![0.0; max_block],
            resonance: vec![0.0; max_block],
            gain: vec![0.0; max_block],
        }
    }

    /// Largest block the lanes can hold.
    pub fn capacity(&self) -> usize {
        self.mix.len()
    }

    /// Tick the bridge `len` times and return the values.
    ///
    /// `len` must not exceed [`capacity`](Self::capacity).
    pub fn fill(&mut self, bridge: &mut ParamBridge, len: usize) -> LaneView<'_> {
        let len = len.min(self.capacity());
        for i in 0..len {
            self.mix[i] = bridge.tick(SynthParam::OscMix);
            self.cutoff[i] = bridge.tick(SynthParam::FilterCutoff);
            self.resonance[i] = bridge.tick(SynthParam::FilterResonance);
            self.gain[i] = bridge.tick(SynthParam::MasterGain);
        }
        LaneView {
            mix: &self.mix[..len],
            cutoff: &self.cutoff[..len],
            resonance: &self.resonance[..len],
            gain: &self.gain[..len],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_shared_params_defaults_and_clamp() {
        let shared = SharedParams::new();
        assert_eq!(shared.get(SynthParam::FilterCutoff), 1000.0);
        assert_eq!(shared.set(SynthParam::FilterCutoff, 1.0e6), 20000.0);
        assert_eq!(shared.get(SynthParam::FilterCutoff), 20000.0);
    }

    #[test]
    fn test_shared_params_cross_thread() {
        let shared = Arc::new(SharedParams::new());
        let writer = Arc::clone(&shared);
        std::thread::spawn(move || {
            writer.set(SynthParam::Sustain, 0.25);
        })
        .join()
        .unwrap();
        assert_eq!(shared.get(SynthParam::Sustain), 0.25);
    }

    #[test]
    fn test_bridge_distance_shrinks_every_tick() {
        let mut bridge = ParamBridge::new(DEFAULT_SMOOTHING);
        bridge.set_target(SynthParam::OscMix, 1.0);
        let mut prev = (bridge.current(SynthParam::OscMix) - 1.0).abs();
        for _ in 0..1000 {
            let v = bridge.tick(SynthParam::OscMix);
            let dist = (v - 1.0).abs();
            assert!(dist < prev);
            prev = dist;
        }
    }

    #[test]
    fn test_bridge_converges_within_bound() {
        let mut bridge = ParamBridge::new(DEFAULT_SMOOTHING);
        bridge.set_target(SynthParam::FilterResonance, 1.0);
        let step = 1.0 - 0.2;
        for _ in 0..bridge.settle_samples(0.005) {
            bridge.tick(SynthParam::FilterResonance);
        }
        let dist = (bridge.current(SynthParam::FilterResonance) - 1.0).abs();
        assert!(dist < step * 0.01, "dist {dist}");
    }

    #[test]
    fn test_gain_smoothed_linear() {
        let mut bridge = ParamBridge::new(DEFAULT_SMOOTHING);
        assert!((bridge.current(SynthParam::MasterGain) - 1.0).abs() < 1e-6);
        bridge.set_target(SynthParam::MasterGain, -60.0);
        bridge.force_to_targets();
        assert!((bridge.current(SynthParam::MasterGain) - 0.001).abs() < 1e-5);
    }

    #[test]
    fn test_lanes_tick_once_per_sample() {
        let mut bridge = ParamBridge::new(0.5);
        bridge.set_target(SynthParam::OscMix, 1.0);
        let mut lanes = ParamLanes::with_capacity(4);
        let view = lanes.fill(&mut bridge, 3);
        assert_eq!(view.mix.len(), 3);
        assert!((view.mix[0] - 0.75).abs() < 1e-6);
        assert!((view.mix[1] - 0.875).abs() < 1e-6);
        assert!((view.mix[2] - 0.9375).abs() < 1e-6);
        assert_eq!(view.cutoff, &[1000.0; 3]);
    }
}
