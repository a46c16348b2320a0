//! ADSR envelope generator.
//!
//! Linear attack-decay-sustain-release ramps. Every phase moves the level at
//! a constant per-sample rate derived from its configured duration:
//!
//! | Phase   | Target  | Rate per sample                     |
//! |---------|---------|-------------------------------------|
//! | Attack  | 1.0     | `1 / attack_samples`                |
//! | Decay   | sustain | `(1 - sustain) / decay_samples`     |
//! | Release | 0.0     | `level_at_note_off / release_samples` |
//!
//! Attack is a full-scale slope, so a re-attack from a non-zero level is
//! proportionally shorter. Release is computed from the level at note-off, so
//! a release always takes the configured time regardless of where it starts.

use subsynth_core::ms_to_samples;

/// Shortest accepted attack time.
pub const MIN_ATTACK_MS: f32 = 5.0;
/// Shortest accepted decay time.
pub const MIN_DECAY_MS: f32 = 10.0;
/// Shortest accepted release time.
pub const MIN_RELEASE_MS: f32 = 10.0;

/// ADSR envelope states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Envelope is inactive. Output is zero.
    #[default]
    Idle,
    /// Output ramps up toward 1.0.
    Attack,
    /// Output falls from 1.0 toward the sustain level.
    Decay,
    /// Output holds at the sustain level until note-off.
    Sustain,
    /// Output falls to zero.
    Release,
}

/// Linear ADSR envelope generator.
///
/// # Example
///
/// ```rust
/// use subsynth::{AdsrEnvelope, EnvelopeState};
///
/// let mut env = AdsrEnvelope::new(48000.0);
/// env.set_attack_ms(10.0);
/// env.set_decay_ms(100.0);
/// env.set_sustain(0.7);
/// env.set_release_ms(200.0);
///
/// env.note_on();
/// for _ in 0..48_000 {
///     env.advance();
/// }
/// assert_eq!(env.state(), EnvelopeState::Sustain);
///
/// env.note_off(true);
/// assert_eq!(env.state(), EnvelopeState::Release);
/// ```
#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    state: EnvelopeState,
    level: f32,
    sample_rate: f32,
    /// Samples spent in the current phase
    time_in_phase: u64,

    attack_ms: f32,
    decay_ms: f32,
    release_ms: f32,
    sustain: f32,

    attack_rate: f32,
    decay_rate: f32,
    release_rate: f32,
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl AdsrEnvelope {
    /// Create an idle envelope.
    ///
    /// Defaults: attack 100 ms, decay 250 ms, sustain 0.8, release 300 ms.
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            state: EnvelopeState::Idle,
            level: 0.0,
            sample_rate,
            time_in_phase: 0,
            attack_ms: 100.0,
            decay_ms: 250.0,
            release_ms: 300.0,
            sustain: 0.8,
            attack_rate: 0.0,
            decay_rate: 0.0,
            release_rate: 0.0,
        };
        env.recalculate_slopes();
        env
    }

    /// Set attack time in milliseconds (minimum 5 ms).
    pub fn set_attack_ms(&mut self, ms: f32) {
        self.attack_ms = clamp_time(ms, MIN_ATTACK_MS);
        self.recalculate_slopes();
    }

    /// Attack time in milliseconds.
    pub fn attack_ms(&self) -> f32 {
        self.attack_ms
    }

    /// Set decay time in milliseconds (minimum 10 ms).
    pub fn set_decay_ms(&mut self, ms: f32) {
        self.decay_ms = clamp_time(ms, MIN_DECAY_MS);
        self.recalculate_slopes();
    }

    /// Decay time in milliseconds.
    pub fn decay_ms(&self) -> f32 {
        self.decay_ms
    }

    /// Set sustain level, clamped to `[0, 1]`.
    pub fn set_sustain(&mut self, level: f32) {
        self.sustain = if level.is_nan() {
            0.0
        } else {
            level.clamp(0.0, 1.0)
        };
        self.recalculate_slopes();
    }

    /// Sustain level.
    pub fn sustain(&self) -> f32 {
        self.sustain
    }

    /// Set release time in milliseconds (minimum 10 ms).
    ///
    /// A release already in progress is re-planned from its current level
    /// over the new time. Writing the current value changes nothing.
    pub fn set_release_ms(&mut self, ms: f32) {
        let ms = clamp_time(ms, MIN_RELEASE_MS);
        if ms == self.release_ms {
            return;
        }
        self.release_ms = ms;
        self.replan_release();
    }

    /// Release time in milliseconds.
    pub fn release_ms(&self) -> f32 {
        self.release_ms
    }

    /// Set sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_slopes();
        self.replan_release();
    }

    /// Enter Attack from the current level.
    ///
    /// The level is not reset, so retriggering a sounding envelope produces
    /// a continuous re-attack. Call [`reset`](Self::reset) first for a hard
    /// retrigger.
    pub fn note_on(&mut self) {
        self.state = EnvelopeState::Attack;
        self.time_in_phase = 0;
    }

    /// Release the envelope.
    ///
    /// With `allow_tail_off`, the envelope ramps from its current level to 0
    /// over the release time. Without it the level drops to 0 and the
    /// envelope is Idle immediately.
    pub fn note_off(&mut self, allow_tail_off: bool) {
        if !allow_tail_off {
            self.reset();
            return;
        }
        if self.state == EnvelopeState::Idle {
            return;
        }
        if self.level <= 0.0 {
            self.reset();
            return;
        }
        self.state = EnvelopeState::Release;
        self.time_in_phase = 0;
        self.release_rate = self.level / self.release_samples();
    }

    /// Force the envelope to Idle with zero output.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
        self.time_in_phase = 0;
    }

    /// Current state.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Current level without advancing.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Samples spent in the current phase.
    pub fn time_in_phase(&self) -> u64 {
        self.time_in_phase
    }

    /// `false` only when Idle.
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    /// Advance by one sample and return the new level.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.time_in_phase += 1;
        match self.state {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.level += self.attack_rate;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.enter(EnvelopeState::Decay);
                }
            }

            EnvelopeState::Decay => {
                self.level -= self.decay_rate;
                if self.level <= self.sustain {
                    self.level = self.sustain;
                    self.enter(EnvelopeState::Sustain);
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.sustain;
            }

            EnvelopeState::Release => {
                self.level -= self.release_rate;
                if self.level <= 0.0 {
                    self.reset();
                }
            }
        }

        self.level
    }

    fn enter(&mut self, state: EnvelopeState) {
        self.state = state;
        self.time_in_phase = 0;
    }

    fn release_samples(&self) -> f32 {
        ms_to_samples(self.release_ms, self.sample_rate).max(1.0)
    }

    /// Attack and decay slopes only. The release slope is fixed at
    /// note-off and only [`replan_release`](Self::replan_release) touches it.
    fn recalculate_slopes(&mut self) {
        let attack = ms_to_samples(self.attack_ms, self.sample_rate).max(1.0);
        let decay = ms_to_samples(self.decay_ms, self.sample_rate).max(1.0);
        self.attack_rate = 1.0 / attack;
        self.decay_rate = (1.0 - self.sustain) / decay;
    }

    fn replan_release(&mut self) {
        if self.state == EnvelopeState::Release {
            self.release_rate = self.level / self.release_samples();
        }
    }
}

fn clamp_time(ms: f32, min: f32) -> f32 {
    if ms.is_nan() { min } else { ms.max(min) }
}
