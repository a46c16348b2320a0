//! Voices and the fixed-size voice pool.
//!
//! A [`Voice`] is one monophonic signal path:
//!
//! ```text
//! osc1 ─┐
//!       ├─ crossfade(mix) × velocity ─ filter ─ × envelope ─ × gain ─► scratch
//! osc2 ─┘
//! ```
//!
//! [`VoiceManager`] owns a homogeneous array of voices, maps note events onto
//! them and sums their scratch buffers into the block mix.
//!
//! ## Allocation
//!
//! On note-on, in order:
//!
//! 1. A voice already sounding the same note is re-attacked from its current
//!    level (at most one voice per note).
//! 2. Otherwise the lowest-index free voice takes the note.
//! 3. Otherwise a voice is stolen: the releasing voice with the lowest
//!    envelope level, or voice 0 when none is releasing. A stolen voice is
//!    hard-retriggered (envelope, oscillators and filter reset).

use subsynth_core::Effect;

use crate::envelope::{AdsrEnvelope, EnvelopeState};
use crate::filter::{FilterMode, ResonantFilter};
use crate::mixdown::accumulate;
use crate::oscillator::{Oscillator, Waveform};
use crate::param_bridge::LaneView;

/// Default pool size.
pub const DEFAULT_POLYPHONY: usize = 8;

/// Envelope times and sustain level shared by every voice in a pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrSettings {
    /// Attack time in ms.
    pub attack_ms: f32,
    /// Decay time in ms.
    pub decay_ms: f32,
    /// Sustain level, 0..1.
    pub sustain: f32,
    /// Release time in ms.
    pub release_ms: f32,
}

impl Default for AdsrSettings {
    fn default() -> Self {
        Self {
            attack_ms: 100.0,
            decay_ms: 250.0,
            sustain: 0.8,
            release_ms: 300.0,
        }
    }
}

impl AdsrSettings {
    fn apply_to(&self, env: &mut AdsrEnvelope) {
        env.set_attack_ms(self.attack_ms);
        env.set_decay_ms(self.decay_ms);
        env.set_sustain(self.sustain);
        env.set_release_ms(self.release_ms);
    }
}

/// One synthesizer voice.
///
/// Created once with the pool and reused across notes. Renders into its own
/// scratch buffer, sized in [`prepare`](Self::prepare).
#[derive(Debug, Clone)]
pub struct Voice {
    osc1: Oscillator,
    osc2: Oscillator,
    filter: ResonantFilter,
    envelope: AdsrEnvelope,
    filter_enabled: bool,
    note: u8,
    /// Velocity-derived level, 0..1
    level: f32,
    /// In the set of voices the pool renders
    active: bool,
    scratch: Vec<f32>,
}

impl Default for Voice {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Voice {
    /// Idle voice with default settings and no scratch space.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            osc1: Oscillator::new(sample_rate),
            osc2: Oscillator::new(sample_rate),
            filter: ResonantFilter::new(sample_rate),
            envelope: AdsrEnvelope::new(sample_rate),
            filter_enabled: true,
            note: 0,
            level: 0.0,
            active: false,
            scratch: Vec::new(),
        }
    }

    /// Set the sample rate, size the scratch buffer and return to idle.
    pub fn prepare(&mut self, sample_rate: f32, max_block: usize) {
        self.osc1.set_sample_rate(sample_rate);
        self.osc2.set_sample_rate(sample_rate);
        self.filter.set_sample_rate(sample_rate);
        self.envelope.set_sample_rate(sample_rate);
        self.scratch.clear();
        self.scratch.resize(max_block, 0.0);
        self.reset();
    }

    /// Begin a note.
    ///
    /// A fresh start (voice not sounding) or a `hard` start resets the
    /// envelope, oscillator phases and filter memory first. Otherwise the
    /// envelope re-attacks from its current level.
    pub fn start_note(&mut self, note: u8, velocity: f32, hard: bool) {
        if hard || !self.active {
            self.envelope.reset();
            self.osc1.reset();
            self.osc2.reset();
            self.filter.reset();
        }
        let freq = midi_to_freq(note);
        self.osc1.set_frequency(freq);
        self.osc2.set_frequency(freq);
        self.note = note;
        self.level = if velocity.is_nan() {
            0.0
        } else {
            velocity.clamp(0.0, 1.0)
        };
        self.envelope.note_on();
        self.active = true;
    }

    /// Release the note, either through the release ramp or immediately.
    pub fn stop_note(&mut self, allow_tail_off: bool) {
        self.envelope.note_off(allow_tail_off);
        // A release from level 0 ends at once; free the voice now.
        if !self.envelope.is_active() {
            self.active = false;
        }
    }

    /// Silence immediately and leave the rendering set.
    pub fn kill(&mut self) {
        self.envelope.reset();
        self.active = false;
    }

    /// Kill and clear oscillator and filter state.
    pub fn reset(&mut self) {
        self.kill();
        self.osc1.reset();
        self.osc2.reset();
        self.filter.reset();
    }

    /// Whether the pool renders this voice.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the envelope is in its release phase.
    pub fn is_releasing(&self) -> bool {
        self.active && self.envelope.state() == EnvelopeState::Release
    }

    /// Note currently (or last) assigned.
    pub fn note(&self) -> u8 {
        self.note
    }

    /// Velocity-derived level.
    pub fn velocity(&self) -> f32 {
        self.level
    }

    /// Oscillator frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.osc1.frequency()
    }

    /// The voice's envelope.
    pub fn envelope(&self) -> &AdsrEnvelope {
        &self.envelope
    }

    /// The voice's filter.
    pub fn filter(&self) -> &ResonantFilter {
        &self.filter
    }

    /// Select both oscillator waveforms.
    pub fn set_waveforms(&mut self, osc1: Waveform, osc2: Waveform) {
        self.osc1.set_waveform(osc1);
        self.osc2.set_waveform(osc2);
    }

    /// Select the filter mode.
    pub fn set_filter_mode(&mut self, mode: FilterMode) {
        self.filter.set_mode(mode);
    }

    /// Enable or bypass the filter.
    pub fn set_filter_enabled(&mut self, enabled: bool) {
        self.filter_enabled = enabled;
    }

    /// Apply pool-wide envelope settings.
    pub fn set_adsr(&mut self, settings: &AdsrSettings) {
        settings.apply_to(&mut self.envelope);
    }

    /// Render `lanes.mix.len()` samples into the scratch buffer and return them.
    ///
    /// Blocks longer than the scratch buffer are truncated to it.
    pub fn render(&mut self, lanes: &LaneView<'_>) -> &[f32] {
        let len = lanes.mix.len().min(self.scratch.len());
        for i in 0..len {
            let mix = lanes.mix[i];
            let mut x = self.osc1.next_sample() * (1.0 - mix) + self.osc2.next_sample() * mix;
            x *= self.level;
            if self.filter_enabled {
                self.filter
                    .set_cutoff_and_resonance(lanes.cutoff[i], lanes.resonance[i]);
                x = self.filter.process(x);
            }
            x *= self.envelope.advance();
            self.scratch[i] = x * lanes.gain[i];
        }
        &self.scratch[..len]
    }

    /// Leave the rendering set once the envelope has finished.
    pub fn finish_block(&mut self) {
        if !self.envelope.is_active() {
            self.active = false;
        }
    }
}

/// How a note-on was placed in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// Took an idle voice.
    Free(usize),
    /// Re-attacked the voice already playing the note.
    Retrigger(usize),
    /// Stole a sounding voice.
    Stolen(usize),
}

impl Allocation {
    /// Index of the voice that received the note.
    pub fn voice(self) -> usize {
        match self {
            Allocation::Free(i) | Allocation::Retrigger(i) | Allocation::Stolen(i) => i,
        }
    }
}

/// Fixed-size polyphonic voice pool.
///
/// # Example
///
/// ```rust
/// use subsynth::{Allocation, VoiceManager};
///
/// let mut pool: VoiceManager<2> = VoiceManager::new(48000.0);
/// pool.prepare(48000.0, 64);
///
/// assert_eq!(pool.note_on(60, 1.0), Allocation::Free(0));
/// assert_eq!(pool.note_on(64, 1.0), Allocation::Free(1));
/// assert_eq!(pool.note_on(67, 1.0), Allocation::Stolen(0));
/// assert_eq!(pool.active_voice_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct VoiceManager<const N: usize = DEFAULT_POLYPHONY> {
    voices: [Voice; N],
    adsr: AdsrSettings,
    sample_rate: f32,
}

impl<const N: usize> Default for VoiceManager<N> {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl<const N: usize> VoiceManager<N> {
    /// Pool of `N` idle voices.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            voices: core::array::from_fn(|_| Voice::new(sample_rate)),
            adsr: AdsrSettings::default(),
            sample_rate,
        }
    }

    /// Reinitialise every voice for a new sample rate and block size.
    pub fn prepare(&mut self, sample_rate: f32, max_block: usize) {
        self.sample_rate = sample_rate;
        for voice in &mut self.voices {
            voice.prepare(sample_rate, max_block);
            voice.set_adsr(&self.adsr);
        }
    }

    /// Pool capacity.
    pub fn voice_count(&self) -> usize {
        N
    }

    /// Number of voices in the rendering set.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Read access to all voices.
    pub fn voices(&self) -> &[Voice; N] {
        &self.voices
    }

    /// Envelope settings applied to every voice.
    pub fn adsr(&self) -> AdsrSettings {
        self.adsr
    }

    /// Store envelope settings and push them to every voice.
    pub fn set_adsr(&mut self, settings: AdsrSettings) {
        self.adsr = settings;
        for voice in &mut self.voices {
            voice.set_adsr(&settings);
        }
    }

    /// Select both oscillator waveforms on every voice.
    pub fn set_waveforms(&mut self, osc1: Waveform, osc2: Waveform) {
        for voice in &mut self.voices {
            voice.set_waveforms(osc1, osc2);
        }
    }

    /// Select the filter mode on every voice.
    pub fn set_filter_mode(&mut self, mode: FilterMode) {
        for voice in &mut self.voices {
            voice.set_filter_mode(mode);
        }
    }

    /// Enable or bypass the filter on every voice.
    pub fn set_filter_enabled(&mut self, enabled: bool) {
        for voice in &mut self.voices {
            voice.set_filter_enabled(enabled);
        }
    }

    /// Start a note. Never drops it: a saturated pool steals a voice.
    pub fn note_on(&mut self, note: u8, velocity: f32) -> Allocation {
        let allocation = self.allocate(note);
        let hard = matches!(allocation, Allocation::Stolen(_));
        self.voices[allocation.voice()].start_note(note, velocity, hard);
        allocation
    }

    /// Release the voice playing `note`, if any.
    pub fn note_off(&mut self, note: u8, allow_tail_off: bool) {
        if let Some(voice) = self
            .voices
            .iter_mut()
            .find(|v| v.is_active() && v.note() == note)
        {
            voice.stop_note(allow_tail_off);
        }
    }

    /// Hard-stop every voice.
    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.kill();
        }
    }

    /// Render every active voice and sum them into `mix`.
    ///
    /// `mix` is overwritten. Voices whose envelope finished during the block
    /// leave the rendering set afterwards.
    pub fn render(&mut self, lanes: &LaneView<'_>, mix: &mut [f32]) {
        mix.fill(0.0);
        for voice in &mut self.voices {
            if voice.is_active() {
                let rendered = voice.render(lanes);
                accumulate(mix, rendered);
            }
        }
        for voice in &mut self.voices {
            voice.finish_block();
        }
    }

    fn allocate(&mut self, note: u8) -> Allocation {
        if let Some(i) = self
            .voices
            .iter()
            .position(|v| v.is_active() && v.note() == note)
        {
            return Allocation::Retrigger(i);
        }

        if let Some(i) = self.voices.iter().position(|v| !v.is_active()) {
            return Allocation::Free(i);
        }

        let mut victim: Option<(usize, f32)> = None;
        for (i, voice) in self.voices.iter().enumerate() {
            if voice.is_releasing() {
                let level = voice.envelope().level();
                if victim.is_none_or(|(_, best)| level < best) {
                    victim = Some((i, level));
                }
            }
        }
        let index = victim.map_or(0, |(i, _)| i);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "voice_steal: voice {index} note {} -> {note}",
            self.voices[index].note()
        );

        Allocation::Stolen(index)
    }
}

/// Convert MIDI note number to frequency in Hz.
///
/// Uses standard tuning: A4 (note 69) = 440 Hz.
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * libm::powf(2.0, (note as f32 - 69.0) / 12.0)
}
