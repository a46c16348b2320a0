//! The polyphonic subtractive synthesizer.
//!
//! [`SubtractiveSynth`] owns the voice pool, the parameter smoothers and the
//! output limiter. The host calls [`prepare`](SubtractiveSynth::prepare) once
//! (and again whenever the sample rate or block size changes), then
//! [`render_block`](SubtractiveSynth::render_block) from the audio thread.
//! Control threads talk to it through a [`SynthHandle`].
//!
//! ## Block Processing
//!
//! Each `render_block` call:
//!
//! 1. Drains queued note events, in arrival order.
//! 2. Pulls changed parameter targets from the shared store. Discrete and
//!    envelope parameters take effect here; continuous ones become smoother
//!    targets.
//! 3. Renders in chunks of at most `max_block` samples: fill the parameter
//!    lanes, render and sum the voices, hard-clip, copy to every channel.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use subsynth_core::{ParamDescriptor, ParameterInfo};

use crate::config::SynthConfig;
use crate::error::{Result, SynthError};
use crate::filter::FilterMode;
use crate::handle::{NoteEvent, SynthHandle, event_queue};
use crate::mixdown::{OutputLimiter, fan_out};
use crate::oscillator::Waveform;
use crate::param_bridge::{DEFAULT_SMOOTHING, ParamBridge, ParamLanes, SharedParams};
use crate::params::{PARAM_COUNT, SynthParam, default_values};
use crate::voice::{AdsrSettings, DEFAULT_POLYPHONY, VoiceManager};

/// Polyphonic two-oscillator subtractive synthesizer.
///
/// `N` is the number of voices (8 by default).
///
/// # Example
///
/// ```rust
/// use subsynth::{SubtractiveSynth, SynthParam};
///
/// let mut synth: SubtractiveSynth = SubtractiveSynth::new();
/// synth.prepare(48000.0, 512).unwrap();
/// synth.apply_parameter(SynthParam::FilterCutoff, 2400.0);
///
/// synth.note_on(60, 1.0);
/// synth.note_on(64, 0.8);
///
/// let mut left = vec![0.0; 512];
/// let mut right = vec![0.0; 512];
/// synth.render_block(&mut [&mut left, &mut right]);
///
/// assert_eq!(left, right);
/// assert!(left.iter().all(|s| s.abs() <= 0.95));
/// ```
#[derive(Debug)]
pub struct SubtractiveSynth<const N: usize = DEFAULT_POLYPHONY> {
    voices: VoiceManager<N>,
    bridge: ParamBridge,
    shared: Arc<SharedParams>,
    events_tx: Sender<NoteEvent>,
    events_rx: Receiver<NoteEvent>,
    /// Plain values the engine has acted on, for change detection
    applied: [f32; PARAM_COUNT],
    lanes: ParamLanes,
    mix: Vec<f32>,
    limiter: OutputLimiter,
    sample_rate: f32,
    max_block: usize,
    prepared: bool,
}

impl<const N: usize> Default for SubtractiveSynth<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SubtractiveSynth<N> {
    /// Unprepared engine with default parameters. Renders silence until
    /// [`prepare`](Self::prepare) succeeds.
    pub fn new() -> Self {
        let (events_tx, events_rx) = event_queue();
        Self {
            voices: VoiceManager::new(48000.0),
            bridge: ParamBridge::new(DEFAULT_SMOOTHING),
            shared: Arc::new(SharedParams::new()),
            events_tx,
            events_rx,
            applied: default_values(),
            lanes: ParamLanes::default(),
            mix: Vec::new(),
            limiter: OutputLimiter::new(),
            sample_rate: 48000.0,
            max_block: 0,
            prepared: false,
        }
    }

    /// Build and prepare an engine from a configuration.
    pub fn with_config(config: &SynthConfig) -> Result<Self> {
        config.validate()?;
        let mut synth = Self::new();
        synth.set_smoothing(config.smoothing_coefficient)?;
        for (param, value) in config.resolved_params()? {
            synth.shared.set(param, value);
        }
        synth.prepare(config.sample_rate, config.max_block_size)?;
        Ok(synth)
    }

    /// A control handle sharing this engine's parameter store and event queue.
    pub fn handle(&self) -> SynthHandle {
        SynthHandle::new(Arc::clone(&self.shared), self.events_tx.clone())
    }

    /// Set up for a sample rate and maximum block size.
    ///
    /// Allocates every buffer the render path needs, silences all voices and
    /// snaps smoothed parameters onto their targets. On error the engine is
    /// left as it was.
    pub fn prepare(&mut self, sample_rate: f32, max_block: usize) -> Result<()> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(SynthError::InvalidSampleRate(sample_rate));
        }
        if max_block == 0 {
            return Err(SynthError::InvalidBlockSize(max_block));
        }

        self.sample_rate = sample_rate;
        self.max_block = max_block;
        self.lanes = ParamLanes::with_capacity(max_block);
        self.mix = vec![0.0; max_block];
        self.voices.prepare(sample_rate, max_block);

        let targets = self.shared.snapshot();
        for param in SynthParam::ALL {
            self.apply_to_engine(param, targets[param.index()]);
        }
        self.bridge.force_to_targets();
        self.prepared = true;

        #[cfg(feature = "tracing")]
        tracing::info!(
            sample_rate,
            max_block,
            voices = N,
            "synth_prepare: ready"
        );

        Ok(())
    }

    /// Whether [`prepare`](Self::prepare) has succeeded.
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Sample rate from the last successful `prepare`.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Maximum block size from the last successful `prepare` (0 before).
    pub fn max_block_size(&self) -> usize {
        self.max_block
    }

    /// Change the per-sample smoothing coefficient, in `(0, 1]`.
    pub fn set_smoothing(&mut self, coefficient: f32) -> Result<()> {
        if !coefficient.is_finite() || coefficient <= 0.0 || coefficient > 1.0 {
            return Err(SynthError::InvalidSmoothing(coefficient));
        }
        self.bridge.set_coefficient(coefficient);
        Ok(())
    }

    /// Smoothing coefficient in use.
    pub fn smoothing(&self) -> f32 {
        self.bridge.coefficient()
    }

    /// Start a note on the render thread.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        let _allocation = self.voices.note_on(note, velocity);

        #[cfg(feature = "tracing")]
        tracing::debug!("note_on: {note} vel {velocity:.2} -> {_allocation:?}");
    }

    /// Release a note on the render thread.
    pub fn note_off(&mut self, note: u8, allow_tail_off: bool) {
        self.voices.note_off(note, allow_tail_off);

        #[cfg(feature = "tracing")]
        tracing::debug!("note_off: {note} tail={allow_tail_off}");
    }

    /// Hard-stop every voice.
    pub fn all_notes_off(&mut self) {
        self.voices.all_notes_off();

        #[cfg(feature = "tracing")]
        tracing::debug!("all_notes_off");
    }

    /// Set a parameter and act on it. Returns the clamped value.
    ///
    /// Discrete and envelope parameters change immediately. Continuous ones
    /// glide from their current smoothed value.
    pub fn apply_parameter(&mut self, param: SynthParam, value: f32) -> f32 {
        let stored = self.shared.set(param, value);
        self.apply_to_engine(param, stored);
        stored
    }

    /// [`apply_parameter`](Self::apply_parameter) by string id.
    pub fn set_param_by_id(&mut self, id: &str, value: f32) -> Result<f32> {
        let param =
            SynthParam::from_string_id(id).ok_or_else(|| SynthError::UnknownParameter(id.into()))?;
        Ok(self.apply_parameter(param, value))
    }

    /// Current target of a parameter, in plain units.
    pub fn parameter(&self, param: SynthParam) -> f32 {
        self.shared.get(param)
    }

    /// Number of voices currently rendering.
    pub fn active_voice_count(&self) -> usize {
        self.voices.active_voice_count()
    }

    /// The voice pool.
    pub fn voices(&self) -> &VoiceManager<N> {
        &self.voices
    }

    /// Render one block into every channel of `outputs`.
    ///
    /// All channels receive the same mono signal. The block length is the
    /// shortest channel; longer channels are zeroed past it. Blocks longer
    /// than the prepared maximum are rendered in chunks.
    pub fn render_block(&mut self, outputs: &mut [&mut [f32]]) {
        let frames = outputs.iter().map(|ch| ch.len()).min().unwrap_or(0);

        if !self.prepared {
            for ch in outputs.iter_mut() {
                ch.fill(0.0);
            }
            return;
        }

        self.drain_events();
        self.sync_shared();

        let mut offset = 0;
        while offset < frames {
            let len = (frames - offset).min(self.max_block);
            let lanes = self.lanes.fill(&mut self.bridge, len);
            let mix = &mut self.mix[..len];
            self.voices.render(&lanes, mix);
            self.limiter.process_block(mix);
            fan_out(mix, outputs, offset);
            offset += len;
        }

        for ch in outputs.iter_mut() {
            if let Some(tail) = ch.get_mut(frames..) {
                tail.fill(0.0);
            }
        }
    }

    /// Render one mono block.
    pub fn render_mono(&mut self, output: &mut [f32]) {
        self.render_block(&mut [output]);
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                NoteEvent::NoteOn { note, velocity } => self.note_on(note, velocity),
                NoteEvent::NoteOff {
                    note,
                    allow_tail_off,
                } => self.note_off(note, allow_tail_off),
                NoteEvent::AllNotesOff => self.all_notes_off(),
            }
        }
    }

    /// Act on targets written through a handle since the last block.
    fn sync_shared(&mut self) {
        let targets = self.shared.snapshot();
        for param in SynthParam::ALL {
            let value = targets[param.index()];
            if value.to_bits() != self.applied[param.index()].to_bits() {
                self.apply_to_engine(param, value);
            }
        }
    }

    fn apply_to_engine(&mut self, param: SynthParam, value: f32) {
        self.applied[param.index()] = value;
        if param.is_smoothed() {
            self.bridge.set_target(param, value);
            return;
        }
        match param {
            SynthParam::Osc1Type | SynthParam::Osc2Type => self.voices.set_waveforms(
                Waveform::from_value(self.applied[SynthParam::Osc1Type.index()]),
                Waveform::from_value(self.applied[SynthParam::Osc2Type.index()]),
            ),
            SynthParam::FilterEnabled => self.voices.set_filter_enabled(value >= 0.5),
            SynthParam::FilterMode => self.voices.set_filter_mode(FilterMode::from_value(value)),
            SynthParam::Attack | SynthParam::Decay | SynthParam::Sustain | SynthParam::Release => {
                self.voices.set_adsr(AdsrSettings {
                    attack_ms: self.applied[SynthParam::Attack.index()],
                    decay_ms: self.applied[SynthParam::Decay.index()],
                    sustain: self.applied[SynthParam::Sustain.index()],
                    release_ms: self.applied[SynthParam::Release.index()],
                });
            }
            SynthParam::OscMix
            | SynthParam::FilterCutoff
            | SynthParam::FilterResonance
            | SynthParam::MasterGain => {}
        }
    }
}

impl<const N: usize> ParameterInfo for SubtractiveSynth<N> {
    fn param_count(&self) -> usize {
        PARAM_COUNT
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        SynthParam::from_index(index).map(SynthParam::descriptor)
    }

    fn get_param(&self, index: usize) -> f32 {
        SynthParam::from_index(index).map_or(0.0, |p| self.parameter(p))
    }

    fn set_param(&mut self, index: usize, value: f32) {
        if let Some(param) = SynthParam::from_index(index) {
            self.apply_parameter(param, value);
        }
    }
}
