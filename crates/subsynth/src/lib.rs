//! Subsynth - real-time polyphonic subtractive synthesizer
//!
//! Eight voices, each with two band-limited additive oscillators, a
//! resonant state-variable filter and a linear ADSR amplitude envelope,
//! summed and hard-clipped to a fixed ceiling.
//!
//! # Core Components
//!
//! ## Sound Sources
//!
//! - [`Oscillator`] - Additive oscillator, partials limited below Nyquist
//! - [`Waveform`] - Sine, Saw, Square, Triangle
//!
//! ## Shaping
//!
//! - [`ResonantFilter`] - 12 or 24 dB/oct lowpass, highpass or bandpass
//! - [`AdsrEnvelope`] - Linear attack-decay-sustain-release
//!
//! ## Voices
//!
//! - [`Voice`] - One note's oscillators, filter and envelope
//! - [`VoiceManager`] - Fixed pool with retrigger and voice stealing
//!
//! ## Parameters
//!
//! - [`SynthParam`] - The twelve engine parameters and their descriptors
//! - [`SharedParams`] - Lock-free targets written from any thread
//! - [`ParamBridge`] / [`ParamLanes`] - Per-sample smoothing on the render thread
//!
//! ## Engine
//!
//! - [`SubtractiveSynth`] - Prepare, render, note and parameter entry points
//! - [`SynthHandle`] - Cloneable control handle for other threads
//! - [`SynthConfig`] - TOML configuration
//!
//! # Example
//!
//! ```rust
//! use subsynth::{SubtractiveSynth, SynthParam, Waveform};
//!
//! let mut synth: SubtractiveSynth = SubtractiveSynth::new();
//! synth.prepare(48000.0, 256).unwrap();
//! synth.apply_parameter(SynthParam::Osc2Type, Waveform::Square.index() as f32);
//! synth.apply_parameter(SynthParam::FilterResonance, 0.6);
//!
//! synth.note_on(57, 0.9);
//! let mut block = [0.0f32; 256];
//! for _ in 0..10 {
//!     synth.render_mono(&mut block);
//! }
//! synth.note_off(57, true);
//! synth.render_mono(&mut block);
//! ```
//!
//! # Logging
//!
//! With the `tracing` feature, setup and note events are logged through the
//! `tracing` crate. The per-sample path never logs.

pub mod config;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod handle;
pub mod mixdown;
pub mod oscillator;
pub mod param_bridge;
pub mod params;
pub mod synth;
pub mod voice;

pub use config::SynthConfig;
pub use envelope::{AdsrEnvelope, EnvelopeState};
pub use error::{ConfigError, Result, SynthError};
pub use filter::{FilterMode, ResonantFilter};
pub use handle::{EVENT_QUEUE_CAPACITY, NoteEvent, SynthHandle};
pub use mixdown::{OUTPUT_CEILING, OutputLimiter};
pub use oscillator::{MAX_HARMONICS, Oscillator, Waveform};
pub use param_bridge::{DEFAULT_SMOOTHING, LaneView, ParamBridge, ParamLanes, SharedParams};
pub use params::{PARAM_COUNT, SynthParam};
pub use synth::SubtractiveSynth;
pub use voice::{AdsrSettings, Allocation, DEFAULT_POLYPHONY, Voice, VoiceManager, midi_to_freq};

pub use subsynth_core::{Effect, ParamDescriptor, ParamId, ParameterInfo};
