//! The engine's parameter table.
//!
//! Twelve parameters, each with a stable [`ParamId`], a string id used by
//! configuration files and hosts, and a [`ParamDescriptor`] carrying unit,
//! range and default. Enumerated parameters (waveforms, filter mode, filter
//! enable) are stepped descriptors whose plain value is the label index.
//!
//! | string id          | unit  | default | range                  |
//! |--------------------|-------|---------|------------------------|
//! | `osc1_type`        | enum  | Saw     | Sine/Saw/Square/Triangle |
//! | `osc2_type`        | enum  | Saw     | Sine/Saw/Square/Triangle |
//! | `osc_mix`          | ratio | 0.5     | 0..1                   |
//! | `filter_enabled`   | bool  | On      | Off/On                 |
//! | `filter_cutoff`    | Hz    | 1000    | 20..20000              |
//! | `filter_resonance` | ratio | 0.2     | 0..1                   |
//! | `filter_mode`      | enum  | LPF24   | LPF12..BPF24           |
//! | `attack`           | ms    | 100     | 1..5000                |
//! | `decay`            | ms    | 250     | 1..5000                |
//! | `sustain`          | ratio | 0.8     | 0..1                   |
//! | `release`          | ms    | 300     | 1..5000                |
//! | `master_gain`      | dB    | 0       | -60..6                 |

use subsynth_core::{ParamDescriptor, ParamId};

use crate::filter::FilterMode;
use crate::oscillator::Waveform;

/// Number of engine parameters.
pub const PARAM_COUNT: usize = 12;

/// Engine parameter identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SynthParam {
    /// Oscillator 1 waveform.
    Osc1Type,
    /// Oscillator 2 waveform.
    Osc2Type,
    /// Crossfade between oscillator 1 (0) and oscillator 2 (1).
    OscMix,
    /// Filter stage on/off.
    FilterEnabled,
    /// Filter cutoff in Hz.
    FilterCutoff,
    /// Normalized filter resonance.
    FilterResonance,
    /// Filter response and slope.
    FilterMode,
    /// Envelope attack in ms.
    Attack,
    /// Envelope decay in ms.
    Decay,
    /// Envelope sustain level.
    Sustain,
    /// Envelope release in ms.
    Release,
    /// Output gain in dB.
    MasterGain,
}

impl SynthParam {
    /// All parameters in index order.
    pub const ALL: [SynthParam; PARAM_COUNT] = [
        SynthParam::Osc1Type,
        SynthParam::Osc2Type,
        SynthParam::OscMix,
        SynthParam::FilterEnabled,
        SynthParam::FilterCutoff,
        SynthParam::FilterResonance,
        SynthParam::FilterMode,
        SynthParam::Attack,
        SynthParam::Decay,
        SynthParam::Sustain,
        SynthParam::Release,
        SynthParam::MasterGain,
    ];

    /// Index into [`SynthParam::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Parameter at `index`, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Stable string id.
    pub const fn string_id(self) -> &'static str {
        match self {
            SynthParam::Osc1Type => "osc1_type",
            SynthParam::Osc2Type => "osc2_type",
            SynthParam::OscMix => "osc_mix",
            SynthParam::FilterEnabled => "filter_enabled",
            SynthParam::FilterCutoff => "filter_cutoff",
            SynthParam::FilterResonance => "filter_resonance",
            SynthParam::FilterMode => "filter_mode",
            SynthParam::Attack => "attack",
            SynthParam::Decay => "decay",
            SynthParam::Sustain => "sustain",
            SynthParam::Release => "release",
            SynthParam::MasterGain => "master_gain",
        }
    }

    /// Look up a parameter by its string id.
    pub fn from_string_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.string_id() == id)
    }

    /// Stable numeric id (`100 + index`).
    pub const fn id(self) -> ParamId {
        ParamId(100 + self as u32)
    }

    /// Whether the render loop smooths this parameter per sample.
    ///
    /// The rest are applied at block boundaries.
    pub const fn is_smoothed(self) -> bool {
        matches!(
            self,
            SynthParam::OscMix
                | SynthParam::FilterCutoff
                | SynthParam::FilterResonance
                | SynthParam::MasterGain
        )
    }

    /// Full descriptor: name, unit, range, default, ids, group.
    pub fn descriptor(self) -> ParamDescriptor {
        let desc = match self {
            SynthParam::Osc1Type => ParamDescriptor::choice(
                "Oscillator 1 Type",
                "Osc1",
                Waveform::LABELS,
                Waveform::Saw.index(),
            ),
            SynthParam::Osc2Type => ParamDescriptor::choice(
                "Oscillator 2 Type",
                "Osc2",
                Waveform::LABELS,
                Waveform::Saw.index(),
            ),
            SynthParam::OscMix => ParamDescriptor::ratio("Oscillator Mix", "Mix", 0.5),
            SynthParam::FilterEnabled => ParamDescriptor::toggle("Filter Enabled", "Filter", true),
            SynthParam::FilterCutoff => {
                ParamDescriptor::frequency_hz("Filter Cutoff", "Cutoff", 20.0, 20000.0, 1000.0)
            }
            SynthParam::FilterResonance => ParamDescriptor::ratio("Filter Resonance", "Reso", 0.2),
            SynthParam::FilterMode => ParamDescriptor::choice(
                "Filter Mode",
                "Mode",
                FilterMode::LABELS,
                FilterMode::Lpf24.index(),
            ),
            SynthParam::Attack => ParamDescriptor::time_ms("Attack", "Attack", 1.0, 5000.0, 100.0),
            SynthParam::Decay => ParamDescriptor::time_ms("Decay", "Decay", 1.0, 5000.0, 250.0),
            SynthParam::Sustain => ParamDescriptor::ratio("Sustain", "Sustain", 0.8),
            SynthParam::Release => {
                ParamDescriptor::time_ms("Release", "Release", 1.0, 5000.0, 300.0)
            }
            SynthParam::MasterGain => {
                ParamDescriptor::gain_db("Master Gain", "Gain", -60.0, 6.0, 0.0)
            }
        };
        desc.with_id(self.id(), self.string_id())
            .with_group(self.group())
    }

    /// Host tree group.
    pub const fn group(self) -> &'static str {
        match self {
            SynthParam::Osc1Type | SynthParam::Osc2Type | SynthParam::OscMix => "oscillator",
            SynthParam::FilterEnabled
            | SynthParam::FilterCutoff
            | SynthParam::FilterResonance
            | SynthParam::FilterMode => "filter",
            SynthParam::Attack | SynthParam::Decay | SynthParam::Sustain | SynthParam::Release => {
                "envelope"
            }
            SynthParam::MasterGain => "output",
        }
    }

    /// Clamp `value` into this parameter's range (stepped values rounded).
    pub fn clamp(self, value: f32) -> f32 {
        self.descriptor().clamp(value)
    }

    /// Default plain value.
    pub fn default_value(self) -> f32 {
        self.descriptor().default
    }
}

/// Default plain values for every parameter, in index order.
pub fn default_values() -> [f32; PARAM_COUNT] {
    SynthParam::ALL.map(SynthParam::default_value)
}
