//! Control-side handle: note events and parameter edits from other threads.
//!
//! A [`SynthHandle`] is cheap to clone and `Send + Sync`. Parameter edits go
//! straight into the shared atomic targets. Note events go into a bounded
//! channel that the render thread drains with `try_recv` at the start of each
//! block, so events are applied in order and never mid-block.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::error::{Result, SynthError};
use crate::param_bridge::SharedParams;
use crate::params::SynthParam;

/// Capacity of the note event queue.
pub const EVENT_QUEUE_CAPACITY: usize = 1024;

/// A note event, already decoded from whatever protocol the host speaks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteEvent {
    /// Start (or retrigger) a note.
    NoteOn {
        /// MIDI note number.
        note: u8,
        /// Velocity, 0..1.
        velocity: f32,
    },
    /// Release a note.
    NoteOff {
        /// MIDI note number.
        note: u8,
        /// Ramp out through the release phase instead of stopping dead.
        allow_tail_off: bool,
    },
    /// Hard-stop every voice.
    AllNotesOff,
}

/// Create the event queue pair.
pub(crate) fn event_queue() -> (Sender<NoteEvent>, Receiver<NoteEvent>) {
    bounded(EVENT_QUEUE_CAPACITY)
}

/// Thread-safe remote control for a [`SubtractiveSynth`](crate::SubtractiveSynth).
///
/// # Example
///
/// ```rust
/// use subsynth::{SubtractiveSynth, SynthParam};
///
/// let mut synth: SubtractiveSynth = SubtractiveSynth::new();
/// synth.prepare(48000.0, 256).unwrap();
///
/// let handle = synth.handle();
/// std::thread::spawn(move || {
///     handle.set_param(SynthParam::FilterCutoff, 3000.0);
///     handle.note_on(64, 0.9).unwrap();
/// })
/// .join()
/// .unwrap();
///
/// let mut block = vec![0.0; 256];
/// synth.render_mono(&mut block);
/// assert_eq!(synth.active_voice_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SynthHandle {
    params: Arc<SharedParams>,
    events: Sender<NoteEvent>,
}

impl SynthHandle {
    pub(crate) fn new(params: Arc<SharedParams>, events: Sender<NoteEvent>) -> Self {
        Self { params, events }
    }

    /// Set a parameter target. Returns the clamped value that was stored.
    pub fn set_param(&self, param: SynthParam, value: f32) -> f32 {
        self.params.set(param, value)
    }

    /// Set a parameter target by string id.
    pub fn set_param_by_id(&self, id: &str, value: f32) -> Result<f32> {
        let param =
            SynthParam::from_string_id(id).ok_or_else(|| SynthError::UnknownParameter(id.into()))?;
        Ok(self.params.set(param, value))
    }

    /// Current target of a parameter.
    pub fn param(&self, param: SynthParam) -> f32 {
        self.params.get(param)
    }

    /// Queue a note-on.
    pub fn note_on(&self, note: u8, velocity: f32) -> Result<()> {
        self.send(NoteEvent::NoteOn { note, velocity })
    }

    /// Queue a note-off.
    pub fn note_off(&self, note: u8, allow_tail_off: bool) -> Result<()> {
        self.send(NoteEvent::NoteOff {
            note,
            allow_tail_off,
        })
    }

    /// Queue a hard stop of every voice.
    pub fn all_notes_off(&self) -> Result<()> {
        self.send(NoteEvent::AllNotesOff)
    }

    /// Queue an arbitrary event.
    pub fn send(&self, event: NoteEvent) -> Result<()> {
        self.events.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) | TrySendError::Disconnected(_) => SynthError::EventQueueFull,
        })
    }
}
