//! Property-based tests for the subsynth engine.
//!
//! Random note streams and parameter settings must never push the output
//! past the limiter ceiling or the pool past its capacity.

use proptest::prelude::*;
use subsynth::{
    AdsrEnvelope, Allocation, EnvelopeState, Oscillator, SubtractiveSynth, SynthParam,
    VoiceManager, Waveform,
};

#[derive(Debug, Clone)]
enum Event {
    On(u8, f32),
    Off(u8, bool),
    Render(usize),
}

fn event() -> impl Strategy<Value = Event> {
    prop_oneof![
        3 => (0u8..128, 0.0f32..=1.0).prop_map(|(n, v)| Event::On(n, v)),
        2 => (0u8..128, any::<bool>()).prop_map(|(n, t)| Event::Off(n, t)),
        2 => (1usize..300).prop_map(Event::Render),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever the gain staging, the output stays inside the ceiling.
    #[test]
    fn output_never_exceeds_ceiling(
        notes in prop::collection::vec((0u8..128, 0.0f32..=1.0), 1..16),
        gain_db in -60.0f32..=6.0,
        cutoff in 20.0f32..=20000.0,
        resonance in 0.0f32..=1.0,
        mode in 0usize..6,
        osc1 in 0usize..4,
        osc2 in 0usize..4,
    ) {
        let mut synth: SubtractiveSynth = SubtractiveSynth::new();
        synth.prepare(48000.0, 256).unwrap();
        synth.apply_parameter(SynthParam::MasterGain, gain_db);
        synth.apply_parameter(SynthParam::FilterCutoff, cutoff);
        synth.apply_parameter(SynthParam::FilterResonance, resonance);
        synth.apply_parameter(SynthParam::FilterMode, mode as f32);
        synth.apply_parameter(SynthParam::Osc1Type, osc1 as f32);
        synth.apply_parameter(SynthParam::Osc2Type, osc2 as f32);
        for (note, velocity) in notes {
            synth.note_on(note, velocity);
        }

        let mut block = [0.0f32; 256];
        for _ in 0..8 {
            synth.render_mono(&mut block);
            for &s in &block {
                prop_assert!(s.is_finite());
                prop_assert!(s.abs() <= 0.95, "sample {s} past the ceiling");
            }
        }
    }

    /// Any interleaving of note events and renders keeps the pool within
    /// capacity and at most one voice per note.
    #[test]
    fn polyphony_bounded(events in prop::collection::vec(event(), 1..64)) {
        let mut synth: SubtractiveSynth = SubtractiveSynth::new();
        synth.prepare(48000.0, 128).unwrap();
        synth.apply_parameter(SynthParam::Release, 20.0);

        let mut block = [0.0f32; 300];
        for ev in events {
            match ev {
                Event::On(n, v) => synth.note_on(n, v),
                Event::Off(n, t) => synth.note_off(n, t),
                Event::Render(len) => synth.render_mono(&mut block[..len]),
            }
            prop_assert!(synth.active_voice_count() <= 8);

            let mut sounding: Vec<u8> = synth
                .voices()
                .voices()
                .iter()
                .filter(|v| v.is_active())
                .map(|v| v.note())
                .collect();
            let total = sounding.len();
            sounding.sort_unstable();
            sounding.dedup();
            prop_assert_eq!(sounding.len(), total, "duplicate note in pool");
        }
    }

    /// More note-ons than voices in one block never exceeds the pool size.
    #[test]
    fn burst_note_ons_stay_within_pool(start in 0u8..100, count in 9usize..28) {
        let mut pool: VoiceManager = VoiceManager::new(48000.0);
        pool.prepare(48000.0, 64);
        for i in 0..count {
            pool.note_on(start + i as u8, 1.0);
            prop_assert!(pool.active_voice_count() <= 8);
        }
        prop_assert_eq!(pool.active_voice_count(), 8);
    }

    /// Note-ons only steal when every voice is taken, including right after
    /// a note-off that ended a silent voice.
    #[test]
    fn no_steal_while_a_voice_is_free(
        events in prop::collection::vec((0u8..12, any::<bool>(), any::<bool>()), 1..64),
    ) {
        let mut pool: VoiceManager<4> = VoiceManager::new(48000.0);
        pool.prepare(48000.0, 64);
        for (note, on, tail) in events {
            if on {
                let had_free = pool.active_voice_count() < 4;
                let allocation = pool.note_on(60 + note, 1.0);
                if had_free {
                    prop_assert!(!matches!(allocation, Allocation::Stolen(_)), "{allocation:?}");
                }
            } else {
                pool.note_off(60 + note, tail);
            }
            for voice in pool.voices() {
                prop_assert_eq!(voice.is_active(), voice.envelope().is_active());
            }
        }
    }

    /// Every waveform at every frequency stays within ±1.05.
    #[test]
    fn oscillator_bounded(
        waveform in 0usize..4,
        freq in 0.0f32..=24000.0,
        sample_rate in prop_oneof![Just(44100.0f32), Just(48000.0f32), Just(96000.0f32)],
    ) {
        let mut osc = Oscillator::new(sample_rate);
        osc.set_waveform(Waveform::ALL[waveform]);
        osc.set_frequency(freq);
        for _ in 0..4096 {
            let s = osc.next_sample();
            prop_assert!(s.abs() <= 1.05, "{:?} at {freq} Hz gave {s}", Waveform::ALL[waveform]);
        }
    }

    /// After attack + decay the envelope sits at the sustain level and holds.
    #[test]
    fn envelope_reaches_and_holds_sustain(
        attack_ms in 5.0f32..50.0,
        decay_ms in 10.0f32..50.0,
        sustain in 0.0f32..=1.0,
    ) {
        let sr = 48000.0;
        let mut env = AdsrEnvelope::new(sr);
        env.set_attack_ms(attack_ms);
        env.set_decay_ms(decay_ms);
        env.set_sustain(sustain);
        env.note_on();

        let ramp = ((attack_ms + decay_ms) * sr / 1000.0) as usize + 8;
        for _ in 0..ramp {
            env.advance();
        }
        prop_assert_eq!(env.state(), EnvelopeState::Sustain);
        for _ in 0..4800 {
            let level = env.advance();
            prop_assert!((level - sustain).abs() < 1e-6);
        }
    }

    /// Tail-off release never rises and ends at exactly zero.
    #[test]
    fn release_is_monotonic(
        sustain in 0.05f32..=1.0,
        release_ms in 10.0f32..200.0,
    ) {
        let sr = 48000.0;
        let mut env = AdsrEnvelope::new(sr);
        env.set_attack_ms(5.0);
        env.set_decay_ms(10.0);
        env.set_sustain(sustain);
        env.set_release_ms(release_ms);
        env.note_on();
        for _ in 0..1000 {
            env.advance();
        }

        env.note_off(true);
        let mut prev = env.level();
        let limit = (release_ms * sr / 1000.0) as usize + 4;
        for _ in 0..limit {
            let level = env.advance();
            prop_assert!(level <= prev);
            prev = level;
        }
        prop_assert_eq!(env.level(), 0.0);
        prop_assert_eq!(env.state(), EnvelopeState::Idle);
    }

    /// Editing attack, decay or sustain during a release does not stretch it.
    #[test]
    fn release_ignores_other_envelope_edits(
        release_ms in 10.0f32..200.0,
        edits in prop::collection::vec((5.0f32..500.0, 10.0f32..500.0, 0.0f32..=1.0), 1..64),
    ) {
        let sr = 48000.0;
        let mut env = AdsrEnvelope::new(sr);
        env.set_attack_ms(5.0);
        env.set_decay_ms(10.0);
        env.set_sustain(0.7);
        env.set_release_ms(release_ms);
        env.note_on();
        for _ in 0..1000 {
            env.advance();
        }

        env.note_off(true);
        let limit = (release_ms * sr / 1000.0) as usize + 4;
        let mut done = 0;
        for (attack, decay, sustain) in edits.iter().cycle() {
            if done >= limit {
                break;
            }
            env.set_attack_ms(*attack);
            env.set_decay_ms(*decay);
            env.set_sustain(*sustain);
            env.set_release_ms(release_ms);
            for _ in 0..64.min(limit - done) {
                env.advance();
                done += 1;
            }
        }
        prop_assert_eq!(env.state(), EnvelopeState::Idle);
    }
}
