//! Offline rendering of a held chord.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use subsynth::{SubtractiveSynth, SynthConfig, midi_to_freq};

use super::common::{parse_key_val, parse_notes, parse_param_value};
use crate::wav::{float_spec, interleave_into, write_wav};

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// MIDI notes (comma-separated, e.g., "60,64,67" for C major)
    #[arg(long, default_value = "60")]
    notes: String,

    /// Note velocity (0-1)
    #[arg(long, default_value = "0.8")]
    velocity: f32,

    /// Seconds the notes are held
    #[arg(long, default_value = "1.0")]
    hold: f32,

    /// Seconds rendered after note-off
    #[arg(long, default_value = "0.5")]
    tail: f32,

    /// Stop notes dead instead of ramping through the release
    #[arg(long)]
    hard_stop: bool,

    /// Sample rate (overrides the config file)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Maximum block size (overrides the config file)
    #[arg(long)]
    block_size: Option<usize>,

    /// Output channels; each receives the same signal
    #[arg(long, default_value = "2")]
    channels: u16,

    /// Engine configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Parameter override as id=value (repeatable), e.g. filter_cutoff=2400
    #[arg(long = "param", value_parser = parse_key_val)]
    params: Vec<(String, String)>,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    if args.channels == 0 {
        anyhow::bail!("--channels must be at least 1");
    }
    if !args.hold.is_finite() || !args.tail.is_finite() || args.hold < 0.0 || args.tail < 0.0 {
        anyhow::bail!("--hold and --tail must be non-negative");
    }

    let mut config = match &args.config {
        Some(path) => SynthConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SynthConfig::default(),
    };
    if let Some(sr) = args.sample_rate {
        config.sample_rate = sr as f32;
    }
    if let Some(block) = args.block_size {
        config.max_block_size = block;
    }
    // WAV headers carry whole Hz; render at the rate the header will claim.
    config.sample_rate = config.sample_rate.round();
    for (id, raw) in &args.params {
        let (param, value) = parse_param_value(id, raw)?;
        config.params.insert(param.string_id().to_string(), value);
    }

    let notes = parse_notes(&args.notes)?;
    let mut synth: SubtractiveSynth =
        SubtractiveSynth::with_config(&config).context("Invalid engine configuration")?;

    let sample_rate = config.sample_rate;
    let wav_rate = sample_rate as u32;
    let hold_frames = (args.hold * sample_rate) as usize;
    let tail_frames = (args.tail * sample_rate) as usize;

    println!("Rendering...");
    println!("  Notes: {:?}", notes);
    println!(
        "  Frequencies: {:?}",
        notes
            .iter()
            .map(|&n| format!("{:.1} Hz", midi_to_freq(n)))
            .collect::<Vec<_>>()
    );
    println!(
        "  Hold: {:.2}s, tail: {:.2}s at {} Hz",
        args.hold, args.tail, sample_rate
    );

    for &note in &notes {
        synth.note_on(note, args.velocity);
    }

    let mut renderer = Renderer::new(usize::from(args.channels), config.max_block_size);
    let total = hold_frames + tail_frames;
    let mut interleaved = Vec::with_capacity(total * usize::from(args.channels));

    renderer.render(&mut synth, hold_frames, &mut interleaved);
    for &note in &notes {
        synth.note_off(note, !args.hard_stop);
    }
    renderer.render(&mut synth, tail_frames, &mut interleaved);

    let peak = interleaved.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    tracing::info!(
        frames = total,
        channels = args.channels,
        peak,
        voices_left = synth.active_voice_count(),
        "render complete"
    );

    write_wav(
        &args.output,
        &interleaved,
        float_spec(args.channels, wav_rate),
    )
    .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Wrote {} frames ({} channels, peak {:.3}) to {}",
        total,
        args.channels,
        peak,
        args.output.display()
    );

    Ok(())
}

/// Planar block buffers reused across render calls.
struct Renderer {
    buffers: Vec<Vec<f32>>,
    block: usize,
}

impl Renderer {
    fn new(channels: usize, block: usize) -> Self {
        Self {
            buffers: vec![vec![0.0; block]; channels],
            block,
        }
    }

    fn render(&mut self, synth: &mut SubtractiveSynth, frames: usize, out: &mut Vec<f32>) {
        let mut done = 0;
        while done < frames {
            let len = (frames - done).min(self.block);
            {
                let mut outputs: Vec<&mut [f32]> =
                    self.buffers.iter_mut().map(|b| &mut b[..len]).collect();
                synth.render_block(&mut outputs);
            }
            interleave_into(&self.buffers, len, out);
            done += len;
        }
    }
}
