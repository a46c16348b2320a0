//! WAV output.

use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;

/// 32-bit float WAV spec.
pub fn float_spec(channels: u16, sample_rate: u32) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    }
}

/// Write interleaved f32 samples as a 32-bit float WAV file.
pub fn write_wav<P: AsRef<Path>>(path: P, interleaved: &[f32], spec: WavSpec) -> hound::Result<()> {
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in interleaved {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}

/// Interleave planar channel buffers, first `frames` samples of each.
pub fn interleave_into(channels: &[Vec<f32>], frames: usize, out: &mut Vec<f32>) {
    for i in 0..frames {
        for ch in channels {
            out.push(ch[i]);
        }
    }
}
