//! Voice summing and the output safety stage.

use subsynth_core::hard_clip;

/// Absolute ceiling of the engine's output.
pub const OUTPUT_CEILING: f32 = 0.95;

/// Final hard-clip stage.
///
/// Runs unconditionally on every rendered sample, whatever the gain staging
/// upstream. A hard clip, not a soft saturator: below the ceiling the signal
/// is untouched.
#[derive(Debug, Clone, Copy)]
pub struct OutputLimiter {
    ceiling: f32,
}

impl Default for OutputLimiter {
    fn default() -> Self {
        Self {
            ceiling: OUTPUT_CEILING,
        }
    }
}

impl OutputLimiter {
    /// Limiter at [`OUTPUT_CEILING`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Clip level.
    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }

    /// Clip one sample.
    #[inline]
    pub fn process(&self, sample: f32) -> f32 {
        hard_clip(sample, self.ceiling)
    }

    /// Clip a block in place.
    pub fn process_block(&self, block: &mut [f32]) {
        for s in block.iter_mut() {
            *s = hard_clip(*s, self.ceiling);
        }
    }
}

/// Add `src` into `dst` sample by sample.
#[inline]
pub fn accumulate(dst: &mut [f32], src: &[f32]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d += *s;
    }
}

/// Copy a mono block into `offset..offset + mono.len()` of every channel.
pub fn fan_out(mono: &[f32], outputs: &mut [&mut [f32]], offset: usize) {
    for channel in outputs.iter_mut() {
        if let Some(dst) = channel.get_mut(offset..offset + mono.len()) {
            dst.copy_from_slice(mono);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limiter_clips_both_polarities() {
        let limiter = OutputLimiter::new();
        let mut block = [2.0, -3.0, 0.5, -0.949, f32::NAN];
        limiter.process_block(&mut block);
        assert_eq!(block[..4], [0.95, -0.95, 0.5, -0.949]);
        assert_eq!(block[4], 0.0);
    }

    #[test]
    fn test_accumulate_sums() {
        let mut dst = [1.0, 1.0, 1.0];
        accumulate(&mut dst, &[0.5, -1.0, 2.0]);
        assert_eq!(dst, [1.5, 0.0, 3.0]);
    }

    #[test]
    fn test_fan_out_copies_each_channel() {
        let mut left = [0.0; 4];
        let mut right = [0.0; 4];
        {
            let mut outs: [&mut [f32]; 2] = [&mut left, &mut right];
            fan_out(&[0.1, 0.2], &mut outs, 2);
        }
        assert_eq!(left, [0.0, 0.0, 0.1, 0.2]);
        assert_eq!(right, left);
    }
}
