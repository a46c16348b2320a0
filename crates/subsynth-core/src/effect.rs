//! The [`Effect`] trait: one sample in, one sample out.
//!
//! Filter stages and the per-voice filter implement it. Processing is mono
//! since voices are mono and the engine fans the summed block out to the
//! host's channels. Nothing on these methods may allocate.

/// A stateful mono sample processor.
///
/// ```rust
/// use subsynth_core::Effect;
///
/// /// One-sample delay.
/// struct Z1(f32);
///
/// impl Effect for Z1 {
///     fn process(&mut self, input: f32) -> f32 {
///         core::mem::replace(&mut self.0, input)
///     }
///     fn set_sample_rate(&mut self, _: f32) {}
///     fn reset(&mut self) {
///         self.0 = 0.0;
///     }
/// }
///
/// let mut z = Z1(0.0);
/// let mut block = [1.0, 2.0, 3.0];
/// z.process_block_inplace(&mut block);
/// assert_eq!(block, [0.0, 1.0, 2.0]);
/// ```
pub trait Effect {
    /// Advance one sample.
    fn process(&mut self, input: f32) -> f32;

    /// Run [`process`](Self::process) over a whole buffer.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        buffer.iter_mut().for_each(|s| *s = self.process(*s));
    }

    /// Recompute anything that depends on the sample rate.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Forget signal history. Settings are kept.
    fn reset(&mut self);
}
