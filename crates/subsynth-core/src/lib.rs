//! Subsynth Core - the allocation-free building blocks under the subsynth
//! voices.
//!
//! - [`Effect`] - mono per-sample processor trait
//! - [`StateVariableFilter`] - one 12 dB/oct TPT filter stage, [`SvfTaps`] for all outputs
//! - [`SmoothedParam`] - fixed-coefficient one-pole smoother for glides
//! - [`ParameterInfo`] / [`ParamDescriptor`] - parameter metadata and index access
//! - [`db_to_linear`], [`hard_clip`], [`ms_to_samples`], [`flush_denormal`]
//!
//! The crate builds without `std` (disable default features); maths goes
//! through `libm`.
//!
//! ```rust
//! use subsynth_core::{Effect, SmoothedParam, StateVariableFilter};
//!
//! // Glide a lowpass from 1 kHz toward 2 kHz, retuning every sample.
//! let mut cutoff = SmoothedParam::with_coefficient(1000.0, 0.01);
//! let mut stage = StateVariableFilter::new(48000.0);
//! cutoff.set_target(2000.0);
//! for _ in 0..64 {
//!     stage.set_cutoff(cutoff.advance());
//!     stage.process(0.25);
//! }
//! assert!(stage.cutoff() > 1000.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod effect;
pub mod math;
pub mod param;
pub mod param_info;
pub mod svf;

pub use effect::Effect;
pub use math::{db_to_linear, flush_denormal, hard_clip, ms_to_samples};
pub use param::SmoothedParam;
pub use param_info::{ParamDescriptor, ParamId, ParamUnit, ParameterInfo};
pub use svf::{StateVariableFilter, SvfOutput, SvfTaps};
