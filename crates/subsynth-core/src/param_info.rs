//! Parameter metadata and index-based access.
//!
//! An engine describes each of its parameters with a [`ParamDescriptor`]
//! (display name, unit, range, default, stable ids, value labels) and
//! exposes them through [`ParameterInfo`]. Hosts, config loaders and the
//! command line all enumerate parameters this way, so none of them needs to
//! know the concrete engine type.
//!
//! ```rust
//! use subsynth_core::{ParamDescriptor, ParamId, ParameterInfo};
//!
//! struct Drive(f32);
//!
//! impl ParameterInfo for Drive {
//!     fn param_count(&self) -> usize { 1 }
//!
//!     fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
//!         (index == 0).then(|| {
//!             ParamDescriptor::gain_db("Drive", "Drive", 0.0, 24.0, 6.0)
//!                 .with_id(ParamId(1), "drive")
//!         })
//!     }
//!
//!     fn get_param(&self, index: usize) -> f32 {
//!         if index == 0 { self.0 } else { 0.0 }
//!     }
//!
//!     fn set_param(&mut self, index: usize, value: f32) {
//!         if let Some(desc) = self.param_info(index) {
//!             self.0 = desc.clamp(value);
//!         }
//!     }
//! }
//!
//! let mut d = Drive(6.0);
//! d.set_param(0, 99.0);
//! assert_eq!(d.get_param(0), 24.0);
//! assert_eq!(d.find_param_by_name("DRIVE"), Some(0));
//! ```

/// Numeric parameter id. Persisted state refers to parameters by this, so
/// it must not change once published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(pub u32);

/// Display unit of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// dB.
    Decibels,
    /// Hz.
    Hertz,
    /// ms.
    Milliseconds,
    /// Unitless ratios, switches and choices.
    None,
}

impl ParamUnit {
    /// Text appended to a formatted value.
    ///
    /// ```rust
    /// use subsynth_core::ParamUnit;
    ///
    /// assert_eq!(format!("440{}", ParamUnit::Hertz.suffix()), "440 Hz");
    /// assert_eq!(ParamUnit::None.suffix(), "");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::None => "",
        }
    }
}

/// Index-addressed parameter access.
///
/// Indices run `0..param_count()` and stay fixed for the lifetime of the
/// implementor. Out-of-range indices read as `0.0` and writes to them are
/// ignored. Implementations clamp incoming values with
/// [`ParamDescriptor::clamp`].
pub trait ParameterInfo {
    /// Number of parameters.
    fn param_count(&self) -> usize;

    /// Metadata for `index`, or `None` past the end.
    fn param_info(&self, index: usize) -> Option<ParamDescriptor>;

    /// Current value at `index`.
    fn get_param(&self, index: usize) -> f32;

    /// Write a value at `index`.
    fn set_param(&mut self, index: usize, value: f32);

    /// Case-insensitive lookup against the full name, short name and
    /// string id.
    fn find_param_by_name(&self, name: &str) -> Option<usize> {
        (0..self.param_count()).find(|&i| {
            self.param_info(i).is_some_and(|d| {
                [d.name, d.short_name, d.string_id]
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(name))
            })
        })
    }

    /// Index of the parameter carrying `id`. Linear scan; not for the
    /// audio thread.
    fn param_index_by_id(&self, id: ParamId) -> Option<usize> {
        (0..self.param_count()).find(|&i| self.param_info(i).is_some_and(|d| d.id == id))
    }
}

/// Everything a host needs to display and validate one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Display name, e.g. "Filter Cutoff".
    pub name: &'static str,
    /// Compact name, at most 8 characters.
    pub short_name: &'static str,
    /// Display unit.
    pub unit: ParamUnit,
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
    /// Value at construction.
    pub default: f32,
    /// Stable numeric id; `ParamId(0)` until assigned.
    pub id: ParamId,
    /// Stable text id such as `"filter_cutoff"`; empty until assigned.
    pub string_id: &'static str,
    /// Grouping for tree displays, e.g. `"filter"`.
    pub group: &'static str,
    /// Whether only whole numbers are valid.
    pub stepped: bool,
    /// Names of the values of a stepped parameter, by index.
    pub labels: &'static [&'static str],
}

impl ParamDescriptor {
    const fn continuous(
        name: &'static str,
        short_name: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit,
            min,
            max,
            default,
            id: ParamId(0),
            string_id: "",
            group: "",
            stepped: false,
            labels: &[],
        }
    }

    /// Unitless value in `0..=1`.
    pub const fn ratio(name: &'static str, short_name: &'static str, default: f32) -> Self {
        Self::continuous(name, short_name, ParamUnit::None, 0.0, 1.0, default)
    }

    /// Duration in milliseconds.
    pub const fn time_ms(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self::continuous(name, short_name, ParamUnit::Milliseconds, min, max, default)
    }

    /// Level in decibels.
    pub const fn gain_db(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self::continuous(name, short_name, ParamUnit::Decibels, min, max, default)
    }

    /// Frequency in Hz.
    pub const fn frequency_hz(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self::continuous(name, short_name, ParamUnit::Hertz, min, max, default)
    }

    /// One of `labels`; the value is the label's index.
    pub const fn choice(
        name: &'static str,
        short_name: &'static str,
        labels: &'static [&'static str],
        default_index: usize,
    ) -> Self {
        let max = labels.len().saturating_sub(1) as f32;
        let mut desc =
            Self::continuous(name, short_name, ParamUnit::None, 0.0, max, default_index as f32);
        desc.stepped = true;
        desc.labels = labels;
        desc
    }

    /// Off/On switch stored as `0.0` / `1.0`.
    pub const fn toggle(name: &'static str, short_name: &'static str, default_on: bool) -> Self {
        Self::choice(name, short_name, &["Off", "On"], default_on as usize)
    }

    /// Attach the stable ids.
    ///
    /// ```rust
    /// use subsynth_core::{ParamDescriptor, ParamId};
    ///
    /// let desc = ParamDescriptor::ratio("Sustain", "Sustain", 0.8)
    ///     .with_id(ParamId(108), "sustain");
    /// assert_eq!((desc.id, desc.string_id), (ParamId(108), "sustain"));
    /// ```
    pub const fn with_id(mut self, id: ParamId, string_id: &'static str) -> Self {
        self.id = id;
        self.string_id = string_id;
        self
    }

    /// Attach a display group.
    pub const fn with_group(mut self, group: &'static str) -> Self {
        self.group = group;
        self
    }

    /// Force `value` into range, rounding stepped parameters to a whole
    /// number. NaN gives the default.
    ///
    /// ```rust
    /// use subsynth_core::ParamDescriptor;
    ///
    /// let cutoff = ParamDescriptor::frequency_hz("Cutoff", "Cutoff", 20.0, 20000.0, 1000.0);
    /// assert_eq!(cutoff.clamp(5.0), 20.0);
    ///
    /// let wave = ParamDescriptor::choice("Wave", "Wave", &["Sine", "Saw", "Square"], 0);
    /// assert_eq!(wave.clamp(1.6), 2.0);
    /// ```
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        let v = value.clamp(self.min, self.max);
        if self.stepped { libm::roundf(v) } else { v }
    }

    /// Name of the value nearest to `value`, for labelled parameters.
    pub fn label(&self, value: f32) -> Option<&'static str> {
        self.labels.get(self.clamp(value) as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAVES: &[&str] = &["Sine", "Saw", "Square", "Triangle"];

    struct Patch {
        cutoff: f32,
        wave: f32,
    }

    impl ParameterInfo for Patch {
        fn param_count(&self) -> usize {
            2
        }

        fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
            match index {
                0 => Some(
                    ParamDescriptor::frequency_hz("Filter Cutoff", "Cutoff", 20.0, 20000.0, 1000.0)
                        .with_id(ParamId(7), "filter_cutoff"),
                ),
                1 => Some(
                    ParamDescriptor::choice("Waveform", "Wave", WAVES, 1)
                        .with_id(ParamId(8), "waveform"),
                ),
                _ => None,
            }
        }

        fn get_param(&self, index: usize) -> f32 {
            [self.cutoff, self.wave].get(index).copied().unwrap_or(0.0)
        }

        fn set_param(&mut self, index: usize, value: f32) {
            let Some(desc) = self.param_info(index) else {
                return;
            };
            let v = desc.clamp(value);
            match index {
                0 => self.cutoff = v,
                _ => self.wave = v,
            }
        }
    }

    fn patch() -> Patch {
        Patch {
            cutoff: 1000.0,
            wave: 1.0,
        }
    }

    #[test]
    fn lookup_matches_any_name_form() {
        let p = patch();
        assert_eq!(p.find_param_by_name("filter cutoff"), Some(0));
        assert_eq!(p.find_param_by_name("WAVE"), Some(1));
        assert_eq!(p.find_param_by_name("filter_cutoff"), Some(0));
        assert_eq!(p.find_param_by_name("resonance"), None);
    }

    #[test]
    fn lookup_by_numeric_id() {
        let p = patch();
        assert_eq!(p.param_index_by_id(ParamId(8)), Some(1));
        assert_eq!(p.param_index_by_id(ParamId(99)), None);
    }

    #[test]
    fn writes_are_clamped_and_bad_indices_ignored() {
        let mut p = patch();
        p.set_param(0, 50_000.0);
        p.set_param(1, -3.0);
        p.set_param(5, 1.0);
        assert_eq!((p.get_param(0), p.get_param(1)), (20000.0, 0.0));
        assert_eq!(p.get_param(5), 0.0);
    }

    #[test]
    fn choice_range_follows_labels() {
        let desc = ParamDescriptor::choice("Waveform", "Wave", WAVES, 2);
        assert_eq!((desc.min, desc.max, desc.default), (0.0, 3.0, 2.0));
        assert!(desc.stepped);
        assert_eq!(desc.label(3.0), Some("Triangle"));
        assert_eq!(desc.label(42.0), Some("Triangle"));
    }

    #[test]
    fn toggle_rounds_to_off_or_on() {
        let desc = ParamDescriptor::toggle("Filter Enabled", "Filter", true);
        assert_eq!(desc.default, 1.0);
        assert_eq!(desc.clamp(0.4), 0.0);
        assert_eq!(desc.label(0.7), Some("On"));
    }

    #[test]
    fn continuous_params_have_no_labels() {
        let desc = ParamDescriptor::ratio("Mix", "Mix", 0.5);
        assert_eq!(desc.label(0.5), None);
        assert_eq!(desc.clamp(f32::NAN), 0.5);
        assert_eq!(desc.unit.suffix(), "");
    }
}
