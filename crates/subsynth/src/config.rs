//! Engine configuration file format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ConfigError, Result, SynthError};
use crate::param_bridge::DEFAULT_SMOOTHING;
use crate::params::SynthParam;

/// Engine setup: audio format, smoothing, and initial parameter values.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 48000.0
/// max_block_size = 512
/// smoothing_coefficient = 0.001
///
/// [params]
/// osc1_type = 2.0        # Square
/// filter_cutoff = 2400.0
/// release = 800.0
/// ```
///
/// Parameter keys are the string ids from [`SynthParam::string_id`]; values
/// are plain units and are clamped to range when applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynthConfig {
    /// Sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f32,

    /// Largest block the host will ask for in one call.
    #[serde(default = "default_max_block_size")]
    pub max_block_size: usize,

    /// Per-sample smoothing coefficient for continuous parameters.
    #[serde(default = "default_smoothing")]
    pub smoothing_coefficient: f32,

    /// Initial parameter values keyed by string id.
    #[serde(default)]
    pub params: BTreeMap<String, f32>,
}

fn default_sample_rate() -> f32 {
    48000.0
}

fn default_max_block_size() -> usize {
    512
}

fn default_smoothing() -> f32 {
    DEFAULT_SMOOTHING
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            max_block_size: default_max_block_size(),
            smoothing_coefficient: default_smoothing(),
            params: BTreeMap::new(),
        }
    }
}

impl SynthConfig {
    /// Set the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the maximum block size.
    pub fn with_max_block_size(mut self, max_block_size: usize) -> Self {
        self.max_block_size = max_block_size;
        self
    }

    /// Set an initial parameter value.
    pub fn with_param(mut self, param: SynthParam, value: f32) -> Self {
        self.params.insert(param.string_id().to_owned(), value);
        self
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> std::result::Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> std::result::Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the audio format, smoothing coefficient and parameter table.
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(SynthError::InvalidSampleRate(self.sample_rate));
        }
        if self.max_block_size == 0 {
            return Err(SynthError::InvalidBlockSize(self.max_block_size));
        }
        if !self.smoothing_coefficient.is_finite()
            || self.smoothing_coefficient <= 0.0
            || self.smoothing_coefficient > 1.0
        {
            return Err(SynthError::InvalidSmoothing(self.smoothing_coefficient));
        }
        self.resolved_params().map(|_| ())
    }

    /// Parameter entries resolved to [`SynthParam`]s, sorted by string id.
    ///
    /// Unknown ids and non-finite values are errors; out-of-range values are
    /// left for the engine to clamp.
    pub fn resolved_params(&self) -> Result<Vec<(SynthParam, f32)>> {
        self.params
            .iter()
            .map(|(id, &value)| {
                let param = SynthParam::from_string_id(id)
                    .ok_or_else(|| SynthError::UnknownParameter(id.clone()))?;
                if !value.is_finite() {
                    return Err(SynthError::InvalidParameterValue {
                        param: id.clone(),
                        value,
                    });
                }
                Ok((param, value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = SynthConfig::from_toml("").unwrap();
        assert_eq!(config, SynthConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_params_table() {
        let config = SynthConfig::from_toml(
            r#"
            sample_rate = 44100.0
            max_block_size = 256

            [params]
            filter_cutoff = 2400.0
            osc1_type = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(config.sample_rate, 44100.0);
        assert_eq!(config.max_block_size, 256);
        let params = config.resolved_params().unwrap();
        assert!(params.contains(&(SynthParam::FilterCutoff, 2400.0)));
        assert!(params.contains(&(SynthParam::Osc1Type, 2.0)));
    }

    #[test]
    fn test_unknown_param_rejected() {
        let mut config = SynthConfig::default();
        config.params.insert("detune".into(), 7.0);
        assert!(matches!(
            config.validate(),
            Err(SynthError::UnknownParameter(id)) if id == "detune"
        ));
    }

    #[test]
    fn test_invalid_audio_format_rejected() {
        assert!(matches!(
            SynthConfig::default().with_sample_rate(0.0).validate(),
            Err(SynthError::InvalidSampleRate(_))
        ));
        assert!(matches!(
            SynthConfig::default().with_max_block_size(0).validate(),
            Err(SynthError::InvalidBlockSize(0))
        ));
        let mut config = SynthConfig::default();
        config.smoothing_coefficient = 1.5;
        assert!(matches!(
            config.validate(),
            Err(SynthError::InvalidSmoothing(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SynthConfig::default()
            .with_param(SynthParam::Release, 800.0)
            .with_param(SynthParam::MasterGain, -6.0);
        let text = config.to_toml().unwrap();
        assert_eq!(SynthConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        assert!(matches!(
            SynthConfig::from_toml("sample_rate = \"fast\""),
            Err(ConfigError::TomlParse(_))
        ));
    }
}
