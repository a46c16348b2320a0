//! Error types for the engine and its configuration.
//!
//! The render path never fails. Errors come only from setup (`prepare`,
//! configuration loading) and from control-side calls that name a
//! parameter or enqueue an event.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by engine setup and control calls.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Sample rate not finite and positive
    #[error("invalid sample rate: {0} (must be finite and > 0)")]
    InvalidSampleRate(f32),

    /// Maximum block size of zero
    #[error("invalid maximum block size: {0} (must be > 0)")]
    InvalidBlockSize(usize),

    /// No parameter with this string id
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// Parameter value that cannot be clamped into range
    #[error("invalid value {value} for parameter '{param}'")]
    InvalidParameterValue {
        /// String id of the parameter.
        param: String,
        /// Rejected value.
        value: f32,
    },

    /// Smoothing coefficient outside `(0, 1]`
    #[error("invalid smoothing coefficient: {0} (must be in (0, 1])")]
    InvalidSmoothing(f32),

    /// Note event queue full; the render thread is not draining it
    #[error("note event queue is full")]
    EventQueueFull,

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while loading or saving a [`SynthConfig`](crate::SynthConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, SynthError>;
