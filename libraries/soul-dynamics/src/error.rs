//! Error types for dynamics processing

use thiserror::Error;

/// Result type for dynamics operations
pub type Result<T> = std::result::Result<T, DynamicsError>;

/// Errors that can occur while building or running a compressor
#[derive(Error, Debug)]
pub enum DynamicsError {
    /// Sample rate of zero
    #[error("Invalid sample rate: {0} Hz (must be greater than 0)")]
    InvalidSampleRate(u32),

    /// Attack, release or detector time constant that is not a positive number
    #[error("Invalid {name}: {value} s (must be a finite value greater than 0)")]
    InvalidTimeConstant {
        /// Which time constant was rejected
        name: &'static str,
        /// The offending value in seconds
        value: f32,
    },

    /// Buffer whose shape does not fit the operation
    #[error("Shape error: {0}")]
    Shape(String),

    /// Settings could not be loaded or deserialized
    #[error("Settings error: {0}")]
    Settings(String),

    /// Worker pool for channel detection could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl DynamicsError {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }
}

impl From<config::ConfigError> for DynamicsError {
    fn from(err: config::ConfigError) -> Self {
        Self::Settings(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for DynamicsError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(err.to_string())
    }
}
