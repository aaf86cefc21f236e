//! Compressor settings
//!
//! Settings are plain data: they can be written by hand, deserialized from a
//! settings file, or taken from one of the presets. Out-of-range values are
//! corrected by [`CompressorSettings::validated`] rather than rejected, except
//! for the sample rate and time constants which fail compressor construction.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detector::DetectorKind;
use crate::error::Result;

/// Environment variable prefix for settings overrides (`SOUL_COMPRESSOR_RATIO=8`)
pub const ENV_PREFIX: &str = "SOUL_COMPRESSOR";

/// Compressor settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressorSettings {
    /// Attack time in milliseconds
    /// How quickly the envelope follows a rising level
    #[serde(default = "default_attack_ms")]
    pub attack_ms: f32,

    /// Release time in milliseconds
    /// How quickly the envelope lets go of a falling level
    #[serde(default = "default_release_ms")]
    pub release_ms: f32,

    /// Threshold in dB (at most 0)
    #[serde(default = "default_threshold_db")]
    pub threshold_db: f32,

    /// Ratio (at least 1.0, e.g. 4.0 means 4:1)
    #[serde(default = "default_ratio")]
    pub ratio: f32,

    /// Knee width in dB (0 = hard knee)
    #[serde(default = "default_knee_db")]
    pub knee_db: f32,

    /// Makeup gain in dB, applied after compression
    #[serde(default)]
    pub makeup_gain_db: f32,

    /// Sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Envelope detector algorithm
    #[serde(default)]
    pub detector: DetectorKind,
}

impl CompressorSettings {
    /// Create default compressor settings
    /// - Attack: 10 ms
    /// - Release: 200 ms
    /// - Threshold: -12 dB
    /// - Ratio: 4:1
    /// - Soft knee: 6 dB
    /// - Makeup gain: 0 dB
    /// - 44.1 kHz, smooth peak detector
    pub fn new() -> Self {
        Self {
            attack_ms: default_attack_ms(),
            release_ms: default_release_ms(),
            threshold_db: default_threshold_db(),
            ratio: default_ratio(),
            knee_db: default_knee_db(),
            makeup_gain_db: 0.0,
            sample_rate: default_sample_rate(),
            detector: DetectorKind::default(),
        }
    }

    /// Gentle compression (vocals, acoustic)
    pub fn gentle() -> Self {
        Self {
            attack_ms: 20.0,
            release_ms: 250.0,
            threshold_db: -18.0,
            ratio: 2.0,
            knee_db: 10.0,
            makeup_gain_db: 2.0,
            ..Self::new()
        }
    }

    /// Moderate compression (mix bus)
    pub fn moderate() -> Self {
        Self {
            attack_ms: 10.0,
            release_ms: 150.0,
            threshold_db: -16.0,
            ratio: 4.0,
            knee_db: 6.0,
            makeup_gain_db: 3.0,
            ..Self::new()
        }
    }

    /// Aggressive compression, close to limiting
    pub fn aggressive() -> Self {
        Self {
            attack_ms: 1.0,
            release_ms: 50.0,
            threshold_db: -10.0,
            ratio: 10.0,
            knee_db: 2.0,
            makeup_gain_db: 4.0,
            detector: DetectorKind::LevelCorrectedPeak,
            ..Self::new()
        }
    }

    /// Same settings at another sample rate
    pub fn with_sample_rate(self, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..self
        }
    }

    /// Same settings with another detector
    pub fn with_detector(self, detector: DetectorKind) -> Self {
        Self { detector, ..self }
    }

    /// Apply the silent corrections
    ///
    /// Threshold above 0 dB becomes 0, ratio below 1 becomes 1, negative knee
    /// becomes 0. Everything else is left for construction to check.
    pub fn validated(mut self) -> Self {
        if self.threshold_db > 0.0 {
            tracing::debug!(threshold_db = self.threshold_db, "Clamping threshold to 0 dB");
            self.threshold_db = 0.0;
        }
        if self.ratio < 1.0 {
            tracing::debug!(ratio = self.ratio, "Clamping ratio to 1:1");
            self.ratio = 1.0;
        }
        if self.knee_db < 0.0 {
            tracing::debug!(knee_db = self.knee_db, "Clamping knee width to 0 dB");
            self.knee_db = 0.0;
        }
        self
    }

    /// Attack time in seconds
    pub fn attack_secs(&self) -> f32 {
        self.attack_ms / 1000.0
    }

    /// Release time in seconds
    pub fn release_secs(&self) -> f32 {
        self.release_ms / 1000.0
    }

    /// Load settings from a file, then apply `SOUL_COMPRESSOR_*` environment overrides
    ///
    /// The file format (TOML, JSON, YAML, ...) is taken from the extension.
    /// Missing keys fall back to the defaults of [`CompressorSettings::new`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let settings: Self = settings.try_deserialize()?;
        tracing::debug!(path = %path.display(), ?settings, "Loaded compressor settings");
        Ok(settings)
    }
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self::new()
    }
}

// Default values
fn default_attack_ms() -> f32 {
    10.0
}

fn default_release_ms() -> f32 {
    200.0
}

fn default_threshold_db() -> f32 {
    -12.0
}

fn default_ratio() -> f32 {
    4.0
}

fn default_knee_db() -> f32 {
    6.0
}

fn default_sample_rate() -> u32 {
    44100
}
