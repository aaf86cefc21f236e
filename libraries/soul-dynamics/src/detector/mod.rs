//! Envelope detectors
//!
//! Every detector is a one-pole recursive filter `state = f(|x|, state_prev)`
//! that turns a raw sample stream into a non-negative envelope. The state
//! starts at zero and is advanced once per sample, strictly in time order,
//! so a loud onset always produces an attack ramp from silence.
//!
//! Detectors have no reset: a fresh run needs a freshly built detector.

mod level;
mod peak;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DynamicsError, Result};

pub use level::{LevelDetector, RmsDetector};
pub use peak::{LevelCorrectedPeakDetector, PeakDetector, SmoothPeakDetector};

/// A stateful envelope follower
pub trait Detector: Send {
    /// Feed one sample and return the updated envelope value
    fn process(&mut self, sample: f32) -> f32;

    /// Last envelope value produced (0.0 before the first sample)
    fn envelope(&self) -> f32;

    /// Run the detector over a whole channel, carrying state across samples
    fn process_all(&mut self, samples: &[f32]) -> Vec<f32> {
        samples.iter().map(|&sample| self.process(sample)).collect()
    }
}

/// Selects one of the detector algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    /// Symmetric one-pole smoothing of the rectified signal
    Level,
    /// Peak follower with a hard rise/fall split
    Peak,
    /// One-pole smoothing of the squared signal (mean square)
    Rms,
    /// Peak follower integrating the signed difference
    #[default]
    SmoothPeak,
    /// Level follower on the rise, pure decay on the fall
    LevelCorrectedPeak,
}

/// Domain of the values a detector produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeScale {
    /// Linear amplitude, comparable with `|sample|`
    Amplitude,
    /// Mean square (power), comparable with `sample²`
    Power,
}

impl EnvelopeScale {
    /// Convert an envelope value of this scale to linear amplitude
    #[inline]
    pub fn to_amplitude(self, value: f32) -> f32 {
        match self {
            Self::Amplitude => value,
            Self::Power => value.max(0.0).sqrt(),
        }
    }
}

impl DetectorKind {
    /// All detector kinds, in declaration order
    pub const ALL: [Self; 5] = [
        Self::Level,
        Self::Peak,
        Self::Rms,
        Self::SmoothPeak,
        Self::LevelCorrectedPeak,
    ];

    /// Whether this detector tracks amplitude or power
    pub fn scale(self) -> EnvelopeScale {
        match self {
            Self::Rms => EnvelopeScale::Power,
            _ => EnvelopeScale::Amplitude,
        }
    }

    /// Whether the detector uses separate attack and release times
    ///
    /// Level and RMS detectors have a single time constant.
    pub fn has_release(self) -> bool {
        !matches!(self, Self::Level | Self::Rms)
    }

    /// Name used for settings persistence
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Level => "level",
            Self::Peak => "peak",
            Self::Rms => "rms",
            Self::SmoothPeak => "smooth_peak",
            Self::LevelCorrectedPeak => "level_corrected_peak",
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectorKind {
    type Err = DynamicsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "level" => Ok(Self::Level),
            "peak" => Ok(Self::Peak),
            "rms" => Ok(Self::Rms),
            "smooth_peak" | "smoothpeak" => Ok(Self::SmoothPeak),
            "level_corrected_peak" | "levelcorrectedpeak" => Ok(Self::LevelCorrectedPeak),
            other => Err(DynamicsError::Settings(format!(
                "unknown detector kind: {}",
                other
            ))),
        }
    }
}

/// Concrete detector selected by [`DetectorKind`]
#[derive(Debug, Clone)]
pub enum EnvelopeDetector {
    Level(LevelDetector),
    Peak(PeakDetector),
    Rms(RmsDetector),
    SmoothPeak(SmoothPeakDetector),
    LevelCorrectedPeak(LevelCorrectedPeakDetector),
}

impl EnvelopeDetector {
    /// Build a detector of the given kind
    ///
    /// Level and RMS detectors use `attack_secs` as their only time constant;
    /// `release_secs` is ignored (and not validated) for them.
    pub fn new(kind: DetectorKind, sample_rate: u32, attack_secs: f32, release_secs: f32) -> Result<Self> {
        let detector = match kind {
            DetectorKind::Level => Self::Level(LevelDetector::new(sample_rate, attack_secs)?),
            DetectorKind::Rms => Self::Rms(RmsDetector::new(sample_rate, attack_secs)?),
            DetectorKind::Peak => {
                Self::Peak(PeakDetector::new(sample_rate, attack_secs, release_secs)?)
            }
            DetectorKind::SmoothPeak => Self::SmoothPeak(SmoothPeakDetector::new(
                sample_rate,
                attack_secs,
                release_secs,
            )?),
            DetectorKind::LevelCorrectedPeak => Self::LevelCorrectedPeak(
                LevelCorrectedPeakDetector::new(sample_rate, attack_secs, release_secs)?,
            ),
        };
        Ok(detector)
    }

    /// Kind of the wrapped detector
    pub fn kind(&self) -> DetectorKind {
        match self {
            Self::Level(_) => DetectorKind::Level,
            Self::Peak(_) => DetectorKind::Peak,
            Self::Rms(_) => DetectorKind::Rms,
            Self::SmoothPeak(_) => DetectorKind::SmoothPeak,
            Self::LevelCorrectedPeak(_) => DetectorKind::LevelCorrectedPeak,
        }
    }
}

impl Detector for EnvelopeDetector {
    #[inline]
    fn process(&mut self, sample: f32) -> f32 {
        match self {
            Self::Level(d) => d.process(sample),
            Self::Peak(d) => d.process(sample),
            Self::Rms(d) => d.process(sample),
            Self::SmoothPeak(d) => d.process(sample),
            Self::LevelCorrectedPeak(d) => d.process(sample),
        }
    }

    fn envelope(&self) -> f32 {
        match self {
            Self::Level(d) => d.envelope(),
            Self::Peak(d) => d.envelope(),
            Self::Rms(d) => d.envelope(),
            Self::SmoothPeak(d) => d.envelope(),
            Self::LevelCorrectedPeak(d) => d.envelope(),
        }
    }
}

/// One-pole decay coefficient `exp(-1 / (time_constant * sample_rate))`
pub fn decay_coefficient(time_constant_secs: f32, sample_rate: u32) -> f32 {
    (-1.0 / (f64::from(time_constant_secs) * f64::from(sample_rate))).exp() as f32
}

pub(crate) fn check_sample_rate(sample_rate: u32) -> Result<()> {
    if sample_rate == 0 {
        return Err(DynamicsError::InvalidSampleRate(sample_rate));
    }
    Ok(())
}

pub(crate) fn check_time_constant(name: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DynamicsError::InvalidTimeConstant { name, value })
    }
}
