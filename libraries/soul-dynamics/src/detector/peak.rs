//! Attack/release detectors

use super::{check_sample_rate, check_time_constant, decay_coefficient, Detector};
use crate::error::Result;

fn attack_release_coefficients(sample_rate: u32, attack_secs: f32, release_secs: f32) -> Result<(f32, f32)> {
    check_sample_rate(sample_rate)?;
    let attack = check_time_constant("attack time", attack_secs)?;
    let release = check_time_constant("release time", release_secs)?;
    Ok((
        decay_coefficient(attack, sample_rate),
        decay_coefficient(release, sample_rate),
    ))
}

/// Peak follower
///
/// Decays with the release coefficient every sample and only adds the
/// positive part of `|x| - y[n-1]`, scaled by the attack coefficient:
///
/// `y[n] = r·y[n-1] + (1 - a)·max(|x[n]| - y[n-1], 0)`
#[derive(Debug, Clone)]
pub struct PeakDetector {
    attack_coeff: f32,
    release_coeff: f32,
    envelope: f32,
}

impl PeakDetector {
    pub fn new(sample_rate: u32, attack_secs: f32, release_secs: f32) -> Result<Self> {
        let (attack_coeff, release_coeff) =
            attack_release_coefficients(sample_rate, attack_secs, release_secs)?;
        Ok(Self {
            attack_coeff,
            release_coeff,
            envelope: 0.0,
        })
    }
}

impl Detector for PeakDetector {
    #[inline]
    fn process(&mut self, sample: f32) -> f32 {
        let rise = (sample.abs() - self.envelope).max(0.0);
        self.envelope = self.release_coeff * self.envelope + (1.0 - self.attack_coeff) * rise;
        self.envelope
    }

    fn envelope(&self) -> f32 {
        self.envelope
    }
}

/// Branching peak follower
///
/// Rising input is smoothed toward `|x|` with the attack coefficient; on a
/// falling or flat input the envelope only decays with the release coefficient.
#[derive(Debug, Clone)]
pub struct LevelCorrectedPeakDetector {
    attack_coeff: f32,
    release_coeff: f32,
    envelope: f32,
}

impl LevelCorrectedPeakDetector {
    pub fn new(sample_rate: u32, attack_secs: f32, release_secs: f32) -> Result<Self> {
        let (attack_coeff, release_coeff) =
            attack_release_coefficients(sample_rate, attack_secs, release_secs)?;
        Ok(Self {
            attack_coeff,
            release_coeff,
            envelope: 0.0,
        })
    }
}

impl Detector for LevelCorrectedPeakDetector {
    #[inline]
    fn process(&mut self, sample: f32) -> f32 {
        let rectified = sample.abs();
        self.envelope = if rectified > self.envelope {
            self.attack_coeff * self.envelope + (1.0 - self.attack_coeff) * rectified
        } else {
            self.release_coeff * self.envelope
        };
        self.envelope
    }

    fn envelope(&self) -> f32 {
        self.envelope
    }
}

/// Peak follower without a branch discontinuity
///
/// Integrates the signed difference `|x| - y[n-1]`, scaled by the attack rate
/// when positive and the release rate otherwise.
#[derive(Debug, Clone)]
pub struct SmoothPeakDetector {
    // Rates are `1 - coefficient`: the fraction of the gap closed per sample
    attack_rate: f32,
    release_rate: f32,
    envelope: f32,
}

impl SmoothPeakDetector {
    pub fn new(sample_rate: u32, attack_secs: f32, release_secs: f32) -> Result<Self> {
        let (attack_coeff, release_coeff) =
            attack_release_coefficients(sample_rate, attack_secs, release_secs)?;
        Ok(Self {
            attack_rate: 1.0 - attack_coeff,
            release_rate: 1.0 - release_coeff,
            envelope: 0.0,
        })
    }
}

impl Detector for SmoothPeakDetector {
    #[inline]
    fn process(&mut self, sample: f32) -> f32 {
        let delta = sample.abs() - self.envelope;
        let rate = if delta > 0.0 {
            self.attack_rate
        } else {
            self.release_rate
        };
        self.envelope += rate * delta;
        self.envelope
    }

    fn envelope(&self) -> f32 {
        self.envelope
    }
}
