//! Single time constant detectors

use super::{check_sample_rate, check_time_constant, decay_coefficient, Detector};
use crate::error::Result;

/// Symmetric one-pole smoothing of the rectified signal
///
/// `y[n] = α·y[n-1] + (1 - α)·|x[n]|`
#[derive(Debug, Clone)]
pub struct LevelDetector {
    alpha: f32,
    envelope: f32,
}

impl LevelDetector {
    /// Create a level detector with one time constant in seconds
    pub fn new(sample_rate: u32, time_constant_secs: f32) -> Result<Self> {
        check_sample_rate(sample_rate)?;
        let time_constant = check_time_constant("time constant", time_constant_secs)?;
        Ok(Self {
            alpha: decay_coefficient(time_constant, sample_rate),
            envelope: 0.0,
        })
    }
}

impl Detector for LevelDetector {
    #[inline]
    fn process(&mut self, sample: f32) -> f32 {
        self.envelope = self.alpha * self.envelope + (1.0 - self.alpha) * sample.abs();
        self.envelope
    }

    fn envelope(&self) -> f32 {
        self.envelope
    }
}

/// One-pole smoothing of the squared signal
///
/// The output is a mean square, not an amplitude: take the square root before
/// comparing it against linear levels.
#[derive(Debug, Clone)]
pub struct RmsDetector {
    alpha: f32,
    envelope: f32,
}

impl RmsDetector {
    /// Create an RMS detector with one time constant in seconds
    pub fn new(sample_rate: u32, time_constant_secs: f32) -> Result<Self> {
        check_sample_rate(sample_rate)?;
        let time_constant = check_time_constant("time constant", time_constant_secs)?;
        Ok(Self {
            alpha: decay_coefficient(time_constant, sample_rate),
            envelope: 0.0,
        })
    }
}

impl Detector for RmsDetector {
    #[inline]
    fn process(&mut self, sample: f32) -> f32 {
        self.envelope = self.alpha * self.envelope + (1.0 - self.alpha) * sample * sample;
        self.envelope
    }

    fn envelope(&self) -> f32 {
        self.envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_is_symmetric_in_sign() {
        let mut pos = LevelDetector::new(48000, 0.01).unwrap();
        let mut neg = LevelDetector::new(48000, 0.01).unwrap();
        for _ in 0..100 {
            assert_eq!(pos.process(0.5), neg.process(-0.5));
        }
    }

    #[test]
    fn level_settles_on_constant_input() {
        let mut detector = LevelDetector::new(1000, 0.01).unwrap();
        let out = detector.process_all(&vec![0.8; 1000]);
        assert!((out[999] - 0.8).abs() < 1e-4, "got {}", out[999]);
        // Monotonic rise from silence
        assert!(out.windows(2).all(|w| w[1] >= w[0] - 1e-6));
    }

    #[test]
    fn level_first_step_uses_alpha() {
        let mut detector = LevelDetector::new(1000, 0.01).unwrap();
        let alpha = (-0.1f32).exp();
        let first = detector.process(1.0);
        assert!((first - (1.0 - alpha)).abs() < 1e-6);
    }

    #[test]
    fn rms_tracks_mean_square() {
        let mut detector = RmsDetector::new(1000, 0.01).unwrap();
        let out = detector.process_all(&vec![-0.5; 2000]);
        assert!((out[1999] - 0.25).abs() < 1e-4, "got {}", out[1999]);
    }

    #[test]
    fn rms_of_alternating_signal_matches_amplitude_squared() {
        let mut detector = RmsDetector::new(1000, 0.05).unwrap();
        let input: Vec<f32> = (0..5000).map(|i| if i % 2 == 0 { 0.6 } else { -0.6 }).collect();
        let out = detector.process_all(&input);
        assert!((out[4999] - 0.36).abs() < 1e-3);
    }
}
