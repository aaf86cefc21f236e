//! Soft-knee gain computer
//!
//! Maps an envelope value to a gain multiplier through the static
//! characteristic of a feed-forward compressor:
//!
//! ```text
//! xg <= knee_start            yg = xg
//! knee_start < xg <= knee_end yg = xg + (1/R - 1)(xg - T + W/2)² / 2W
//! xg > knee_end               yg = T + (xg - T) / R
//! ```
//!
//! The quadratic segment meets both straight lines with matching value and
//! slope, so the curve is continuous and differentiable for any knee width.
//! A knee width of 0 leaves no quadratic segment: the hard-knee compressor.

use crate::settings::CompressorSettings;

/// Added to every envelope value before taking the logarithm
pub const ENVELOPE_FLOOR: f32 = 1e-6;

/// Convert a linear amplitude to dB, guarded against `log(0)`
#[inline]
pub fn amplitude_to_db(amplitude: f32) -> f32 {
    20.0 * (amplitude + ENVELOPE_FLOOR).log10()
}

/// Convert dB to a linear multiplier
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Stateless static characteristic with cached knee bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KneeCurve {
    threshold_db: f32,
    ratio: f32,
    knee_db: f32,
    makeup_gain_db: f32,
    inverse_ratio: f32,
    knee_start_db: f32,
    knee_end_db: f32,
}

impl KneeCurve {
    /// Build a curve, silently clamping out-of-range parameters
    ///
    /// Threshold above 0 dB becomes 0, ratio below 1 becomes 1 and a negative
    /// knee becomes 0.
    pub fn new(threshold_db: f32, ratio: f32, knee_db: f32, makeup_gain_db: f32) -> Self {
        let threshold_db = threshold_db.min(0.0);
        let ratio = ratio.max(1.0);
        let knee_db = knee_db.max(0.0);

        Self {
            threshold_db,
            ratio,
            knee_db,
            makeup_gain_db,
            inverse_ratio: 1.0 / ratio,
            knee_start_db: threshold_db - knee_db / 2.0,
            knee_end_db: threshold_db + knee_db / 2.0,
        }
    }

    /// Curve described by compressor settings
    pub fn from_settings(settings: &CompressorSettings) -> Self {
        Self::new(
            settings.threshold_db,
            settings.ratio,
            settings.knee_db,
            settings.makeup_gain_db,
        )
    }

    pub fn threshold_db(&self) -> f32 {
        self.threshold_db
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn knee_db(&self) -> f32 {
        self.knee_db
    }

    pub fn makeup_gain_db(&self) -> f32 {
        self.makeup_gain_db
    }

    /// Lower edge of the knee, `threshold - knee / 2`
    pub fn knee_start_db(&self) -> f32 {
        self.knee_start_db
    }

    /// Upper edge of the knee, `threshold + knee / 2`
    pub fn knee_end_db(&self) -> f32 {
        self.knee_end_db
    }

    /// Output level in dB for an input level in dB
    #[inline]
    pub fn output_level_db(&self, input_db: f32) -> f32 {
        if input_db <= self.knee_start_db {
            input_db
        } else if input_db <= self.knee_end_db {
            // Only reachable with a knee wider than 0
            let over = input_db - self.threshold_db + self.knee_db / 2.0;
            input_db + (self.inverse_ratio - 1.0) * over * over / (2.0 * self.knee_db)
        } else {
            self.threshold_db + (input_db - self.threshold_db) * self.inverse_ratio
        }
    }

    /// Gain in dB (including makeup) for a linear envelope value
    #[inline]
    pub fn gain_db(&self, envelope: f32) -> f32 {
        let input_db = amplitude_to_db(envelope);
        self.output_level_db(input_db) - input_db + self.makeup_gain_db
    }

    /// Linear gain multiplier for a linear envelope value
    #[inline]
    pub fn gain(&self, envelope: f32) -> f32 {
        db_to_gain(self.gain_db(envelope))
    }

    /// Linear gain for every value of an envelope
    pub fn gains(&self, envelope: &[f32]) -> Vec<f32> {
        envelope.iter().map(|&value| self.gain(value)).collect()
    }
}
