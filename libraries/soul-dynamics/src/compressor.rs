//! Dynamic Range Compressor
//!
//! Feed-forward design over whole buffers:
//! 1. Envelope detection, one detector per channel
//! 2. Linking: element-wise maximum of the channel envelopes
//! 3. Soft-knee gain computation on the linked envelope
//! 4. Every channel multiplied by the same gain vector
//!
//! Applying the same gain to all channels keeps the stereo image in place when
//! only one side is loud.
//!
//! The detectors are the only state. A second call to `apply` continues the
//! envelope from where the previous call stopped, as if both buffers had been
//! one; build a new compressor for an independent run.

use crate::buffer::MultichannelBuffer;
use crate::chain::AudioEffect;
use crate::detector::{check_sample_rate, Detector, DetectorKind, EnvelopeDetector, EnvelopeScale};
use crate::error::{DynamicsError, Result};
use crate::gain::KneeCurve;
use crate::linker::ChannelLinker;
use crate::settings::CompressorSettings;

/// Dynamic range compressor with linked multichannel detection
#[derive(Debug)]
pub struct Compressor {
    settings: CompressorSettings,
    curve: KneeCurve,
    scale: EnvelopeScale,
    detectors: Vec<EnvelopeDetector>,
    linker: ChannelLinker,
    enabled: bool,
}

impl Compressor {
    /// Create a single-channel compressor
    pub fn new(settings: CompressorSettings) -> Result<Self> {
        Self::linked(settings, 1)
    }

    /// Create a compressor whose `channels` detectors share one gain curve
    ///
    /// Threshold, ratio and knee are clamped silently. A zero sample rate or a
    /// non-positive attack/release time fails.
    pub fn linked(settings: CompressorSettings, channels: usize) -> Result<Self> {
        let settings = settings.validated();
        check_sample_rate(settings.sample_rate)?;

        let detectors = (0..channels)
            .map(|_| {
                EnvelopeDetector::new(
                    settings.detector,
                    settings.sample_rate,
                    settings.attack_secs(),
                    settings.release_secs(),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        let linker = ChannelLinker::new(channels)?;
        let curve = KneeCurve::from_settings(&settings);

        tracing::debug!(
            channels,
            detector = %settings.detector,
            threshold_db = curve.threshold_db(),
            ratio = curve.ratio(),
            knee_start_db = curve.knee_start_db(),
            knee_end_db = curve.knee_end_db(),
            makeup_gain_db = curve.makeup_gain_db(),
            "Created compressor"
        );

        Ok(Self {
            settings,
            curve,
            scale: settings.detector.scale(),
            detectors,
            linker,
            enabled: true,
        })
    }

    /// Settings after clamping
    pub fn settings(&self) -> CompressorSettings {
        self.settings
    }

    /// Static characteristic in use
    pub fn curve(&self) -> &KneeCurve {
        &self.curve
    }

    /// Number of channels (one detector each)
    pub fn channels(&self) -> usize {
        self.detectors.len()
    }

    /// Detector algorithm in use
    pub fn detector_kind(&self) -> DetectorKind {
        self.settings.detector
    }

    /// Linked envelope of a buffer, as linear amplitude
    ///
    /// Advances the detector state.
    pub fn envelope(&mut self, buffer: &MultichannelBuffer) -> Result<Vec<f32>> {
        self.check_channels(buffer.channels())?;
        let mut envelope = self.linker.detect_linked(&mut self.detectors, buffer)?;
        self.to_amplitude(&mut envelope);
        Ok(envelope)
    }

    /// Linear gain for each value of an amplitude envelope
    pub fn gain(&self, envelope: &[f32]) -> Vec<f32> {
        self.curve.gains(envelope)
    }

    /// Compress a single channel
    ///
    /// Returns a new buffer; the input is left untouched. Fails with a shape
    /// error on an empty slice, or when the compressor was built for more than
    /// one channel.
    pub fn apply(&mut self, samples: &[f32]) -> Result<Vec<f32>> {
        if self.detectors.len() != 1 {
            return Err(DynamicsError::Shape(format!(
                "{}-channel linked compressor given a single-channel buffer",
                self.detectors.len()
            )));
        }
        if samples.is_empty() {
            return Err(DynamicsError::shape("buffer has no frames"));
        }

        let mut envelope = self.detectors[0].process_all(samples);
        self.to_amplitude(&mut envelope);

        Ok(samples
            .iter()
            .zip(self.gain(&envelope))
            .map(|(&sample, gain)| sample * gain)
            .collect())
    }

    /// Compress all channels with one shared gain curve
    pub fn apply_linked(&mut self, buffer: &MultichannelBuffer) -> Result<MultichannelBuffer> {
        let envelope = self.envelope(buffer)?;
        let gains = self.gain(&envelope);

        let channels = buffer
            .iter()
            .map(|channel| {
                channel
                    .iter()
                    .zip(&gains)
                    .map(|(&sample, &gain)| sample * gain)
                    .collect()
            })
            .collect();

        MultichannelBuffer::from_channels(channels)
    }

    fn check_channels(&self, channels: usize) -> Result<()> {
        if channels != self.detectors.len() {
            return Err(DynamicsError::Shape(format!(
                "compressor built for {} channels given a {}-channel buffer",
                self.detectors.len(),
                channels
            )));
        }
        Ok(())
    }

    fn to_amplitude(&self, envelope: &mut [f32]) {
        if self.scale == EnvelopeScale::Power {
            for value in envelope.iter_mut() {
                *value = self.scale.to_amplitude(*value);
            }
        }
    }
}

impl AudioEffect for Compressor {
    fn apply(&mut self, buffer: &MultichannelBuffer) -> Result<MultichannelBuffer> {
        if !self.enabled {
            return Ok(buffer.clone());
        }
        self.apply_linked(buffer)
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn name(&self) -> &str {
        match self.detectors.len() {
            1 => "Mono Compressor",
            2 => "Stereo Compressor",
            _ => "Linked Compressor",
        }
    }
}
