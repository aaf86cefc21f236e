//! Channel linking
//!
//! Each channel is followed by its own detector, and the detectors never see
//! each other's state, so the detection pass runs one task per channel on a
//! pool sized to the channel count. Linking waits for every channel to finish
//! its whole pass before taking the element-wise maximum: the maximum is taken
//! over complete envelopes, never over partially detected ones.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::buffer::MultichannelBuffer;
use crate::detector::{Detector, EnvelopeDetector};
use crate::error::{DynamicsError, Result};

/// Runs per-channel detection and combines the envelopes
pub struct ChannelLinker {
    channels: usize,
    // Mono detection runs inline on the caller's thread
    pool: Option<ThreadPool>,
}

impl ChannelLinker {
    /// Create a linker for a fixed number of channels
    pub fn new(channels: usize) -> Result<Self> {
        if channels == 0 {
            return Err(DynamicsError::shape("linker needs at least one channel"));
        }

        let pool = if channels > 1 {
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(channels)
                    .thread_name(|index| format!("soul-dynamics-detect-{}", index))
                    .build()?,
            )
        } else {
            None
        };

        Ok(Self { channels, pool })
    }

    /// Number of channels this linker was built for
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Run every detector over its own channel
    ///
    /// Returns one envelope per channel, in channel order, once all channels
    /// have been processed.
    pub fn detect(
        &self,
        detectors: &mut [EnvelopeDetector],
        buffer: &MultichannelBuffer,
    ) -> Result<Vec<Vec<f32>>> {
        if detectors.len() != buffer.channels() || detectors.len() != self.channels {
            return Err(DynamicsError::Shape(format!(
                "{} detectors for a {}-channel buffer (linker built for {})",
                detectors.len(),
                buffer.channels(),
                self.channels
            )));
        }

        let channels: Vec<&[f32]> = buffer.iter().collect();
        tracing::trace!(
            channels = channels.len(),
            frames = buffer.frames(),
            "Running envelope detection"
        );

        let envelopes: Vec<Vec<f32>> = match &self.pool {
            Some(pool) => pool.install(|| {
                detectors
                    .par_iter_mut()
                    .zip(channels.par_iter())
                    .map(|(detector, samples)| detector.process_all(samples))
                    .collect()
            }),
            None => detectors
                .iter_mut()
                .zip(channels)
                .map(|(detector, samples)| detector.process_all(samples))
                .collect(),
        };

        Ok(envelopes)
    }

    /// Element-wise maximum over complete per-channel envelopes
    pub fn link(envelopes: &[Vec<f32>]) -> Result<Vec<f32>> {
        let Some((first, rest)) = envelopes.split_first() else {
            return Err(DynamicsError::shape("no envelopes to link"));
        };

        let mut linked = first.clone();
        for (index, envelope) in rest.iter().enumerate() {
            if envelope.len() != linked.len() {
                return Err(DynamicsError::Shape(format!(
                    "envelope {} has {} values, expected {}",
                    index + 1,
                    envelope.len(),
                    linked.len()
                )));
            }
            for (out, &value) in linked.iter_mut().zip(envelope) {
                *out = out.max(value);
            }
        }

        tracing::trace!(channels = envelopes.len(), "Linked envelopes");
        Ok(linked)
    }

    /// Detect all channels, then link them into one envelope
    pub fn detect_linked(
        &self,
        detectors: &mut [EnvelopeDetector],
        buffer: &MultichannelBuffer,
    ) -> Result<Vec<f32>> {
        let envelopes = self.detect(detectors, buffer)?;
        Self::link(&envelopes)
    }
}

impl std::fmt::Debug for ChannelLinker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelLinker")
            .field("channels", &self.channels)
            .field("threaded", &self.pool.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::DetectorKind;

    fn detectors(count: usize) -> Vec<EnvelopeDetector> {
        (0..count)
            .map(|_| EnvelopeDetector::new(DetectorKind::SmoothPeak, 1000, 0.005, 0.1).unwrap())
            .collect()
    }

    #[test]
    fn link_takes_elementwise_maximum() {
        let linked =
            ChannelLinker::link(&[vec![0.1, 0.5, 0.3], vec![0.4, 0.2, 0.3], vec![0.0, 0.0, 0.9]])
                .unwrap();
        assert_eq!(linked, vec![0.4, 0.5, 0.9]);
    }

    #[test]
    fn link_rejects_empty_and_ragged_input() {
        assert!(ChannelLinker::link(&[]).is_err());
        assert!(ChannelLinker::link(&[vec![0.0; 3], vec![0.0; 2]]).is_err());
    }

    #[test]
    fn parallel_detection_matches_sequential() {
        let buffer = MultichannelBuffer::from_channels(vec![
            (0..500).map(|i| (i as f32 * 0.05).sin()).collect(),
            (0..500).map(|i| (i as f32 * 0.01).cos() * 0.3).collect(),
            vec![0.0; 500],
            vec![0.7; 500],
        ])
        .unwrap();

        let linker = ChannelLinker::new(4).unwrap();
        let mut parallel = detectors(4);
        let envelopes = linker.detect(&mut parallel, &buffer).unwrap();

        for (index, samples) in buffer.iter().enumerate() {
            let mut detector = detectors(1).remove(0);
            assert_eq!(envelopes[index], detector.process_all(samples), "channel {}", index);
        }
    }

    #[test]
    fn mono_runs_inline() {
        let linker = ChannelLinker::new(1).unwrap();
        assert!(linker.pool.is_none());

        let buffer = MultichannelBuffer::mono(vec![0.5; 100]).unwrap();
        let linked = linker.detect_linked(&mut detectors(1), &buffer).unwrap();
        assert_eq!(linked.len(), 100);
    }

    #[test]
    fn detector_count_must_match() {
        let linker = ChannelLinker::new(2).unwrap();
        let buffer = MultichannelBuffer::from_channels(vec![vec![0.0; 10]; 3]).unwrap();
        assert!(matches!(
            linker.detect(&mut detectors(2), &buffer),
            Err(DynamicsError::Shape(_))
        ));
        assert!(ChannelLinker::new(0).is_err());
    }
}
