//! Planar multichannel sample buffers
//!
//! The compressor works on whole in-memory buffers, one `Vec<f32>` per channel.
//! Construction enforces the shape invariant once so the processing code can
//! index every channel with the same frame count.

use crate::error::{DynamicsError, Result};

/// Planar audio buffer: every channel holds the same number of frames
#[derive(Debug, Clone, PartialEq)]
pub struct MultichannelBuffer {
    channels: Vec<Vec<f32>>,
}

impl MultichannelBuffer {
    /// Build a buffer from per-channel sample vectors
    ///
    /// Fails with a shape error if there are no channels, if any channel is
    /// empty, or if the channels differ in length.
    pub fn from_channels(channels: Vec<Vec<f32>>) -> Result<Self> {
        let Some(first) = channels.first() else {
            return Err(DynamicsError::shape("buffer has no channels"));
        };

        let frames = first.len();
        if frames == 0 {
            return Err(DynamicsError::shape("buffer has no frames"));
        }

        if let Some((index, channel)) = channels
            .iter()
            .enumerate()
            .find(|(_, channel)| channel.len() != frames)
        {
            return Err(DynamicsError::Shape(format!(
                "channel {} has {} frames, expected {}",
                index,
                channel.len(),
                frames
            )));
        }

        Ok(Self { channels })
    }

    /// Single-channel buffer
    pub fn mono(samples: Vec<f32>) -> Result<Self> {
        Self::from_channels(vec![samples])
    }

    /// De-interleave `L, R, L, R, ...` style samples
    pub fn from_interleaved(samples: &[f32], channels: usize) -> Result<Self> {
        if channels == 0 {
            return Err(DynamicsError::shape("channel count must be at least 1"));
        }
        if samples.len() % channels != 0 {
            return Err(DynamicsError::Shape(format!(
                "{} interleaved samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }

        let frames = samples.len() / channels;
        let mut planar = vec![Vec::with_capacity(frames); channels];
        for frame in samples.chunks_exact(channels) {
            for (channel, &sample) in planar.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Self::from_channels(planar)
    }

    /// Interleave back into `L, R, L, R, ...` order
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.frames() * self.channels());
        for frame in 0..self.frames() {
            out.extend(self.channels.iter().map(|channel| channel[frame]));
        }
        out
    }

    /// Number of channels
    pub fn channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    /// Samples of one channel
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Iterate over all channels
    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.channels.iter().map(Vec::as_slice)
    }

    /// Consume the buffer, returning the per-channel vectors
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_equal_length_channels() {
        let buffer = MultichannelBuffer::from_channels(vec![vec![0.1; 8], vec![0.2; 8]]).unwrap();
        assert_eq!(buffer.channels(), 2);
        assert_eq!(buffer.frames(), 8);
        assert_eq!(buffer.channel(1).unwrap()[3], 0.2);
        assert!(buffer.channel(2).is_none());
    }

    #[test]
    fn rejects_ragged_channels() {
        let err = MultichannelBuffer::from_channels(vec![vec![0.0; 8], vec![0.0; 7]]).unwrap_err();
        assert!(matches!(err, DynamicsError::Shape(_)));
        assert!(err.to_string().contains("channel 1 has 7 frames"));
    }

    #[test]
    fn rejects_empty_buffers() {
        assert!(matches!(
            MultichannelBuffer::from_channels(Vec::new()),
            Err(DynamicsError::Shape(_))
        ));
        assert!(matches!(
            MultichannelBuffer::mono(Vec::new()),
            Err(DynamicsError::Shape(_))
        ));
    }

    #[test]
    fn interleaved_layout_is_preserved() {
        let interleaved = [1.0, -1.0, 2.0, -2.0, 3.0, -3.0];
        let buffer = MultichannelBuffer::from_interleaved(&interleaved, 2).unwrap();

        assert_eq!(buffer.channel(0).unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(buffer.channel(1).unwrap(), &[-1.0, -2.0, -3.0]);
        assert_eq!(buffer.to_interleaved(), interleaved);
        assert_eq!(buffer.into_channels()[1], vec![-1.0, -2.0, -3.0]);
    }

    #[test]
    fn interleaved_length_must_divide() {
        assert!(MultichannelBuffer::from_interleaved(&[0.0; 5], 2).is_err());
        assert!(MultichannelBuffer::from_interleaved(&[0.0; 4], 0).is_err());
    }
}
