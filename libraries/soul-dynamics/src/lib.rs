//! Dynamic range compression for Soul Player
//!
//! This crate provides:
//! - Five envelope detectors (level, RMS, peak, smooth peak, level-corrected peak)
//! - A soft-knee gain computer with threshold, ratio, knee width and makeup gain
//! - Linked multichannel compression: per-channel detection in parallel, one
//!   shared gain curve for every channel
//! - An offline effect chain the compressor plugs into
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │ Channel 0   │ ──► │  Detector 0  │ ──┐ │             │
//! ├─────────────┤     ├──────────────┤   ├►│ Link (max)  │
//! │ Channel N   │ ──► │  Detector N  │ ──┘ │             │
//! └─────────────┘     └──────────────┘     └──────┬──────┘
//!                                                 ▼
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │ Output      │ ◄── │ × gain       │ ◄── │ Knee curve  │
//! └─────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! Everything works on whole in-memory buffers; there is no streaming mode.
//!
//! # Example
//!
//! ```rust
//! use soul_dynamics::{Compressor, CompressorSettings, MultichannelBuffer};
//!
//! # fn example() -> soul_dynamics::Result<()> {
//! let settings = CompressorSettings::moderate().with_sample_rate(48000);
//! let mut compressor = Compressor::linked(settings, 2)?;
//!
//! let left = vec![0.8; 4800];
//! let right = vec![0.0; 4800];
//! let buffer = MultichannelBuffer::from_channels(vec![left, right])?;
//!
//! let compressed = compressor.apply_linked(&buffer)?;
//! assert_eq!(compressed.channels(), 2);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod buffer;
mod chain;
mod compressor;
pub mod detector;
mod error;
pub mod gain;
mod linker;
mod settings;

pub use buffer::MultichannelBuffer;
pub use chain::{AudioEffect, EffectChain};
pub use compressor::Compressor;
pub use detector::{Detector, DetectorKind, EnvelopeDetector};
pub use error::{DynamicsError, Result};
pub use gain::{KneeCurve, ENVELOPE_FLOOR};
pub use linker::ChannelLinker;
pub use settings::{CompressorSettings, ENV_PREFIX};
