/// Effect chain for offline processing
///
/// Effects run one after another over whole planar buffers. Each effect
/// receives the previous effect's output and returns a new buffer; the
/// caller's buffer is never modified.
use std::time::Instant;

use crate::buffer::MultichannelBuffer;
use crate::error::Result;

/// Trait for whole-buffer audio effects that can be chained together
pub trait AudioEffect: Send {
    /// Process a buffer, returning the processed copy
    fn apply(&mut self, buffer: &MultichannelBuffer) -> Result<MultichannelBuffer>;

    /// Enable/disable the effect
    fn set_enabled(&mut self, enabled: bool);

    /// Check if effect is enabled
    fn is_enabled(&self) -> bool;

    /// Get effect name (for logging)
    fn name(&self) -> &str;
}

/// Chain of audio effects processed in order
pub struct EffectChain {
    effects: Vec<Box<dyn AudioEffect>>,
}

impl EffectChain {
    /// Create a new empty effect chain
    pub fn new() -> Self {
        Self {
            effects: Vec::new(),
        }
    }

    /// Add an effect to the end of the chain
    pub fn add_effect(&mut self, effect: Box<dyn AudioEffect>) {
        self.effects.push(effect);
    }

    /// Run the buffer through every enabled effect
    ///
    /// Stops at the first effect that fails and returns its error.
    pub fn process(&mut self, buffer: &MultichannelBuffer) -> Result<MultichannelBuffer> {
        let mut current = buffer.clone();

        for effect in self.effects.iter_mut().filter(|effect| effect.is_enabled()) {
            let started = Instant::now();
            current = effect.apply(&current)?;
            tracing::debug!(
                effect = effect.name(),
                elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                "Applied effect"
            );
        }

        Ok(current)
    }

    /// Clear all effects from the chain
    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Get number of effects in chain
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Check if chain is empty
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Get effect at index
    pub fn get_effect(&self, index: usize) -> Option<&dyn AudioEffect> {
        self.effects.get(index).map(|e| e.as_ref())
    }

    /// Get mutable effect at index
    pub fn get_effect_mut(&mut self, index: usize) -> Option<&mut (dyn AudioEffect + 'static)> {
        self.effects.get_mut(index).map(|e| e.as_mut())
    }

    /// Enable/disable all effects
    pub fn set_enabled(&mut self, enabled: bool) {
        for effect in &mut self.effects {
            effect.set_enabled(enabled);
        }
    }
}

impl Default for EffectChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DynamicsError;

    struct GainEffect {
        gain: f32,
        enabled: bool,
    }

    impl GainEffect {
        fn boxed(gain: f32) -> Box<dyn AudioEffect> {
            Box::new(Self {
                gain,
                enabled: true,
            })
        }
    }

    impl AudioEffect for GainEffect {
        fn apply(&mut self, buffer: &MultichannelBuffer) -> Result<MultichannelBuffer> {
            MultichannelBuffer::from_channels(
                buffer
                    .iter()
                    .map(|channel| channel.iter().map(|s| s * self.gain).collect())
                    .collect(),
            )
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }

        fn name(&self) -> &str {
            "Gain"
        }
    }

    struct FailingEffect;

    impl AudioEffect for FailingEffect {
        fn apply(&mut self, _buffer: &MultichannelBuffer) -> Result<MultichannelBuffer> {
            Err(DynamicsError::shape("always fails"))
        }

        fn set_enabled(&mut self, _enabled: bool) {}

        fn is_enabled(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "Failing"
        }
    }

    fn stereo_ones() -> MultichannelBuffer {
        MultichannelBuffer::from_channels(vec![vec![1.0; 50], vec![1.0; 50]]).unwrap()
    }

    #[test]
    fn empty_chain() {
        let mut chain = EffectChain::new();
        assert_eq!(chain.len(), 0);
        assert!(chain.is_empty());

        let buffer = stereo_ones();
        assert_eq!(chain.process(&buffer).unwrap(), buffer);
    }

    #[test]
    fn process_chain() {
        let mut chain = EffectChain::new();

        // 0.5 then 2.0: unity overall
        chain.add_effect(GainEffect::boxed(0.5));
        chain.add_effect(GainEffect::boxed(2.0));
        assert_eq!(chain.len(), 2);

        let out = chain.process(&stereo_ones()).unwrap();
        for channel in out.iter() {
            assert!(channel.iter().all(|s| (s - 1.0).abs() < 0.0001));
        }
    }

    #[test]
    fn disabled_effect_bypassed() {
        let mut chain = EffectChain::new();
        chain.add_effect(Box::new(GainEffect {
            gain: 0.0,
            enabled: false,
        }));

        let buffer = stereo_ones();
        assert_eq!(chain.process(&buffer).unwrap(), buffer);
    }

    #[test]
    fn first_error_stops_the_chain() {
        let mut chain = EffectChain::new();
        chain.add_effect(GainEffect::boxed(0.5));
        chain.add_effect(Box::new(FailingEffect));
        chain.add_effect(GainEffect::boxed(2.0));

        assert!(matches!(
            chain.process(&stereo_ones()),
            Err(DynamicsError::Shape(_))
        ));
    }

    #[test]
    fn get_effect() {
        let mut chain = EffectChain::new();
        chain.add_effect(GainEffect::boxed(0.5));

        assert_eq!(chain.get_effect(0).unwrap().name(), "Gain");
        assert!(chain.get_effect(1).is_none());

        chain.get_effect_mut(0).unwrap().set_enabled(false);
        assert!(!chain.get_effect(0).unwrap().is_enabled());
    }

    #[test]
    fn enable_disable_all() {
        let mut chain = EffectChain::new();
        chain.add_effect(GainEffect::boxed(0.5));
        chain.add_effect(GainEffect::boxed(0.5));

        chain.set_enabled(false);

        let buffer = stereo_ones();
        assert_eq!(chain.process(&buffer).unwrap(), buffer);

        chain.clear();
        assert!(chain.is_empty());
    }
}
