//! Injected runtime configuration.
//!
//! An [`AudioConfig`] is handed to [`BlockPool::new`](crate::block::BlockPool::new)
//! and from there reaches every node through
//! [`Ports::config`](crate::node::Ports::config). Nothing in the crate reads
//! configuration from global state, so independent graphs with different rates
//! or frame sizes can coexist.

use crate::constants::{
    AUDIO_BLOCK_SAMPLES, AUDIO_SAMPLE_RATE_EXACT, DEFAULT_POOL_BLOCKS, MAX_POOL_BLOCKS,
};
use crate::error::ConfigError;

/// Sample rate, frame size and pool sizing for one graph.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AudioConfig {
    /// Rate the graph runs at, in Hz.
    pub sample_rate_hz: f32,
    /// Samples per block per tick. At most [`AUDIO_BLOCK_SAMPLES`].
    pub frame_len: usize,
    /// Number of blocks in the pool.
    pub pool_blocks: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            sample_rate_hz: AUDIO_SAMPLE_RATE_EXACT,
            frame_len: AUDIO_BLOCK_SAMPLES,
            pool_blocks: DEFAULT_POOL_BLOCKS,
        }
    }
}

impl AudioConfig {
    /// Set the sample rate.
    pub fn with_sample_rate(mut self, sample_rate_hz: f32) -> Self {
        self.sample_rate_hz = sample_rate_hz;
        self
    }

    /// Set the frame length.
    pub fn with_frame_len(mut self, frame_len: usize) -> Self {
        self.frame_len = frame_len;
        self
    }

    /// Set the pool capacity.
    pub fn with_pool_blocks(mut self, pool_blocks: usize) -> Self {
        self.pool_blocks = pool_blocks;
        self
    }

    /// Check every field against the limits the runtime supports.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate_hz));
        }
        if self.frame_len == 0 || self.frame_len > AUDIO_BLOCK_SAMPLES {
            return Err(ConfigError::InvalidFrameLength {
                len: self.frame_len,
                max: AUDIO_BLOCK_SAMPLES,
            });
        }
        if self.pool_blocks == 0 || self.pool_blocks > MAX_POOL_BLOCKS {
            return Err(ConfigError::InvalidPoolCapacity {
                blocks: self.pool_blocks,
                max: MAX_POOL_BLOCKS,
            });
        }
        Ok(())
    }

    /// Samples per millisecond at this rate.
    pub fn samples_per_msec(&self) -> f32 {
        self.sample_rate_hz / 1000.0
    }

    /// Length of one tick in microseconds. `tick()` must finish within it.
    pub fn frame_period_us(&self) -> f32 {
        self.frame_len as f32 * 1_000_000.0 / self.sample_rate_hz
    }

    /// Convert a duration in milliseconds to a whole number of samples.
    pub fn ms_to_samples(&self, milliseconds: f32) -> usize {
        if milliseconds <= 0.0 {
            return 0;
        }
        (milliseconds * self.samples_per_msec() + 0.5) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = AudioConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.frame_len, AUDIO_BLOCK_SAMPLES);
        assert_eq!(config.pool_blocks, DEFAULT_POOL_BLOCKS);
    }

    #[test]
    fn rejects_bad_sample_rate() {
        let config = AudioConfig::default().with_sample_rate(0.0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidSampleRate(0.0)));

        let config = AudioConfig::default().with_sample_rate(f32::NAN);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSampleRate(_))
        ));
    }

    #[test]
    fn rejects_oversized_frame() {
        let config = AudioConfig::default().with_frame_len(AUDIO_BLOCK_SAMPLES + 1);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidFrameLength {
                len: AUDIO_BLOCK_SAMPLES + 1,
                max: AUDIO_BLOCK_SAMPLES,
            })
        );
        assert!(AudioConfig::default().with_frame_len(0).validate().is_err());
    }

    #[test]
    fn rejects_pool_capacity() {
        assert!(AudioConfig::default().with_pool_blocks(0).validate().is_err());
        assert!(AudioConfig::default()
            .with_pool_blocks(MAX_POOL_BLOCKS + 1)
            .validate()
            .is_err());
        assert!(AudioConfig::default()
            .with_pool_blocks(MAX_POOL_BLOCKS)
            .validate()
            .is_ok());
    }

    #[test]
    fn time_conversions() {
        let config = AudioConfig::default()
            .with_sample_rate(48_000.0)
            .with_frame_len(48);
        assert_eq!(config.ms_to_samples(10.0), 480);
        assert_eq!(config.ms_to_samples(-1.0), 0);
        assert!((config.frame_period_us() - 1000.0).abs() < 0.01);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip_preserves_fields() {
        let config = AudioConfig::default().with_frame_len(64);
        let text = serde_json::to_string(&config).unwrap();
        let back: AudioConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
