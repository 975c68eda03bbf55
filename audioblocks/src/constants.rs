/// Capacity of every audio block, in `f32` samples.
pub const AUDIO_BLOCK_SAMPLES: usize = 128;

/// Number of blocks in a pool built from [`AudioConfig::default`](crate::config::AudioConfig).
pub const DEFAULT_POOL_BLOCKS: usize = 32;

/// Largest pool a [`BlockPool`](crate::block::BlockPool) can manage.
pub const MAX_POOL_BLOCKS: usize = 1024;

/// Default sample rate in Hz (44.1 kHz nominal, as produced by a 12 MHz-derived codec PLL).
pub const AUDIO_SAMPLE_RATE_EXACT: f32 = 44_117.647;

/// Slots in each node input port queue. Must be a power of two.
pub const PORT_QUEUE_SLOTS: usize = 2;
