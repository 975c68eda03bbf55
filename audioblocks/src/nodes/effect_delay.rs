//! Fixed delay effect built on [`DelayLine`].

use crate::constants::AUDIO_BLOCK_SAMPLES;
use crate::delay_line::DelayLine;
use crate::node::{AudioNode, Ports};

/// Delays its input by a whole number of samples. One input, one output.
///
/// Every tick pushes one frame into the history (silence when no input
/// arrived), so the tail of a delayed signal keeps playing after its source
/// stops.
///
/// # Example
/// ```ignore
/// let mut delay = AudioEffectDelay::new(44_100); // up to ~1 s
/// delay.set_delay_ms(250.0);
/// ```
#[derive(Debug, Clone)]
pub struct AudioEffectDelay {
    line: DelayLine,
    max_delay: usize,
    delay: usize,
    pending_ms: Option<f32>,
}

impl AudioEffectDelay {
    /// Create a delay able to reach `max_delay_samples`, initially 0.
    pub fn new(max_delay_samples: usize) -> Self {
        AudioEffectDelay {
            line: DelayLine::with_min_len(max_delay_samples + AUDIO_BLOCK_SAMPLES),
            max_delay: max_delay_samples,
            delay: 0,
            pending_ms: None,
        }
    }

    /// Set the delay in samples, clamped to the maximum.
    pub fn set_delay_samples(&mut self, samples: usize) {
        self.delay = samples.min(self.max_delay);
        self.pending_ms = None;
    }

    /// Set the delay in milliseconds; converted at the graph's rate on the
    /// next tick.
    pub fn set_delay_ms(&mut self, milliseconds: f32) {
        self.pending_ms = Some(milliseconds);
    }

    /// Current delay in samples.
    pub fn delay_samples(&self) -> usize {
        self.delay
    }

    /// Largest reachable delay in samples.
    pub fn max_delay_samples(&self) -> usize {
        self.max_delay
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.line.clear();
    }
}

impl AudioNode for AudioEffectDelay {
    const NUM_INPUTS: usize = 1;
    const NUM_OUTPUTS: usize = 1;

    fn update(&mut self, ports: &mut Ports<'_>) {
        if let Some(ms) = self.pending_ms.take() {
            let samples = ports.config().ms_to_samples(ms);
            self.delay = samples.min(self.max_delay);
        }

        let input = ports.receive_read_only(0);
        let frame_len = match &input {
            Some(block) => {
                self.line.push_block(block);
                block.len()
            }
            None => {
                let frame_len = ports.config().frame_len;
                for _ in 0..frame_len {
                    self.line.push(0.0);
                }
                frame_len
            }
        };

        if !ports.is_connected(0) {
            return;
        }
        let Some(mut out) = ports.allocate() else {
            return;
        };
        if let Some(block) = &input {
            out.copy_metadata_from(block);
        }
        out.set_len(frame_len);
        self.line.read_delayed_block(self.delay, &mut out);
        ports.transmit(0, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{AudioBlockRef, BlockPool};
    use crate::config::AudioConfig;
    use alloc::sync::Arc;

    fn ramp(pool: &Arc<BlockPool>, start: f32) -> AudioBlockRef {
        let mut block = pool.allocate().unwrap();
        for (i, s) in block.iter_mut().enumerate() {
            *s = start + i as f32;
        }
        block.into_shared()
    }

    fn run(delay: &mut AudioEffectDelay, pool: &Arc<BlockPool>, input: Option<AudioBlockRef>) -> AudioBlockRef {
        let mut inputs = [input];
        let mut outputs = [None];
        let connected = [true];
        let mut ports = Ports::new(pool, &mut inputs, &mut outputs, &connected);
        delay.update(&mut ports);
        drop(ports);
        outputs[0].take().unwrap()
    }

    #[test]
    fn zero_delay_passes_through() {
        let pool = BlockPool::with_capacity(4).unwrap();
        let mut delay = AudioEffectDelay::new(256);
        let out = run(&mut delay, &pool, Some(ramp(&pool, 0.0)));
        assert!(out.iter().enumerate().all(|(i, &s)| s == i as f32));
    }

    #[test]
    fn delay_crosses_block_boundary() {
        let pool = BlockPool::with_capacity(4).unwrap();
        let mut delay = AudioEffectDelay::new(256);
        delay.set_delay_samples(10);

        let first = run(&mut delay, &pool, Some(ramp(&pool, 1.0)));
        assert!(first[..10].iter().all(|&s| s == 0.0));
        assert_eq!(first[10], 1.0);

        let second = run(&mut delay, &pool, Some(ramp(&pool, 129.0)));
        // continues the ramp 10 samples late
        assert_eq!(second[0], 119.0);
        assert_eq!(second[127], 246.0);
    }

    #[test]
    fn tail_plays_after_input_stops() {
        let pool = BlockPool::with_capacity(4).unwrap();
        let mut delay = AudioEffectDelay::new(512);
        delay.set_delay_samples(128);

        let seq = {
            let input = ramp(&pool, 1.0);
            let seq = input.sequence_id();
            let out = run(&mut delay, &pool, Some(input));
            assert_eq!(out.sequence_id(), seq);
            seq
        };
        let tail = run(&mut delay, &pool, None);
        assert_ne!(tail.sequence_id(), seq);
        assert_eq!(tail[0], 1.0);
        assert_eq!(tail[127], 128.0);
    }

    #[test]
    fn delay_ms_uses_graph_rate() {
        let config = AudioConfig::default().with_sample_rate(1_000.0);
        let pool = BlockPool::new(&config).unwrap();
        let mut delay = AudioEffectDelay::new(100);

        delay.set_delay_ms(50.0);
        let _ = run(&mut delay, &pool, None);
        assert_eq!(delay.delay_samples(), 50);

        delay.set_delay_ms(10_000.0);
        let _ = run(&mut delay, &pool, None);
        assert_eq!(delay.delay_samples(), 100);
    }
}
