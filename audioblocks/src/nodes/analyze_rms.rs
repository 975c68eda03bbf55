//! RMS (root mean square) level analyzer.

use alloc::sync::Arc;

use crate::dsp::sum_squares;
use crate::node::{AudioNode, Ports};
use crate::probe::LevelProbe;

/// RMS level analyzer. Analyzer node: 1 input, 0 outputs.
///
/// Accumulates the sum of squares over `window_blocks` input blocks and
/// publishes `sqrt(sum / count)` to its [`LevelProbe`].
#[derive(Debug)]
pub struct AudioAnalyzeRms {
    probe: Arc<LevelProbe>,
    window_blocks: u32,
    blocks: u32,
    accum: f64,
    count: usize,
}

impl AudioAnalyzeRms {
    /// Publish after every block.
    pub fn new() -> Self {
        Self::with_window(1)
    }

    /// Publish once per `window_blocks` blocks (minimum 1).
    pub fn with_window(window_blocks: u32) -> Self {
        AudioAnalyzeRms {
            probe: Arc::new(LevelProbe::new()),
            window_blocks: window_blocks.max(1),
            blocks: 0,
            accum: 0.0,
            count: 0,
        }
    }

    /// Shared handle to the published reading.
    pub fn probe(&self) -> Arc<LevelProbe> {
        Arc::clone(&self.probe)
    }

    /// Whether a reading arrived since the last [`read`](Self::read).
    pub fn available(&self) -> bool {
        self.probe.available()
    }

    /// Take the latest reading.
    pub fn read(&self) -> f32 {
        self.probe.read()
    }
}

impl Default for AudioAnalyzeRms {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioNode for AudioAnalyzeRms {
    const NUM_INPUTS: usize = 1;
    const NUM_OUTPUTS: usize = 0;

    fn update(&mut self, ports: &mut Ports<'_>) {
        let Some(input) = ports.receive_read_only(0) else {
            return;
        };
        self.accum += sum_squares(&input);
        self.count += input.len();
        self.blocks += 1;

        if self.blocks >= self.window_blocks {
            let rms = if self.count == 0 {
                0.0
            } else {
                libm::sqrt(self.accum / self.count as f64) as f32
            };
            self.probe.publish(rms);
            self.accum = 0.0;
            self.count = 0;
            self.blocks = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{AudioBlockRef, BlockPool};
    use approx::assert_relative_eq;

    fn feed(node: &mut AudioAnalyzeRms, pool: &Arc<BlockPool>, value: f32) {
        let mut block = pool.allocate().unwrap();
        block.fill(value);
        let mut inputs = [Some(block.into_shared())];
        let mut outputs: [Option<AudioBlockRef>; 0] = [];
        let mut ports = Ports::new(pool, &mut inputs, &mut outputs, &[]);
        node.update(&mut ports);
    }

    #[test]
    fn rms_of_dc() {
        let pool = BlockPool::with_capacity(2).unwrap();
        let mut rms = AudioAnalyzeRms::new();
        feed(&mut rms, &pool, -0.5);
        assert!(rms.available());
        assert_relative_eq!(rms.read(), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn rms_over_window() {
        let pool = BlockPool::with_capacity(2).unwrap();
        let mut rms = AudioAnalyzeRms::with_window(2);
        feed(&mut rms, &pool, 1.0);
        assert!(!rms.available());
        feed(&mut rms, &pool, 0.0);
        assert_relative_eq!(rms.read(), core::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-6);
    }

    #[test]
    fn absent_input_publishes_nothing() {
        let pool = BlockPool::with_capacity(1).unwrap();
        let mut rms = AudioAnalyzeRms::new();
        let mut inputs = [None];
        let mut outputs: [Option<AudioBlockRef>; 0] = [];
        let mut ports = Ports::new(&pool, &mut inputs, &mut outputs, &[]);
        rms.update(&mut ports);
        assert!(!rms.available());
    }
}
