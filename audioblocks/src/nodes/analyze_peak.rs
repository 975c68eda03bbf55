//! Peak level detector / analyzer.

use alloc::sync::Arc;

use crate::dsp::peak_abs;
use crate::node::{AudioNode, Ports};
use crate::probe::LevelProbe;

/// Peak level detector. Analyzer node: 1 input, 0 outputs.
///
/// Publishes the largest absolute sample seen over each window of
/// `window_blocks` input blocks. The reading lives in a [`LevelProbe`], so
/// another thread can poll it while the graph runs.
///
/// # Example
/// ```ignore
/// let peak = AudioAnalyzePeak::new();
/// let probe = peak.probe();
/// graph.add_node(peak);
/// // ... on the UI thread ...
/// if probe.available() {
///     let level = probe.read();
/// }
/// ```
#[derive(Debug)]
pub struct AudioAnalyzePeak {
    probe: Arc<LevelProbe>,
    window_blocks: u32,
    blocks: u32,
    peak: f32,
}

impl AudioAnalyzePeak {
    /// Publish after every block.
    pub fn new() -> Self {
        Self::with_window(1)
    }

    /// Publish once per `window_blocks` blocks (minimum 1).
    pub fn with_window(window_blocks: u32) -> Self {
        AudioAnalyzePeak {
            probe: Arc::new(LevelProbe::new()),
            window_blocks: window_blocks.max(1),
            blocks: 0,
            peak: 0.0,
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

impl Default for AudioAnalyzePeak {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioNode for AudioAnalyzePeak {
    const NUM_INPUTS: usize = 1;
    const NUM_OUTPUTS: usize = 0;

    fn update(&mut self, ports: &mut Ports<'_>) {
        let Some(input) = ports.receive_read_only(0) else {
            return;
        };
        self.peak = self.peak.max(peak_abs(&input));
        self.blocks += 1;
        if self.blocks >= self.window_blocks {
            self.probe.publish(self.peak);
            self.peak = 0.0;
            self.blocks = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{AudioBlockRef, BlockPool};

    fn feed(node: &mut AudioAnalyzePeak, pool: &Arc<BlockPool>, values: &[f32]) {
        let mut block = pool.allocate().unwrap();
        block[..values.len()].copy_from_slice(values);
        let mut inputs = [Some(block.into_shared())];
        let mut outputs: [Option<AudioBlockRef>; 0] = [];
        let mut ports = Ports::new(pool, &mut inputs, &mut outputs, &[]);
        node.update(&mut ports);
    }

    #[test]
    fn peak_of_single_block() {
        let pool = BlockPool::with_capacity(2).unwrap();
        let mut peak = AudioAnalyzePeak::new();
        assert!(!peak.available());

        feed(&mut peak, &pool, &[0.25, -0.75, 0.5]);
        assert!(peak.available());
        assert_eq!(peak.read(), 0.75);
        assert!(!peak.available());
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn peak_over_window() {
        let pool = BlockPool::with_capacity(2).unwrap();
        let mut peak = AudioAnalyzePeak::with_window(3);
        let probe = peak.probe();

        feed(&mut peak, &pool, &[0.1]);
        feed(&mut peak, &pool, &[-0.9]);
        assert!(!probe.available());
        feed(&mut peak, &pool, &[0.2]);
        assert_eq!(probe.read(), 0.9);

        // window restarts
        feed(&mut peak, &pool, &[0.3]);
        feed(&mut peak, &pool, &[0.3]);
        feed(&mut peak, &pool, &[0.3]);
        assert_eq!(probe.read(), 0.3);
    }
}
