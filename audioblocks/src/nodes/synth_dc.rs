//! DC level source: fills its output with a constant value.
//!
//! Supports immediate level changes and linear ramps over a duration.

use crate::node::{AudioNode, Ports};

/// DC level source. Source node: 0 inputs, 1 output.
///
/// # Example
/// ```ignore
/// let mut dc = AudioSynthWaveformDc::new();
/// dc.amplitude(0.5);                 // 50% positive DC
/// dc.amplitude_ramp(-1.0, 20.0);     // glide to -1.0 over 20 ms
/// ```
#[derive(Debug, Clone, Default)]
pub struct AudioSynthWaveformDc {
    level: f32,
    target: f32,
    increment: f32,
    /// Samples left in the current ramp.
    remaining: usize,
    /// Ramp requested but not yet converted to samples.
    pending_ms: Option<f32>,
}

impl AudioSynthWaveformDc {
    /// Create a new DC source at zero output.
    pub const fn new() -> Self {
        AudioSynthWaveformDc {
            level: 0.0,
            target: 0.0,
            increment: 0.0,
            remaining: 0,
            pending_ms: None,
        }
    }

    /// Set the level immediately, clamped to -1.0..=1.0.
    pub fn amplitude(&mut self, level: f32) {
        let level = level.clamp(-1.0, 1.0);
        self.level = level;
        self.target = level;
        self.remaining = 0;
        self.pending_ms = None;
    }

    /// Glide linearly to `level` over `milliseconds`.
    ///
    /// The duration is converted to samples at the graph's rate on the next
    /// tick. A non-positive duration behaves like [`amplitude`](Self::amplitude).
    pub fn amplitude_ramp(&mut self, level: f32, milliseconds: f32) {
        if milliseconds <= 0.0 {
            self.amplitude(level);
            return;
        }
        self.target = level.clamp(-1.0, 1.0);
        self.pending_ms = Some(milliseconds);
    }

    /// Level of the most recently generated sample.
    pub fn current_level(&self) -> f32 {
        self.level
    }

    /// Whether a ramp is still in progress.
    pub fn is_ramping(&self) -> bool {
        self.remaining > 0 || self.pending_ms.is_some()
    }

    #[inline]
    fn next_sample(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.level = if self.remaining == 0 {
                self.target
            } else {
                self.level + self.increment
            };
        }
        self.level
    }
}

impl AudioNode for AudioSynthWaveformDc {
    const NUM_INPUTS: usize = 0;
    const NUM_OUTPUTS: usize = 1;

    fn update(&mut self, ports: &mut Ports<'_>) {
        let frame_len = ports.config().frame_len;

        if let Some(ms) = self.pending_ms.take() {
            let samples = ports.config().ms_to_samples(ms);
            if samples == 0 {
                self.level = self.target;
                self.remaining = 0;
            } else {
                self.increment = (self.target - self.level) / samples as f32;
                self.remaining = samples;
            }
        }

        // The ramp keeps time whether or not anyone listens.
        let mut block = if ports.is_connected(0) { ports.allocate() } else { None };
        match block.as_mut() {
            Some(out) => {
                for sample in out.iter_mut() {
                    *sample = self.next_sample();
                }
            }
            None => {
                for _ in 0..frame_len {
                    self.next_sample();
                }
            }
        }

        if let Some(out) = block {
            ports.transmit(0, out);
        }
    }
}
