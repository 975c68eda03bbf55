//! Single-channel amplifier (volume control).

use crate::dsp::scale;
use crate::node::{AudioNode, Ports};

/// Largest gain magnitude accepted by [`AudioAmplifier::gain`].
const MAX_GAIN: f32 = 32767.0;

/// Single-channel amplifier. One input, one output.
///
/// Unity gain forwards the incoming block untouched (no copy, no
/// allocation); zero gain releases it and emits nothing.
///
/// # Example
/// ```ignore
/// let mut amp = AudioAmplifier::new();
/// amp.gain(0.75); // 75% volume
/// ```
#[derive(Debug, Clone)]
pub struct AudioAmplifier {
    gain: f32,
}

impl AudioAmplifier {
    /// Create a new amplifier at unity gain.
    pub const fn new() -> Self {
        AudioAmplifier { gain: 1.0 }
    }

    /// Set amplification level.
    ///
    /// 0.0 = silence, 1.0 = unity, >1.0 = boost, negative inverts.
    /// Clamped to ±32767.0.
    pub fn gain(&mut self, level: f32) {
        self.gain = level.clamp(-MAX_GAIN, MAX_GAIN);
    }

    /// The gain currently applied.
    pub fn current_gain(&self) -> f32 {
        self.gain
    }
}

impl Default for AudioAmplifier {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioNode for AudioAmplifier {
    const NUM_INPUTS: usize = 1;
    const NUM_OUTPUTS: usize = 1;

    fn update(&mut self, ports: &mut Ports<'_>) {
        // Zero gain: leave the input for the runtime to release.
        if self.gain == 0.0 || !ports.is_connected(0) {
            return;
        }

        if self.gain == 1.0 {
            if let Some(block) = ports.receive_read_only(0) {
                ports.transmit(0, block);
            }
            return;
        }

        let Some(mut block) = ports.receive_writable(0) else {
            return;
        };
        scale(&mut block, self.gain);
        ports.transmit(0, block);
    }
}
