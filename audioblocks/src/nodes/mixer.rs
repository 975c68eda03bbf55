//! N-channel audio mixer with per-channel gain.

use crate::dsp::{accumulate_scaled, scale};
use crate::node::{AudioNode, Ports};

/// Largest gain magnitude accepted by [`AudioMixer::gain`].
const MAX_GAIN: f32 = 32767.0;

/// N-channel mixer. Mixes N input channels into a single mono output with per-channel gain.
///
/// The first channel with data this tick becomes the output block (reused in
/// place when the mixer holds the only reference); the rest are accumulated
/// into it. A tick where no channel has data produces no output.
///
/// # Example
/// ```ignore
/// let mut mixer = AudioMixer::<4>::new();
/// mixer.gain(0, 1.0);  // channel 0 at unity
/// mixer.gain(1, 0.5);  // channel 1 at half volume
/// ```
#[derive(Debug, Clone)]
pub struct AudioMixer<const N: usize> {
    gains: [f32; N],
}

impl<const N: usize> AudioMixer<N> {
    /// Create a new mixer with all channels at unity gain.
    pub const fn new() -> Self {
        AudioMixer { gains: [1.0; N] }
    }

    /// Set the gain for a specific channel. Out-of-range channels are ignored.
    ///
    /// 0.0 = silence, 1.0 = unity, >1.0 = boost. Clamped to ±32767.0.
    pub fn gain(&mut self, channel: usize, level: f32) {
        if let Some(g) = self.gains.get_mut(channel) {
            *g = level.clamp(-MAX_GAIN, MAX_GAIN);
        }
    }

    /// Gain of `channel`, or `None` if out of range.
    pub fn channel_gain(&self, channel: usize) -> Option<f32> {
        self.gains.get(channel).copied()
    }
}

impl<const N: usize> Default for AudioMixer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> AudioNode for AudioMixer<N> {
    const NUM_INPUTS: usize = N;
    const NUM_OUTPUTS: usize = 1;

    fn update(&mut self, ports: &mut Ports<'_>) {
        if !ports.is_connected(0) {
            return;
        }
        let Some(first) = (0..N).find(|&ch| ports.has_input(ch)) else {
            return;
        };
        // On copy failure the remaining inputs are released by the runtime.
        let Some(mut out) = ports.receive_writable(first) else {
            return;
        };
        if self.gains[first] != 1.0 {
            scale(&mut out, self.gains[first]);
        }

        for ch in first + 1..N {
            if let Some(input) = ports.receive_read_only(ch) {
                accumulate_scaled(&mut out, &input, self.gains[ch]);
            }
        }

        ports.transmit(0, out);
    }
}
