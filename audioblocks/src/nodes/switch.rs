//! One-in, N-out router.

use crate::node::{AudioNode, Ports};

/// Routes its input to one selected output, or to none.
///
/// One input, `N` outputs. Routing forwards the shared block; nothing is
/// copied.
///
/// # Example
/// ```ignore
/// let mut switch = AudioSwitch::<2>::new();
/// switch.select(Some(1)); // send everything to output 1
/// switch.select(None);    // mute
/// ```
#[derive(Debug, Clone)]
pub struct AudioSwitch<const N: usize> {
    selected: Option<usize>,
}

impl<const N: usize> AudioSwitch<N> {
    /// Create a switch routing to output 0.
    pub const fn new() -> Self {
        AudioSwitch { selected: Some(0) }
    }

    /// Choose the active output. Out-of-range indices mute the switch.
    pub fn select(&mut self, output: Option<usize>) {
        self.selected = output.filter(|&o| o < N);
    }

    /// The active output.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }
}

impl<const N: usize> Default for AudioSwitch<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> AudioNode for AudioSwitch<N> {
    const NUM_INPUTS: usize = 1;
    const NUM_OUTPUTS: usize = N;

    fn update(&mut self, ports: &mut Ports<'_>) {
        let Some(port) = self.selected else {
            return;
        };
        if !ports.is_connected(port) {
            return;
        }
        if let Some(block) = ports.receive_read_only(0) {
            ports.transmit(port, block);
        }
    }
}
