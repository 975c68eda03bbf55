//! Two-input sample-by-sample multiplier (ring modulator / VCA).

use crate::dsp::multiply;
use crate::node::{AudioNode, Ports};

/// Multiplies input 0 by input 1. Two inputs, one output.
///
/// Both inputs are required: a tick where either is missing emits nothing
/// and the one that did arrive is released.
#[derive(Debug, Clone, Default)]
pub struct AudioMultiply;

impl AudioMultiply {
    /// Create a multiplier.
    pub const fn new() -> Self {
        AudioMultiply
    }
}

impl AudioNode for AudioMultiply {
    const NUM_INPUTS: usize = 2;
    const NUM_OUTPUTS: usize = 1;

    fn update(&mut self, ports: &mut Ports<'_>) {
        if !ports.is_connected(0) {
            return;
        }
        let Some((a, b)) = ports.receive_pair(0, 1) else {
            return;
        };
        let Some(mut out) = a.into_mut() else {
            return;
        };
        multiply(&mut out, &b);
        ports.transmit(0, out);
    }
}
