//! Sine wave oscillator using a normalized phase accumulator.

use core::f32::consts::TAU;

use crate::node::{AudioNode, Ports};

/// Sine wave oscillator. Source node: 0 inputs, 1 output.
///
/// # Example
/// ```ignore
/// let mut sine = AudioSynthSine::new();
/// sine.frequency(440.0);
/// sine.amplitude(0.8);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AudioSynthSine {
    /// Phase in cycles, kept in `0.0..1.0`.
    phase: f32,
    frequency_hz: f32,
    magnitude: f32,
}

impl AudioSynthSine {
    /// Create a new sine oscillator, initially silent.
    pub const fn new() -> Self {
        AudioSynthSine {
            phase: 0.0,
            frequency_hz: 0.0,
            magnitude: 0.0,
        }
    }

    /// Set the oscillator frequency in Hz (negative values are treated as 0).
    pub fn frequency(&mut self, hz: f32) {
        self.frequency_hz = hz.max(0.0);
    }

    /// Set the output amplitude (0.0 = silent, 1.0 = full scale).
    pub fn amplitude(&mut self, level: f32) {
        self.magnitude = level.clamp(0.0, 1.0);
    }

    /// Set the phase offset in degrees.
    pub fn phase(&mut self, angle: f32) {
        self.phase = wrap_cycles(angle / 360.0);
    }

    /// Current phase in cycles (`0.0..1.0`).
    pub fn current_phase(&self) -> f32 {
        self.phase
    }
}

#[inline]
fn wrap_cycles(x: f32) -> f32 {
    let wrapped = x - libm::floorf(x);
    // floor rounding can land exactly on 1.0
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

impl AudioNode for AudioSynthSine {
    const NUM_INPUTS: usize = 0;
    const NUM_OUTPUTS: usize = 1;

    fn update(&mut self, ports: &mut Ports<'_>) {
        let config = *ports.config();
        let increment = self.frequency_hz / config.sample_rate_hz;

        let block = if ports.is_connected(0) && self.magnitude > 0.0 {
            ports.allocate()
        } else {
            None
        };
        let Some(mut out) = block else {
            self.phase = wrap_cycles(self.phase + increment * config.frame_len as f32);
            return;
        };

        let mut phase = self.phase;
        for sample in out.iter_mut() {
            *sample = self.magnitude * libm::sinf(TAU * phase);
            phase = wrap_cycles(phase + increment);
        }
        self.phase = phase;
        ports.transmit(0, out);
    }
}
