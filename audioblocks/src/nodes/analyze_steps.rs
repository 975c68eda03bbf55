//! Stepped level measurement controller.
//!
//! Drives a multi-step measurement (a frequency sweep, a gain ladder): for
//! each step it collects a fixed number of blocks, stores their RMS level,
//! then leaves one block for the supervisor to change the stimulus before
//! the next step starts.
//!
//! While collecting, the input is forwarded on output 0 (the measurement
//! path); in every other phase it goes to output 1 (the monitor path).

use alloc::vec;
use alloc::vec::Vec;

use crate::dsp::sum_squares;
use crate::node::{AudioNode, Ports};

/// Measurement phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasureState {
    #[default]
    Idle,
    /// Gathering blocks for `step`; `blocks` already counted.
    Collecting { step: usize, blocks: usize },
    /// `step` is complete; the next block is a settling gap.
    Advancing { step: usize },
    Finished,
}

impl MeasureState {
    /// State after one more input block.
    pub fn on_block(self, steps: usize, blocks_per_step: usize) -> Self {
        match self {
            MeasureState::Idle => MeasureState::Idle,
            MeasureState::Collecting { step, blocks } => {
                if blocks + 1 >= blocks_per_step.max(1) {
                    MeasureState::Advancing { step }
                } else {
                    MeasureState::Collecting {
                        step,
                        blocks: blocks + 1,
                    }
                }
            }
            MeasureState::Advancing { step } if step + 1 < steps => MeasureState::Collecting {
                step: step + 1,
                blocks: 0,
            },
            MeasureState::Advancing { .. } | MeasureState::Finished => MeasureState::Finished,
        }
    }
}

/// Stepped measurement node. 1 input, 2 outputs (measure, monitor).
///
/// # Example
/// ```ignore
/// let mut sweep = AudioAnalyzeSteps::new(10, 8); // 10 steps, 8 blocks each
/// sweep.start();
/// // each tick: when current_step() changes, retune the oscillator
/// // when state() == MeasureState::Finished, read result(0..10)
/// ```
#[derive(Debug, Clone)]
pub struct AudioAnalyzeSteps {
    state: MeasureState,
    steps: usize,
    blocks_per_step: usize,
    accum: f64,
    count: usize,
    results: Vec<Option<f32>>,
}

impl AudioAnalyzeSteps {
    /// A controller for `steps` steps of `blocks_per_step` blocks each.
    pub fn new(steps: usize, blocks_per_step: usize) -> Self {
        AudioAnalyzeSteps {
            state: MeasureState::Idle,
            steps,
            blocks_per_step: blocks_per_step.max(1),
            accum: 0.0,
            count: 0,
            results: vec![None; steps],
        }
    }

    /// Begin (or restart) the measurement, clearing earlier results.
    pub fn start(&mut self) {
        self.results.iter_mut().for_each(|r| *r = None);
        self.accum = 0.0;
        self.count = 0;
        self.state = if self.steps == 0 {
            MeasureState::Finished
        } else {
            MeasureState::Collecting { step: 0, blocks: 0 }
        };
    }

    /// Current phase.
    pub fn state(&self) -> MeasureState {
        self.state
    }

    /// The step being collected or just completed.
    pub fn current_step(&self) -> Option<usize> {
        match self.state {
            MeasureState::Collecting { step, .. } | MeasureState::Advancing { step } => Some(step),
            MeasureState::Idle | MeasureState::Finished => None,
        }
    }

    /// RMS level measured for `step`, once that step is complete.
    pub fn result(&self, step: usize) -> Option<f32> {
        self.results.get(step).copied().flatten()
    }
}

impl AudioNode for AudioAnalyzeSteps {
    const NUM_INPUTS: usize = 1;
    const NUM_OUTPUTS: usize = 2;

    fn update(&mut self, ports: &mut Ports<'_>) {
        let Some(input) = ports.receive_read_only(0) else {
            return;
        };

        let collecting = matches!(self.state, MeasureState::Collecting { .. });
        if collecting {
            self.accum += sum_squares(&input);
            self.count += input.len();
        }

        self.state = self.state.on_block(self.steps, self.blocks_per_step);

        if let (true, MeasureState::Advancing { step }) = (collecting, self.state) {
            let rms = if self.count == 0 {
                0.0
            } else {
                libm::sqrt(self.accum / self.count as f64) as f32
            };
            self.results[step] = Some(rms);
            self.accum = 0.0;
            self.count = 0;
            #[cfg(feature = "tracing")]
            tracing::debug!(step, rms, "measurement step complete");
        }

        let port = if collecting { 0 } else { 1 };
        if ports.is_connected(port) {
            ports.transmit(port, input);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{AudioBlockRef, BlockPool};
    use alloc::sync::Arc;

    #[test]
    fn state_machine_walks_steps() {
        let mut s = MeasureState::Collecting { step: 0, blocks: 0 };
        let mut trace = Vec::new();
        for _ in 0..7 {
            s = s.on_block(2, 2);
            trace.push(s);
        }
        assert_eq!(
            trace,
            [
                MeasureState::Collecting { step: 0, blocks: 1 },
                MeasureState::Advancing { step: 0 },
                MeasureState::Collecting { step: 1, blocks: 0 },
                MeasureState::Collecting { step: 1, blocks: 1 },
                MeasureState::Advancing { step: 1 },
                MeasureState::Finished,
                MeasureState::Finished,
            ]
        );
        assert_eq!(MeasureState::Idle.on_block(2, 2), MeasureState::Idle);
    }

    /// Feed one block of `value`; return which outputs received it.
    fn feed(node: &mut AudioAnalyzeSteps, pool: &Arc<BlockPool>, value: f32) -> [bool; 2] {
        let mut block = pool.allocate().unwrap();
        block.fill(value);
        let mut inputs = [Some(block.into_shared())];
        let mut outputs: [Option<AudioBlockRef>; 2] = [None, None];
        let connected = [true, true];
        let mut ports = Ports::new(pool, &mut inputs, &mut outputs, &connected);
        node.update(&mut ports);
        [outputs[0].is_some(), outputs[1].is_some()]
    }

    #[test]
    fn measures_each_step_and_routes() {
        let pool = BlockPool::with_capacity(4).unwrap();
        let mut node = AudioAnalyzeSteps::new(2, 1);

        assert_eq!(feed(&mut node, &pool, 0.9), [false, true]);
        node.start();

        assert_eq!(feed(&mut node, &pool, 0.5), [true, false]);
        assert_eq!(node.state(), MeasureState::Advancing { step: 0 });
        assert_eq!(node.result(0), Some(0.5));

        // settling gap goes to the monitor output
        assert_eq!(feed(&mut node, &pool, 0.0), [false, true]);
        assert_eq!(node.current_step(), Some(1));

        assert_eq!(feed(&mut node, &pool, 0.25), [true, false]);
        assert_eq!(feed(&mut node, &pool, 0.0), [false, true]);
        assert_eq!(node.state(), MeasureState::Finished);
        assert_eq!(node.result(1), Some(0.25));
        assert_eq!(node.result(2), None);
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn zero_steps_finishes_immediately() {
        let mut node = AudioAnalyzeSteps::new(0, 4);
        node.start();
        assert_eq!(node.state(), MeasureState::Finished);
        assert_eq!(node.current_step(), None);
    }
}
