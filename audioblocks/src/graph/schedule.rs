//! The per-tick scheduler.

use crate::node::Ports;

use super::AudioGraph;

/// Counters accumulated by [`AudioGraph::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickStats {
    /// Completed ticks.
    pub ticks: u64,
    /// Blocks delivered into input ports (a fan-out to three inputs counts three).
    pub blocks_transmitted: u64,
    /// Blocks released because the destination port was full.
    pub dropped_blocks: u64,
    /// Blocks a node transmitted that were refused: foreign pool or
    /// nonexistent output port.
    pub rejected_blocks: u64,
}

impl AudioGraph {
    /// Process one frame through the entire graph.
    ///
    /// Visits every node in registration order: pulls at most one pending
    /// block per input port, runs the node, releases inputs it left behind,
    /// then routes each transmitted block to every input its output port
    /// feeds. Runs to completion; nothing here blocks or allocates heap
    /// memory.
    pub fn tick(&mut self) {
        let mut delivered = 0u64;
        let mut dropped = 0u64;
        let mut rejected = 0u64;

        for index in 0..self.nodes.len() {
            {
                let entry = &mut self.nodes[index];
                for (slot, input) in entry.input_scratch.iter_mut().zip(entry.inputs.iter()) {
                    *slot = input.queue.pop();
                }

                let mut ports = Ports::new(
                    &self.pool,
                    &mut entry.input_scratch,
                    &mut entry.output_scratch,
                    &entry.connected,
                );
                entry.node.update(&mut ports);
                rejected += u64::from(ports.rejected());

                // Whatever the node did not take goes back to the pool now.
                for slot in entry.input_scratch.iter_mut() {
                    *slot = None;
                }
            }

            for port in 0..self.nodes[index].output_scratch.len() {
                let Some(block) = self.nodes[index].output_scratch[port].take() else {
                    continue;
                };
                let targets = &self.nodes[index].outputs[port].targets;
                let Some((last, rest)) = targets.split_last() else {
                    // Unconnected output: the block is released here.
                    continue;
                };
                for target in rest {
                    let input = &self.nodes[target.node].inputs[target.port];
                    match input.queue.push(block.clone()) {
                        Ok(()) => delivered += 1,
                        Err(_overflow) => {
                            dropped += 1;
                            #[cfg(feature = "tracing")]
                            tracing::trace!(node = target.node, port = target.port, "input port full, block dropped");
                        }
                    }
                }
                let input = &self.nodes[last.node].inputs[last.port];
                match input.queue.push(block) {
                    Ok(()) => delivered += 1,
                    Err(_overflow) => {
                        dropped += 1;
                        #[cfg(feature = "tracing")]
                        tracing::trace!(node = last.node, port = last.port, "input port full, block dropped");
                    }
                }
            }
        }

        self.stats.ticks += 1;
        self.stats.blocks_transmitted += delivered;
        self.stats.dropped_blocks += dropped;
        self.stats.rejected_blocks += rejected;
    }
}
