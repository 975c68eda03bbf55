//! Per-node port state owned by the graph.

use alloc::vec::Vec;

use crate::block::AudioBlockRef;
use crate::constants::PORT_QUEUE_SLOTS;
use crate::io::spsc::SpscQueue;

/// Address of one port on one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortAddr {
    /// Node index (registration order).
    pub node: usize,
    /// Port index on that node.
    pub port: usize,
}

/// Pending blocks for one input, plus the edge feeding it.
pub(crate) struct InputPort {
    pub queue: SpscQueue<AudioBlockRef, PORT_QUEUE_SLOTS>,
    pub source: Option<PortAddr>,
}

impl InputPort {
    pub fn new() -> Self {
        InputPort {
            queue: SpscQueue::new(),
            source: None,
        }
    }
}

/// Downstream inputs fed by one output.
#[derive(Default)]
pub(crate) struct OutputPort {
    pub targets: Vec<PortAddr>,
}
