//! Configuration-time errors.
//!
//! Everything that can go wrong while a graph is being assembled is reported
//! through [`ConfigError`]. Conditions that arise while ticking (pool
//! exhaustion, a missing input) are not errors: nodes see `None` and skip.

use thiserror::Error;

/// Errors reported while building pools, delay lines and graphs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Sample rate is zero, negative or not finite.
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    /// Frame length is zero or larger than the block capacity.
    #[error("frame length {len} is outside 1..={max}")]
    InvalidFrameLength {
        /// Requested frame length.
        len: usize,
        /// Block capacity.
        max: usize,
    },

    /// Pool capacity is zero or larger than the pool can index.
    #[error("pool capacity {blocks} is outside 1..={max}")]
    InvalidPoolCapacity {
        /// Requested number of blocks.
        blocks: usize,
        /// Largest supported pool.
        max: usize,
    },

    /// Delay line length is not a non-zero power of two.
    #[error("delay line length {0} is not a power of two")]
    DelayNotPowerOfTwo(usize),

    /// The node does not belong to this graph.
    #[error("node {0} is not registered in this graph")]
    UnknownNode(usize),

    /// Output port index exceeds the node's output count.
    #[error("node {node} has {outputs} outputs, port {port} does not exist")]
    OutputPortOutOfRange {
        /// Source node index.
        node: usize,
        /// Requested output port.
        port: usize,
        /// Declared output count.
        outputs: usize,
    },

    /// Input port index exceeds the node's input count.
    #[error("node {node} has {inputs} inputs, port {port} does not exist")]
    InputPortOutOfRange {
        /// Destination node index.
        node: usize,
        /// Requested input port.
        port: usize,
        /// Declared input count.
        inputs: usize,
    },

    /// The destination port already has an incoming edge.
    #[error("input {port} of node {node} is already connected")]
    InputAlreadyConnected {
        /// Destination node index.
        node: usize,
        /// Destination input port.
        port: usize,
    },

    /// The destination port has no incoming edge to remove.
    #[error("input {port} of node {node} is not connected")]
    InputNotConnected {
        /// Destination node index.
        node: usize,
        /// Destination input port.
        port: usize,
    },
}
