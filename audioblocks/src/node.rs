//! The node contract.
//!
//! A node declares its port counts and implements one [`AudioNode::update`]
//! call per tick. Everything it touches during that call goes through
//! [`Ports`]: pulling input blocks, allocating scratch or output blocks from
//! the graph's pool, and transmitting results.
//!
//! Ownership rules are enforced by the handle types rather than by
//! convention:
//!
//! - An input the node does not take is released by the runtime when
//!   `update` returns.
//! - A block the node takes, allocates or receives writable is released when
//!   dropped, so early returns cannot leak.
//! - A block passed to [`Ports::transmit`] is routed to every edge of that
//!   output port, then the producer's reference is released. Blocks from
//!   another pool, or sent to a port the node does not have, are released
//!   and counted instead.

use alloc::sync::Arc;

use crate::block::{AudioBlockMut, AudioBlockRef, BlockPool};
use crate::config::AudioConfig;

/// Core trait for all audio processing nodes.
///
/// The number of inputs and outputs is declared via associated constants and
/// cannot change after construction.
pub trait AudioNode {
    /// Number of input ports this node accepts.
    const NUM_INPUTS: usize;

    /// Number of output ports this node produces.
    const NUM_OUTPUTS: usize;

    /// Process one tick.
    ///
    /// Must not block. Absent inputs and pool exhaustion are normal: the node
    /// skips whatever it cannot produce this tick.
    fn update(&mut self, ports: &mut Ports<'_>);
}

/// A node's view of its ports for a single tick.
pub struct Ports<'a> {
    pool: &'a Arc<BlockPool>,
    inputs: &'a mut [Option<AudioBlockRef>],
    outputs: &'a mut [Option<AudioBlockRef>],
    connected: &'a [bool],
    rejected: u32,
}

impl<'a> Ports<'a> {
    /// Build a port view.
    ///
    /// `inputs` holds this tick's pending block per input port, `outputs`
    /// receives transmitted blocks, and `connected[i]` tells whether output
    /// `i` has any downstream edge. The scheduler builds this for every node;
    /// tests build it by hand to drive a single node.
    pub fn new(
        pool: &'a Arc<BlockPool>,
        inputs: &'a mut [Option<AudioBlockRef>],
        outputs: &'a mut [Option<AudioBlockRef>],
        connected: &'a [bool],
    ) -> Self {
        debug_assert_eq!(outputs.len(), connected.len());
        Ports {
            pool,
            inputs,
            outputs,
            connected,
            rejected: 0,
        }
    }

    /// Graph configuration (sample rate, frame length).
    pub fn config(&self) -> &AudioConfig {
        self.pool.config()
    }

    /// The pool blocks are allocated from.
    pub fn pool(&self) -> &Arc<BlockPool> {
        self.pool
    }

    /// Number of input ports.
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Number of output ports.
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Whether input `port` has a block waiting this tick.
    pub fn has_input(&self, port: usize) -> bool {
        self.inputs.get(port).is_some_and(Option::is_some)
    }

    /// Take the pending block on input `port`, if any.
    pub fn receive_read_only(&mut self, port: usize) -> Option<AudioBlockRef> {
        self.inputs.get_mut(port).and_then(Option::take)
    }

    /// Take the pending block on input `port` for in-place modification.
    ///
    /// Converts in place when the node holds the only reference, otherwise
    /// copies into a fresh block. Returns `None` if there is no input or the
    /// copy could not be allocated.
    pub fn receive_writable(&mut self, port: usize) -> Option<AudioBlockMut> {
        self.receive_read_only(port)?.into_mut()
    }

    /// Take inputs `a` and `b` together.
    ///
    /// Returns `None` unless both are present; a block taken from one port
    /// while the other is absent is released before returning.
    pub fn receive_pair(&mut self, a: usize, b: usize) -> Option<(AudioBlockRef, AudioBlockRef)> {
        match (self.receive_read_only(a), self.receive_read_only(b)) {
            (Some(first), Some(second)) => Some((first, second)),
            _ => None,
        }
    }

    /// Allocate a block from the graph's pool. `None` when exhausted.
    pub fn allocate(&self) -> Option<AudioBlockMut> {
        self.pool.allocate()
    }

    /// Whether output `port` feeds at least one input.
    ///
    /// Nodes skip producing blocks for unconnected outputs.
    pub fn is_connected(&self, port: usize) -> bool {
        self.connected.get(port).copied().unwrap_or(false)
    }

    /// Hand `block` to output `port`.
    ///
    /// Transmitting twice on the same port within one tick replaces the first
    /// block (which is released). A block sent to a nonexistent port, or one
    /// allocated from a pool other than the graph's, is released and counted
    /// in [`rejected`](Self::rejected); it never reaches downstream nodes.
    pub fn transmit(&mut self, port: usize, block: impl Into<AudioBlockRef>) {
        let block = block.into();
        if !Arc::ptr_eq(block.pool(), self.pool) {
            self.reject(port, "block from a foreign pool");
            return;
        }
        if port >= self.outputs.len() {
            self.reject(port, "transmit on nonexistent output");
            return;
        }
        self.outputs[port] = Some(block);
    }

    /// Blocks refused by [`transmit`](Self::transmit) during this tick.
    pub fn rejected(&self) -> u32 {
        self.rejected
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn reject(&mut self, port: usize, what: &'static str) {
        self.rejected += 1;
        #[cfg(feature = "tracing")]
        tracing::warn!(port, "{what}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(capacity: usize) -> Arc<BlockPool> {
        BlockPool::with_capacity(capacity).unwrap()
    }

    #[test]
    fn receive_takes_input_once() {
        let pool = pool(4);
        let mut inputs = [Some(pool.allocate().unwrap().into_shared())];
        let mut outputs: [Option<AudioBlockRef>; 0] = [];
        let mut ports = Ports::new(&pool, &mut inputs, &mut outputs, &[]);

        assert!(ports.has_input(0));
        assert!(ports.receive_read_only(0).is_some());
        assert!(!ports.has_input(0));
        assert!(ports.receive_read_only(0).is_none());
        assert!(ports.receive_read_only(7).is_none());
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn receive_pair_releases_partial() {
        let pool = pool(4);
        let mut inputs = [Some(pool.allocate().unwrap().into_shared()), None];
        let mut outputs: [Option<AudioBlockRef>; 0] = [];
        let mut ports = Ports::new(&pool, &mut inputs, &mut outputs, &[]);

        assert!(ports.receive_pair(0, 1).is_none());
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn transmit_replaces_previous() {
        let pool = pool(4);
        let mut inputs: [Option<AudioBlockRef>; 0] = [];
        let mut outputs = [None];
        let connected = [true];
        let mut ports = Ports::new(&pool, &mut inputs, &mut outputs, &connected);

        let first = ports.allocate().unwrap();
        let second = ports.allocate().unwrap();
        let second_slot = second.slot();
        ports.transmit(0, first);
        ports.transmit(0, second);

        assert_eq!(pool.outstanding(), 1);
        assert_eq!(outputs[0].as_ref().unwrap().slot(), second_slot);
    }

    #[test]
    fn transmit_to_missing_port_is_counted() {
        let pool = pool(2);
        let mut inputs: [Option<AudioBlockRef>; 0] = [];
        let mut outputs = [None];
        let mut ports = Ports::new(&pool, &mut inputs, &mut outputs, &[true]);

        let block = ports.allocate().unwrap();
        ports.transmit(3, block);
        assert_eq!(ports.rejected(), 1);
        assert_eq!(pool.outstanding(), 0);
        assert!(outputs[0].is_none());
    }

    #[test]
    fn transmit_refuses_foreign_pool() {
        let pool = pool(2);
        let other = BlockPool::new(&AudioConfig::default().with_frame_len(16).with_pool_blocks(2)).unwrap();
        let mut inputs: [Option<AudioBlockRef>; 0] = [];
        let mut outputs = [None];
        let mut ports = Ports::new(&pool, &mut inputs, &mut outputs, &[true]);

        ports.transmit(0, other.allocate().unwrap());
        assert_eq!(ports.rejected(), 1);
        assert_eq!(other.outstanding(), 0);

        let own = ports.allocate().unwrap();
        ports.transmit(0, own);
        assert_eq!(ports.rejected(), 1);
        assert_eq!(outputs[0].as_ref().unwrap().len(), pool.config().frame_len);
    }

    #[test]
    fn connection_flags() {
        let pool = pool(1);
        let mut inputs: [Option<AudioBlockRef>; 0] = [];
        let mut outputs = [None, None];
        let connected = [false, true];
        let ports = Ports::new(&pool, &mut inputs, &mut outputs, &connected);

        assert!(!ports.is_connected(0));
        assert!(ports.is_connected(1));
        assert!(!ports.is_connected(2));
        assert_eq!(ports.num_outputs(), 2);
        assert_eq!(ports.config().frame_len, pool.config().frame_len);
    }
}
