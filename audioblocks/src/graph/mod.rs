//! Connection graph and scheduler.
//!
//! An [`AudioGraph`] owns a set of nodes, the edges between their ports and
//! the input queues those edges feed. Nodes are processed in
//! **registration order**: [`AudioGraph::tick`] calls each node's
//! [`update`](crate::node::AudioNode::update) in the order it was added.
//!
//! ```ignore
//! use audioblocks::prelude::*;
//!
//! let pool = BlockPool::new(&AudioConfig::default())?;
//! let mut graph = AudioGraph::new(pool);
//!
//! let dc = graph.add_node(AudioSynthWaveformDc::new());
//! let amp = graph.add_node(AudioAmplifier::new());
//! let (record, consumer) = AudioRecordQueue::new();
//! let record = graph.add_node(record);
//!
//! graph.connect(dc, 0, amp, 0)?;
//! graph.connect(amp, 0, record, 0)?;
//!
//! graph.node_mut(dc).unwrap().amplitude(1.0);
//! graph.node_mut(amp).unwrap().gain(0.5);
//! consumer.start();
//!
//! // In the audio interrupt / timer callback:
//! graph.tick();
//! ```
//!
//! ## Ordering
//!
//! There is no topological sort. A node sees this tick's output of an
//! upstream node only if the upstream node was registered first; otherwise
//! it sees the previous tick's output, one frame later. Feedback edges are
//! therefore legal and always carry one frame of delay.
//!
//! ## Block routing
//!
//! - Each input port is a bounded queue ([`PORT_QUEUE_SLOTS`] deep); a node
//!   pulls at most one block per port per tick.
//! - Fan-out clones the shared handle (refcount increment, no copy), so every
//!   consumer observes the same block.
//! - A push into a full port releases the block and counts it as dropped.
//! - Pool exhaustion degrades gracefully: nodes see `None` and skip.
//!
//! ## Reconfiguration
//!
//! `connect`/`disconnect` take `&mut self`, so they cannot run while a tick is
//! in progress.
//!
//! [`PORT_QUEUE_SLOTS`]: crate::constants::PORT_QUEUE_SLOTS

mod port;
mod schedule;


use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::block::{AudioBlockRef, BlockPool};
use crate::config::AudioConfig;
use crate::error::ConfigError;
use crate::node::{AudioNode, Ports};

pub use port::PortAddr;
pub use schedule::TickStats;

use port::{InputPort, OutputPort};

static NEXT_GRAPH_ID: AtomicU32 = AtomicU32::new(0);

/// Untyped reference to a node registered in a specific graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    graph: u32,
    index: usize,
}

impl NodeId {
    /// Registration position of the node.
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}", self.index)
    }
}

/// Typed reference to a node registered in a graph.
///
/// Returned by [`AudioGraph::add_node`]; gives typed access through
/// [`AudioGraph::node`] / [`AudioGraph::node_mut`].
pub struct NodeHandle<N> {
    id: NodeId,
    _marker: PhantomData<fn() -> N>,
}

impl<N> NodeHandle<N> {
    /// The untyped id.
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl<N> Clone for NodeHandle<N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for NodeHandle<N> {}

impl<N> fmt::Debug for NodeHandle<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHandle<{}>({})", core::any::type_name::<N>(), self.id)
    }
}

impl<N> From<NodeHandle<N>> for NodeId {
    fn from(handle: NodeHandle<N>) -> Self {
        handle.id
    }
}

/// Object-safe view of an [`AudioNode`].
trait ErasedNode: Send {
    fn update(&mut self, ports: &mut Ports<'_>);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<N: AudioNode + Send + 'static> ErasedNode for N {
    fn update(&mut self, ports: &mut Ports<'_>) {
        AudioNode::update(self, ports);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct NodeEntry {
    node: Box<dyn ErasedNode>,
    name: &'static str,
    inputs: Box<[InputPort]>,
    outputs: Box<[OutputPort]>,
    /// Per-tick scratch handed to `Ports`; empty between ticks.
    input_scratch: Box<[Option<AudioBlockRef>]>,
    output_scratch: Box<[Option<AudioBlockRef>]>,
    connected: Box<[bool]>,
}

/// A pull-based audio graph processed in registration order.
pub struct AudioGraph {
    id: u32,
    pool: Arc<BlockPool>,
    nodes: Vec<NodeEntry>,
    stats: TickStats,
}

impl AudioGraph {
    /// Create an empty graph drawing blocks from `pool`.
    pub fn new(pool: Arc<BlockPool>) -> Self {
        AudioGraph {
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
            pool,
            nodes: Vec::new(),
            stats: TickStats::default(),
        }
    }

    /// Register a node. Registration order is processing order.
    pub fn add_node<N: AudioNode + Send + 'static>(&mut self, node: N) -> NodeHandle<N> {
        let index = self.nodes.len();
        let inputs: Vec<InputPort> = (0..N::NUM_INPUTS).map(|_| InputPort::new()).collect();
        let outputs: Vec<OutputPort> = (0..N::NUM_OUTPUTS).map(|_| OutputPort::default()).collect();
        let name = core::any::type_name::<N>();

        self.nodes.push(NodeEntry {
            node: Box::new(node),
            name,
            inputs: inputs.into_boxed_slice(),
            outputs: outputs.into_boxed_slice(),
            input_scratch: (0..N::NUM_INPUTS).map(|_| None).collect(),
            output_scratch: (0..N::NUM_OUTPUTS).map(|_| None).collect(),
            connected: alloc::vec![false; N::NUM_OUTPUTS].into_boxed_slice(),
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(
            index,
            node = name,
            inputs = N::NUM_INPUTS,
            outputs = N::NUM_OUTPUTS,
            "graph_add"
        );

        NodeHandle {
            id: NodeId {
                graph: self.id,
                index,
            },
            _marker: PhantomData,
        }
    }

    fn entry_index(&self, id: NodeId) -> Result<usize, ConfigError> {
        if id.graph != self.id || id.index >= self.nodes.len() {
            return Err(ConfigError::UnknownNode(id.index));
        }
        Ok(id.index)
    }

    /// Connect output `src_port` of `src` to input `dst_port` of `dst`.
    ///
    /// One output may feed any number of inputs; an input accepts exactly
    /// one edge.
    pub fn connect(
        &mut self,
        src: impl Into<NodeId>,
        src_port: usize,
        dst: impl Into<NodeId>,
        dst_port: usize,
    ) -> Result<(), ConfigError> {
        let src = self.entry_index(src.into())?;
        let dst = self.entry_index(dst.into())?;

        let outputs = self.nodes[src].outputs.len();
        if src_port >= outputs {
            return Err(ConfigError::OutputPortOutOfRange {
                node: src,
                port: src_port,
                outputs,
            });
        }
        let inputs = self.nodes[dst].inputs.len();
        if dst_port >= inputs {
            return Err(ConfigError::InputPortOutOfRange {
                node: dst,
                port: dst_port,
                inputs,
            });
        }
        let input = &mut self.nodes[dst].inputs[dst_port];
        if input.source.is_some() {
            return Err(ConfigError::InputAlreadyConnected {
                node: dst,
                port: dst_port,
            });
        }

        let source = PortAddr {
            node: src,
            port: src_port,
        };
        input.source = Some(source);
        let entry = &mut self.nodes[src];
        entry.outputs[src_port].targets.push(PortAddr {
            node: dst,
            port: dst_port,
        });
        entry.connected[src_port] = true;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_connect: {}:{} → {}:{}",
            self.nodes[src].name,
            src_port,
            self.nodes[dst].name,
            dst_port
        );
        Ok(())
    }

    /// Remove the edge feeding input `dst_port` of `dst`.
    ///
    /// Blocks still pending on that input are released.
    pub fn disconnect(&mut self, dst: impl Into<NodeId>, dst_port: usize) -> Result<(), ConfigError> {
        let dst = self.entry_index(dst.into())?;
        let inputs = self.nodes[dst].inputs.len();
        let input = self.nodes[dst]
            .inputs
            .get_mut(dst_port)
            .ok_or(ConfigError::InputPortOutOfRange {
                node: dst,
                port: dst_port,
                inputs,
            })?;
        let source = input.source.take().ok_or(ConfigError::InputNotConnected {
            node: dst,
            port: dst_port,
        })?;
        #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
        let released = input.queue.clear();

        let target = PortAddr {
            node: dst,
            port: dst_port,
        };
        let entry = &mut self.nodes[source.node];
        let output = &mut entry.outputs[source.port];
        output.targets.retain(|t| *t != target);
        entry.connected[source.port] = !output.targets.is_empty();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_disconnect: {}:{} (released {} pending)",
            self.nodes[dst].name,
            dst_port,
            released
        );
        Ok(())
    }

    /// Typed access to a node, e.g. to read diagnostics between ticks.
    ///
    /// Returns `None` for a handle from another graph.
    pub fn node<N: 'static>(&self, handle: NodeHandle<N>) -> Option<&N> {
        let index = self.entry_index(handle.id).ok()?;
        self.nodes[index].node.as_any().downcast_ref::<N>()
    }

    /// Typed mutable access to a node, e.g. to change parameters between ticks.
    pub fn node_mut<N: 'static>(&mut self, handle: NodeHandle<N>) -> Option<&mut N> {
        let index = self.entry_index(handle.id).ok()?;
        self.nodes[index].node.as_any_mut().downcast_mut::<N>()
    }

    /// The edge source feeding input `port` of `node`, if connected.
    pub fn source_of(&self, node: impl Into<NodeId>, port: usize) -> Option<PortAddr> {
        let index = self.entry_index(node.into()).ok()?;
        self.nodes[index].inputs.get(port)?.source
    }

    /// Number of blocks waiting on input `port` of `node`.
    pub fn pending(&self, node: impl Into<NodeId>, port: usize) -> usize {
        self.entry_index(node.into())
            .ok()
            .and_then(|index| self.nodes[index].inputs.get(port))
            .map_or(0, |input| input.queue.len())
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no nodes are registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The pool this graph allocates from.
    pub fn pool(&self) -> &Arc<BlockPool> {
        &self.pool
    }

    /// The graph's configuration (taken from its pool).
    pub fn config(&self) -> &AudioConfig {
        self.pool.config()
    }

    /// Counters accumulated over all ticks.
    pub fn stats(&self) -> TickStats {
        self.stats
    }
}

impl fmt::Debug for AudioGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.nodes.iter().map(|n| n.name).collect();
        f.debug_struct("AudioGraph")
            .field("nodes", &names)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(all(test, feature = "dsp"))]
mod tests {
    use super::*;
    use crate::io::{AudioPlayQueue, AudioRecordQueue};
    use crate::nodes::{AudioAmplifier, AudioMixer, AudioSynthWaveformDc};

    fn graph(capacity: usize) -> AudioGraph {
        AudioGraph::new(BlockPool::with_capacity(capacity).unwrap())
    }

    #[test]
    fn add_node_assigns_registration_order() {
        let mut g = graph(8);
        let a = g.add_node(AudioSynthWaveformDc::new());
        let b = g.add_node(AudioAmplifier::new());
        assert_eq!(a.id().index(), 0);
        assert_eq!(b.id().index(), 1);
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn connect_rejects_second_edge_into_input() {
        let mut g = graph(8);
        let a = g.add_node(AudioSynthWaveformDc::new());
        let b = g.add_node(AudioSynthWaveformDc::new());
        let amp = g.add_node(AudioAmplifier::new());

        g.connect(a, 0, amp, 0).unwrap();
        assert_eq!(
            g.connect(b, 0, amp, 0),
            Err(ConfigError::InputAlreadyConnected { node: 2, port: 0 })
        );
        assert_eq!(g.source_of(amp, 0), Some(PortAddr { node: 0, port: 0 }));
    }

    #[test]
    fn connect_allows_fan_out() {
        let mut g = graph(8);
        let dc = g.add_node(AudioSynthWaveformDc::new());
        let amp1 = g.add_node(AudioAmplifier::new());
        let amp2 = g.add_node(AudioAmplifier::new());
        g.connect(dc, 0, amp1, 0).unwrap();
        g.connect(dc, 0, amp2, 0).unwrap();
    }

    #[test]
    fn connect_checks_port_ranges() {
        let mut g = graph(8);
        let dc = g.add_node(AudioSynthWaveformDc::new());
        let mixer = g.add_node(AudioMixer::<2>::new());

        assert_eq!(
            g.connect(dc, 1, mixer, 0),
            Err(ConfigError::OutputPortOutOfRange {
                node: 0,
                port: 1,
                outputs: 1
            })
        );
        assert_eq!(
            g.connect(dc, 0, mixer, 2),
            Err(ConfigError::InputPortOutOfRange {
                node: 1,
                port: 2,
                inputs: 2
            })
        );
    }

    #[test]
    fn connect_rejects_foreign_handle() {
        let mut g1 = graph(4);
        let mut g2 = graph(4);
        let a = g1.add_node(AudioSynthWaveformDc::new());
        let b = g2.add_node(AudioAmplifier::new());
        let _ = g2.add_node(AudioSynthWaveformDc::new());

        assert_eq!(g2.connect(a, 0, b, 0), Err(ConfigError::UnknownNode(0)));
        assert!(g2.node(a).is_none());
    }

    #[test]
    fn disconnect_releases_pending_blocks() {
        let pool = BlockPool::with_capacity(8).unwrap();
        let mut g = AudioGraph::new(Arc::clone(&pool));
        let amp = g.add_node(AudioAmplifier::new());
        let dc = g.add_node(AudioSynthWaveformDc::new());
        g.connect(dc, 0, amp, 0).unwrap();
        g.node_mut(dc).unwrap().amplitude(0.5);

        // dc is registered after amp, so its block waits on amp's input
        g.tick();
        assert_eq!(g.pending(amp, 0), 1);
        assert_eq!(pool.outstanding(), 1);

        g.disconnect(amp, 0).unwrap();
        assert_eq!(g.pending(amp, 0), 0);
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(
            g.disconnect(amp, 0),
            Err(ConfigError::InputNotConnected { node: 0, port: 0 })
        );

        // Output is unconnected again, so dc stops producing
        g.tick();
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn typed_access_round_trips() {
        let mut g = graph(4);
        let amp = g.add_node(AudioAmplifier::new());
        g.node_mut(amp).unwrap().gain(0.25);
        assert_eq!(g.node(amp).unwrap().current_gain(), 0.25);
    }

    #[test]
    fn transport_nodes_register() {
        let mut g = graph(4);
        let (play, _producer) = AudioPlayQueue::new();
        let (record, _consumer) = AudioRecordQueue::new();
        let play = g.add_node(play);
        let record = g.add_node(record);
        g.connect(play, 0, record, 0).unwrap();
    }
}
