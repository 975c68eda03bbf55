//! User-to-graph audio queue.
//!
//! [`AudioPlayQueue`] lets code outside the tick inject blocks into the
//! graph: streamed files, test tones, data from another device.
//!
//! ## Usage
//!
//! ```ignore
//! let (play, mut producer) = AudioPlayQueue::new();
//! let play = graph.add_node(play);
//!
//! // In user code (another thread, a low-priority task):
//! let mut block = pool.allocate().unwrap();
//! block.fill(0.25);
//! producer.play(block).unwrap();
//!
//! // In the audio callback:
//! graph.tick(); // emits the queued block on output 0
//! ```

use alloc::sync::Arc;

use crate::block::AudioBlockRef;
use crate::node::{AudioNode, Ports};

use super::spsc::SpscQueue;
use super::TRANSPORT_QUEUE_SLOTS;

type Shared = SpscQueue<AudioBlockRef, TRANSPORT_QUEUE_SLOTS>;

/// Graph side of a play queue.
///
/// Implements [`AudioNode`] with 0 inputs and 1 output and emits at most one
/// queued block per tick.
pub struct AudioPlayQueue {
    queue: Arc<Shared>,
}

/// Producer side of a play queue.
///
/// Holding it by value (or `&mut`) is what makes this the single producer,
/// so it can be moved to another thread but not shared.
pub struct PlayProducer {
    queue: Arc<Shared>,
}

impl AudioPlayQueue {
    /// Create the node and its producer handle.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (AudioPlayQueue, PlayProducer) {
        let queue = Arc::new(SpscQueue::new());
        (
            AudioPlayQueue {
                queue: Arc::clone(&queue),
            },
            PlayProducer { queue },
        )
    }

    /// Blocks waiting to be emitted.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl PlayProducer {
    /// Enqueue a block for playback on a future tick.
    ///
    /// Returns `Err(block)` if the queue is full; the caller keeps ownership
    /// and can retry or drop it.
    pub fn play(&mut self, block: impl Into<AudioBlockRef>) -> Result<(), AudioBlockRef> {
        self.queue.push(block.into())
    }

    /// Blocks not yet picked up by the graph.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the graph has drained everything queued so far.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Whether [`play`](Self::play) would currently be rejected.
    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }
}

impl AudioNode for AudioPlayQueue {
    const NUM_INPUTS: usize = 0;
    const NUM_OUTPUTS: usize = 1;

    fn update(&mut self, ports: &mut Ports<'_>) {
        if let Some(block) = self.queue.pop() {
            ports.transmit(0, block);
        }
    }
}
