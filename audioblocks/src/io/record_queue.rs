//! Graph-to-user audio queue.
//!
//! [`AudioRecordQueue`] lets code outside the tick read the blocks reaching
//! one point of the graph: recording, offline analysis, streaming to storage.
//!
//! ## Usage
//!
//! ```ignore
//! let (record, mut consumer) = AudioRecordQueue::new();
//! let record = graph.add_node(record);
//! graph.connect(amp, 0, record, 0)?;
//! consumer.start();
//!
//! // In the audio callback:
//! graph.tick();
//!
//! // In user code:
//! while let Some(block) = consumer.read() {
//!     // Process the captured block...
//! }
//! ```

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::block::AudioBlockRef;
use crate::node::{AudioNode, Ports};

use super::spsc::SpscQueue;
use super::TRANSPORT_QUEUE_SLOTS;

struct Shared {
    queue: SpscQueue<AudioBlockRef, TRANSPORT_QUEUE_SLOTS>,
    recording: AtomicBool,
    overruns: AtomicU32,
}

/// Graph side of a record queue.
///
/// Implements [`AudioNode`] with 1 input and 0 outputs. While recording, each
/// incoming block is handed to the consumer; when the consumer falls behind
/// the block is released and counted as an overrun.
pub struct AudioRecordQueue {
    shared: Arc<Shared>,
}

/// Consumer side of a record queue.
///
/// Recording starts stopped; nothing is captured until [`start`](Self::start).
pub struct RecordConsumer {
    shared: Arc<Shared>,
}

impl AudioRecordQueue {
    /// Create the node and its consumer handle.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (AudioRecordQueue, RecordConsumer) {
        let shared = Arc::new(Shared {
            queue: SpscQueue::new(),
            recording: AtomicBool::new(false),
            overruns: AtomicU32::new(0),
        });
        (
            AudioRecordQueue {
                shared: Arc::clone(&shared),
            },
            RecordConsumer { shared },
        )
    }

    /// Whether the consumer has recording enabled.
    pub fn is_recording(&self) -> bool {
        self.shared.recording.load(Ordering::Acquire)
    }
}

impl RecordConsumer {
    /// Start capturing blocks.
    pub fn start(&self) {
        self.shared.recording.store(true, Ordering::Release);
    }

    /// Stop capturing. Blocks already queued can still be read.
    pub fn stop(&self) {
        self.shared.recording.store(false, Ordering::Release);
    }

    /// Whether capture is active.
    pub fn is_recording(&self) -> bool {
        self.shared.recording.load(Ordering::Acquire)
    }

    /// Take the oldest captured block.
    pub fn read(&mut self) -> Option<AudioBlockRef> {
        self.shared.queue.pop()
    }

    /// Whether a captured block is waiting.
    pub fn available(&self) -> bool {
        !self.shared.queue.is_empty()
    }

    /// Number of captured blocks waiting.
    pub fn len(&self) -> usize {
        self.shared.queue.len()
    }

    /// Whether nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.shared.queue.is_empty()
    }

    /// Blocks dropped because the queue was full.
    pub fn overruns(&self) -> u32 {
        self.shared.overruns.load(Ordering::Relaxed)
    }
}

impl AudioNode for AudioRecordQueue {
    const NUM_INPUTS: usize = 1;
    const NUM_OUTPUTS: usize = 0;

    fn update(&mut self, ports: &mut Ports<'_>) {
        if !self.is_recording() {
            return;
        }
        let Some(block) = ports.receive_read_only(0) else {
            return;
        };
        if self.shared.queue.push(block).is_err() {
            self.shared.overruns.fetch_add(1, Ordering::Relaxed);
            #[cfg(feature = "tracing")]
            tracing::trace!("record queue full, block dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockPool;

    fn make_block(pool: &Arc<BlockPool>, value: f32) -> AudioBlockRef {
        let mut block = pool.allocate().unwrap();
        block.fill(value);
        block.into_shared()
    }

    fn feed(node: &mut AudioRecordQueue, pool: &Arc<BlockPool>, block: Option<AudioBlockRef>) {
        let mut inputs = [block];
        let mut outputs: [Option<AudioBlockRef>; 0] = [];
        let mut ports = Ports::new(pool, &mut inputs, &mut outputs, &[]);
        node.update(&mut ports);
    }

    #[test]
    fn new_is_stopped_and_empty() {
        let (q, consumer) = AudioRecordQueue::new();
        assert!(!q.is_recording());
        assert!(!consumer.is_recording());
        assert!(!consumer.available());
        assert_eq!(consumer.len(), 0);
    }

    #[test]
    fn start_stop_visible_to_node() {
        let (q, consumer) = AudioRecordQueue::new();
        consumer.start();
        assert!(q.is_recording());
        consumer.stop();
        assert!(!q.is_recording());
    }

    #[test]
    fn discards_when_not_recording() {
        let pool = BlockPool::with_capacity(2).unwrap();
        let (mut q, mut consumer) = AudioRecordQueue::new();

        let block = make_block(&pool, 0.5);
        feed(&mut q, &pool, Some(block));
        assert!(consumer.read().is_none());
        // the untaken input is dropped along with the scratch array
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn records_when_active() {
        let pool = BlockPool::with_capacity(2).unwrap();
        let (mut q, mut consumer) = AudioRecordQueue::new();
        consumer.start();

        feed(&mut q, &pool, Some(make_block(&pool, 0.75)));
        assert!(consumer.available());
        assert_eq!(consumer.len(), 1);

        let recorded = consumer.read().unwrap();
        assert_eq!(recorded[0], 0.75);
        assert_eq!(recorded[127], 0.75);
    }

    #[test]
    fn full_queue_drops_and_counts() {
        let pool = BlockPool::with_capacity(8).unwrap();
        let (mut q, mut consumer) = AudioRecordQueue::new();
        consumer.start();

        for i in 0..TRANSPORT_QUEUE_SLOTS {
            feed(&mut q, &pool, Some(make_block(&pool, i as f32)));
        }
        feed(&mut q, &pool, Some(make_block(&pool, 99.0)));

        assert_eq!(consumer.len(), TRANSPORT_QUEUE_SLOTS);
        assert_eq!(consumer.overruns(), 1);
        assert_eq!(pool.outstanding(), TRANSPORT_QUEUE_SLOTS);

        for i in 0..TRANSPORT_QUEUE_SLOTS {
            assert_eq!(consumer.read().unwrap()[0], i as f32);
        }
        assert!(consumer.read().is_none());
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn read_after_stop_returns_remaining() {
        let pool = BlockPool::with_capacity(4).unwrap();
        let (mut q, mut consumer) = AudioRecordQueue::new();
        consumer.start();

        feed(&mut q, &pool, Some(make_block(&pool, 0.1)));
        feed(&mut q, &pool, Some(make_block(&pool, 0.2)));
        consumer.stop();
        feed(&mut q, &pool, Some(make_block(&pool, 0.3)));

        assert_eq!(consumer.read().unwrap()[0], 0.1);
        assert_eq!(consumer.read().unwrap()[0], 0.2);
        assert!(consumer.read().is_none());
    }

    #[test]
    fn none_input_ignored() {
        let pool = BlockPool::with_capacity(1).unwrap();
        let (mut q, consumer) = AudioRecordQueue::new();
        consumer.start();

        feed(&mut q, &pool, None);
        assert!(!consumer.available());
    }
}
