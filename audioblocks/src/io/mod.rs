//! Transports between the audio graph and the outside world.
//!
//! Each transport is split in two: a node that lives in the graph and a
//! handle that lives in another context (a user thread, an interrupt
//! handler). The two halves share one lock-free [`spsc`] queue, so the tick
//! never waits on the other side.
//!
//! ## Components
//!
//! | Node | Inputs | Outputs | Handle | Description |
//! |------|--------|---------|--------|-------------|
//! | [`AudioPlayQueue`] | 0 | 1 | [`PlayProducer`] | User code → audio graph |
//! | [`AudioRecordQueue`] | 1 | 0 | [`RecordConsumer`] | Audio graph → user code |
//!
//! ## Utilities
//!
//! - [`spsc`]: lock-free single-producer single-consumer ring buffer

pub mod spsc;
pub mod play_queue;
pub mod record_queue;

pub use play_queue::{AudioPlayQueue, PlayProducer};
pub use record_queue::{AudioRecordQueue, RecordConsumer};

/// Blocks either transport half can hold before the other side catches up.
pub const TRANSPORT_QUEUE_SLOTS: usize = 4;
