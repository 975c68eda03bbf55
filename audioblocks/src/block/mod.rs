//! Audio block memory: a bounded pool and refcounted handles into it.
//!
//! A [`BlockPool`] is created once, sized for the worst-case number of blocks
//! alive at any instant across the graph, and shared through an `Arc`.
//! [`AudioBlockMut`] is the unique writable handle returned by allocation;
//! [`AudioBlockRef`] is the shared read-only handle used for routing and
//! fan-out. Both release their slot when dropped, so a block is returned to
//! the pool exactly once on every exit path.

pub mod pool;
mod ref_types;

pub use pool::{BlockPool, PoolStats, SlotId};
pub use ref_types::{AudioBlockMut, AudioBlockRef};
