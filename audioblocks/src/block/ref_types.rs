use alloc::sync::Arc;
use core::fmt;
use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};

use crate::constants::AUDIO_BLOCK_SAMPLES;

use super::pool::{BlockData, BlockPool, SlotId};

/// Exclusive (mutable) handle to an audio block in a pool.
///
/// There is exactly one `AudioBlockMut` per allocated slot.
/// Derefs to the valid `len()` samples of the block.
/// Dropping an `AudioBlockMut` releases the block back to its pool.
pub struct AudioBlockMut {
    pool: Arc<BlockPool>,
    slot: SlotId,
}

impl AudioBlockMut {
    /// Wrap a slot the caller owns one reference to.
    ///
    /// The slot must have refcount = 1 and no other handle may exist for it.
    pub(crate) fn from_slot(pool: Arc<BlockPool>, slot: SlotId) -> Self {
        AudioBlockMut { pool, slot }
    }

    /// Allocate a new audio block from `pool`.
    /// Returns `None` if the pool is exhausted.
    pub fn alloc(pool: &Arc<BlockPool>) -> Option<Self> {
        pool.allocate()
    }

    /// Convert this exclusive handle into a shared one.
    /// This is a zero-cost conversion (no data copy, no refcount change).
    pub fn into_shared(self) -> AudioBlockRef {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the pool `Arc` and the slot
        // reference move into the new handle exactly once.
        let pool = unsafe { core::ptr::read(&this.pool) };
        AudioBlockRef {
            pool,
            slot: this.slot,
        }
    }

    /// Get the pool slot index.
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// The pool this block belongs to.
    pub fn pool(&self) -> &Arc<BlockPool> {
        &self.pool
    }

    /// Set the number of valid samples, clamped to the block capacity.
    pub fn set_len(&mut self, len: usize) {
        self.data_mut().len = len.min(AUDIO_BLOCK_SAMPLES);
    }

    /// Sample rate the data was produced at.
    pub fn sample_rate_hz(&self) -> f32 {
        self.data().sample_rate_hz
    }

    /// Identity used to correlate companion blocks across nodes.
    pub fn sequence_id(&self) -> u32 {
        self.data().sequence_id
    }

    /// Copy length, rate and sequence id from `other`, so this block is
    /// recognisable as the companion of (or successor to) `other`.
    pub fn copy_metadata_from(&mut self, other: &AudioBlockRef) {
        let src = other.data();
        let (len, rate, seq) = (src.len, src.sample_rate_hz, src.sequence_id);
        let dst = self.data_mut();
        dst.len = len;
        dst.sample_rate_hz = rate;
        dst.sequence_id = seq;
    }

    /// The whole backing array, ignoring `len`.
    pub fn capacity_mut(&mut self) -> &mut [f32; AUDIO_BLOCK_SAMPLES] {
        &mut self.data_mut().samples
    }

    fn data(&self) -> &BlockData {
        // SAFETY: We hold the only reference to an allocated slot.
        unsafe { &*self.pool.data_ptr(self.slot) }
    }

    fn data_mut(&mut self) -> &mut BlockData {
        // SAFETY: We hold exclusive access (refcount == 1, unique AudioBlockMut).
        unsafe { &mut *self.pool.data_ptr(self.slot) }
    }
}

impl Deref for AudioBlockMut {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        let data = self.data();
        &data.samples[..data.len]
    }
}

impl DerefMut for AudioBlockMut {
    fn deref_mut(&mut self) -> &mut Self::Target {
        let data = self.data_mut();
        &mut data.samples[..data.len]
    }
}

impl Drop for AudioBlockMut {
    fn drop(&mut self) {
        self.pool.release(self.slot);
    }
}

impl fmt::Debug for AudioBlockMut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioBlockMut")
            .field("slot", &self.slot)
            .field("len", &self.len())
            .field("sequence_id", &self.sequence_id())
            .finish()
    }
}

/// Shared (immutable) handle to an audio block in a pool.
///
/// Multiple `AudioBlockRef`s can point to the same slot. Cloning increments the
/// refcount; dropping decrements it. When the last reference is dropped, the
/// pool slot is freed.
pub struct AudioBlockRef {
    pool: Arc<BlockPool>,
    slot: SlotId,
}

impl AudioBlockRef {
    /// Get the pool slot index.
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// The pool this block belongs to.
    pub fn pool(&self) -> &Arc<BlockPool> {
        &self.pool
    }

    /// Sample rate the data was produced at.
    pub fn sample_rate_hz(&self) -> f32 {
        self.data().sample_rate_hz
    }

    /// Identity used to correlate companion blocks across nodes.
    pub fn sequence_id(&self) -> u32 {
        self.data().sequence_id
    }

    /// Whether this is the only handle to the block.
    pub fn is_unique(&self) -> bool {
        self.pool.refcount(self.slot) == 1
    }

    /// Try to convert back to an exclusive mutable handle.
    ///
    /// - If this is the only reference (refcount == 1), converts in place (no copy).
    /// - If there are other references, allocates a new block, copies the data
    ///   and metadata, and returns the new exclusive block. Returns `None` if the
    ///   pool is exhausted; the shared reference is released either way.
    pub fn into_mut(self) -> Option<AudioBlockMut> {
        if self.is_unique() {
            let this = ManuallyDrop::new(self);
            // SAFETY: `this` is never dropped; the sole reference moves over.
            let pool = unsafe { core::ptr::read(&this.pool) };
            return Some(AudioBlockMut::from_slot(pool, this.slot));
        }
        // Clone-on-write: allocate a new block and copy
        let mut copy = self.pool.allocate()?;
        copy.capacity_mut().copy_from_slice(&self.data().samples);
        copy.copy_metadata_from(&self);
        Some(copy)
    }

    fn data(&self) -> &BlockData {
        // SAFETY: Slot is allocated while we hold a reference and data is
        // immutable through shared handles.
        unsafe { &*self.pool.data_ptr(self.slot) }
    }
}

impl Deref for AudioBlockRef {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        let data = self.data();
        &data.samples[..data.len]
    }
}

impl Clone for AudioBlockRef {
    fn clone(&self) -> Self {
        self.pool.retain(self.slot);
        AudioBlockRef {
            pool: Arc::clone(&self.pool),
            slot: self.slot,
        }
    }
}

impl Drop for AudioBlockRef {
    fn drop(&mut self) {
        self.pool.release(self.slot);
    }
}

impl From<AudioBlockMut> for AudioBlockRef {
    fn from(block: AudioBlockMut) -> Self {
        block.into_shared()
    }
}

impl fmt::Debug for AudioBlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioBlockRef")
            .field("slot", &self.slot)
            .field("len", &self.len())
            .field("sequence_id", &self.sequence_id())
            .finish()
    }
}
