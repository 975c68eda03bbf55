use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::UnsafeCell;
use core::fmt;
use core::sync::atomic::{AtomicU16, AtomicU32, AtomicUsize, Ordering};

use crate::config::AudioConfig;
use crate::constants::AUDIO_BLOCK_SAMPLES;
use crate::error::ConfigError;

use super::ref_types::AudioBlockMut;

/// Raw audio block storage: sample data plus the metadata that travels with it.
pub(crate) struct BlockData {
    pub samples: [f32; AUDIO_BLOCK_SAMPLES],
    /// Number of valid samples (≤ `AUDIO_BLOCK_SAMPLES`).
    pub len: usize,
    pub sample_rate_hz: f32,
    pub sequence_id: u32,
}

impl BlockData {
    fn silent(len: usize, sample_rate_hz: f32) -> Self {
        BlockData {
            samples: [0.0; AUDIO_BLOCK_SAMPLES],
            len,
            sample_rate_hz,
            sequence_id: 0,
        }
    }
}

/// A storage slot inside one [`BlockPool`], tagged with the allocation it
/// belongs to.
///
/// The generation changes every time the slot is handed out again, so an id
/// kept past its release no longer matches the slot and the pool rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    index: u16,
    generation: u32,
}

impl SlotId {
    /// Position of the slot in the pool.
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Allocation count of the slot when this id was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}#{}", self.index, self.generation)
    }
}

/// Snapshot of pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Total number of blocks.
    pub capacity: usize,
    /// Blocks currently allocated.
    pub outstanding: usize,
    /// Highest `outstanding` seen since creation or the last [`BlockPool::reset_peak`].
    pub peak_outstanding: usize,
    /// `allocate` calls that found the pool exhausted.
    pub allocation_failures: u32,
    /// Releases or retains of slots that were not allocated, or of stale ids.
    pub faults: u32,
}

/// Bounded lock-free allocator for audio blocks.
///
/// Uses an atomic bitmap to track which slots are allocated and per-slot
/// atomic reference counts for shared ownership. All operations are lock-free
/// and safe to call from interrupt context or from another thread while the
/// scheduler is ticking. Storage is allocated once in [`BlockPool::new`]; the
/// pool never grows.
pub struct BlockPool {
    config: AudioConfig,
    /// Bit N of word W = 1 means slot `W * 32 + N` is allocated. Bits past
    /// the capacity are permanently set.
    bitmap: Box<[AtomicU32]>,
    refcounts: Box<[AtomicU16]>,
    generations: Box<[AtomicU32]>,
    storage: Box<[UnsafeCell<BlockData>]>,
    next_sequence: AtomicU32,
    outstanding: AtomicUsize,
    peak: AtomicUsize,
    failures: AtomicU32,
    faults: AtomicU32,
}

// SAFETY: Shared state is atomic. A storage slot is only written by the
// holder of its exclusive handle (refcount == 1, claimed through the bitmap
// CAS) and only read through handles that keep the refcount above zero.
unsafe impl Sync for BlockPool {}

impl BlockPool {
    /// Create a pool sized and configured by `config`.
    pub fn new(config: &AudioConfig) -> Result<Arc<Self>, ConfigError> {
        config.validate()?;
        let capacity = config.pool_blocks;
        let words = capacity.div_ceil(32);

        let bitmap: Vec<AtomicU32> = (0..words)
            .map(|w| {
                let used = (capacity - w * 32).min(32);
                let padding = if used == 32 { 0 } else { u32::MAX << used };
                AtomicU32::new(padding)
            })
            .collect();
        let refcounts: Vec<AtomicU16> = (0..capacity).map(|_| AtomicU16::new(0)).collect();
        let generations: Vec<AtomicU32> = (0..capacity).map(|_| AtomicU32::new(0)).collect();
        let storage: Vec<UnsafeCell<BlockData>> = (0..capacity)
            .map(|_| UnsafeCell::new(BlockData::silent(config.frame_len, config.sample_rate_hz)))
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            capacity,
            frame_len = config.frame_len,
            sample_rate_hz = config.sample_rate_hz,
            "block pool created"
        );

        Ok(Arc::new(BlockPool {
            config: *config,
            bitmap: bitmap.into_boxed_slice(),
            refcounts: refcounts.into_boxed_slice(),
            generations: generations.into_boxed_slice(),
            storage: storage.into_boxed_slice(),
            next_sequence: AtomicU32::new(0),
            outstanding: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            failures: AtomicU32::new(0),
            faults: AtomicU32::new(0),
        }))
    }

    /// Create a pool of `capacity` blocks with the default rate and frame size.
    pub fn with_capacity(capacity: usize) -> Result<Arc<Self>, ConfigError> {
        Self::new(&AudioConfig::default().with_pool_blocks(capacity))
    }

    /// Allocate a block and wrap it in an exclusive handle.
    ///
    /// Returns `None` when the pool is exhausted. Exhaustion is an expected
    /// condition under load; callers skip the frame.
    pub fn allocate(self: &Arc<Self>) -> Option<AudioBlockMut> {
        self.allocate_slot()
            .map(|slot| AudioBlockMut::from_slot(Arc::clone(self), slot))
    }

    /// Claim a raw slot. Returns the slot id, or `None` if the pool is full.
    ///
    /// The returned slot has refcount = 1, zeroed samples, `len` set to the
    /// configured frame length, a fresh sequence id and a new generation.
    /// Whoever calls this owns one reference and must hand it to
    /// [`release`](Self::release). Outside the crate the handles are the only
    /// way in.
    pub(crate) fn allocate_slot(&self) -> Option<SlotId> {
        for (w, word) in self.bitmap.iter().enumerate() {
            let mut current = word.load(Ordering::Acquire);
            while current != u32::MAX {
                let bit = (!current).trailing_zeros();
                match word.compare_exchange_weak(
                    current,
                    current | (1 << bit),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => return Some(self.init_slot(w * 32 + bit as usize)),
                    // another context raced us, retry with its view
                    Err(actual) => current = actual,
                }
            }
        }
        self.failures.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn init_slot(&self, index: usize) -> SlotId {
        let generation = self.generations[index].fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        self.refcounts[index].store(1, Ordering::Release);
        // SAFETY: We just exclusively claimed this slot via the bitmap CAS.
        let data = unsafe { &mut *self.storage[index].get() };
        data.samples = [0.0; AUDIO_BLOCK_SAMPLES];
        data.len = self.config.frame_len;
        data.sample_rate_hz = self.config.sample_rate_hz;
        data.sequence_id = self.next_sequence.fetch_add(1, Ordering::Relaxed);

        let now = self.outstanding.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(now, Ordering::Relaxed);

        SlotId {
            index: index as u16,
            generation,
        }
    }

    /// Refcount cell of `slot`, or `None` when the id is out of range or
    /// from an earlier allocation of the slot.
    fn live_refcount(&self, slot: SlotId) -> Option<&AtomicU16> {
        let rc = self.refcounts.get(slot.index())?;
        let current = self.generations[slot.index()].load(Ordering::Acquire);
        (current == slot.generation).then_some(rc)
    }

    /// Increment the reference count of an allocated slot (fan-out).
    ///
    /// Retaining a free slot is a programming error: it trips a debug
    /// assertion and is otherwise ignored and counted as a fault.
    pub(crate) fn retain(&self, slot: SlotId) {
        let Some(rc) = self.live_refcount(slot) else {
            self.fault(slot, "retain of stale block");
            return;
        };
        let mut current = rc.load(Ordering::Acquire);
        loop {
            if current == 0 {
                self.fault(slot, "retain of unallocated block");
                return;
            }
            debug_assert!(current < u16::MAX, "refcount overflow on {slot}");
            match rc.compare_exchange_weak(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }

    /// Decrement the reference count of a slot, freeing it at zero.
    ///
    /// Releasing a slot whose count is already zero is a double release: it
    /// trips a debug assertion and, without debug assertions, leaves the free
    /// bitmap untouched and counts a fault. An id from an earlier allocation
    /// of the slot is treated the same way and never touches the new owner.
    pub(crate) fn release(&self, slot: SlotId) {
        let Some(rc) = self.live_refcount(slot) else {
            self.fault(slot, "stale release of block");
            return;
        };
        let mut current = rc.load(Ordering::Acquire);
        loop {
            if current == 0 {
                self.fault(slot, "double release of block");
                return;
            }
            match rc.compare_exchange_weak(current, current - 1, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
        if current == 1 {
            // Refcount went from 1 to 0, so return the slot. The counter drops
            // before the bit clears so `outstanding` never exceeds capacity.
            self.outstanding.fetch_sub(1, Ordering::AcqRel);
            let word = slot.index() / 32;
            let bit = 1u32 << (slot.index() % 32);
            self.bitmap[word].fetch_and(!bit, Ordering::Release);
        }
    }

    fn fault(&self, slot: SlotId, what: &'static str) {
        self.faults.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "tracing")]
        tracing::warn!(slot = slot.index(), "{what}");
        debug_assert!(false, "{what}: {slot}");
    }

    /// Current reference count of a slot (0 when free or reallocated).
    pub fn refcount(&self, slot: SlotId) -> u16 {
        self.live_refcount(slot)
            .map_or(0, |rc| rc.load(Ordering::Acquire))
    }

    /// Get a pointer to the block data for a given slot.
    ///
    /// # Safety
    /// Caller must hold a reference to the slot. Writing through the pointer
    /// additionally requires that reference to be the only one.
    pub(crate) unsafe fn data_ptr(&self, slot: SlotId) -> *mut BlockData {
        self.storage[slot.index()].get()
    }

    /// Number of blocks currently allocated.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Total number of blocks.
    pub fn capacity(&self) -> usize {
        self.config.pool_blocks
    }

    /// Configuration the pool was built with.
    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Snapshot of all counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.capacity(),
            outstanding: self.outstanding(),
            peak_outstanding: self.peak.load(Ordering::Relaxed),
            allocation_failures: self.failures.load(Ordering::Relaxed),
            faults: self.faults.load(Ordering::Relaxed),
        }
    }

    /// Reset the high-water mark to the current outstanding count.
    pub fn reset_peak(&self) {
        self.peak.store(self.outstanding(), Ordering::Relaxed);
    }
}

impl fmt::Debug for BlockPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockPool")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
