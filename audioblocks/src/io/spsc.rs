//! Lock-free single-producer single-consumer (SPSC) ring buffer.
//!
//! Used for node input ports and for handing blocks between the audio tick
//! and other contexts (interrupt handlers, user threads).
//!
//! # Safety Contract
//!
//! - Only ONE context may call [`push()`](SpscQueue::push) (the "producer").
//! - Only ONE context may call [`pop()`](SpscQueue::pop) (the "consumer").
//! - These may be different threads/ISR contexts running concurrently.

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicUsize, Ordering};

/// A lock-free single-producer single-consumer (SPSC) queue with `N` slots.
///
/// `head` and `tail` are free-running counters; the slot for a counter value
/// is `counter & (N - 1)`, so `N` must be a power of two and every slot is
/// usable.
pub struct SpscQueue<T, const N: usize> {
    buffer: [UnsafeCell<MaybeUninit<T>>; N],
    /// Items ever pushed (only modified by the producer).
    head: AtomicUsize,
    /// Items ever popped (only modified by the consumer).
    tail: AtomicUsize,
}

// SAFETY: T: Send is required because values cross thread/ISR boundaries.
// The SPSC contract ensures head and tail each have a single writer, and
// acquire/release ordering publishes slot contents before the index moves.
unsafe impl<T: Send, const N: usize> Sync for SpscQueue<T, N> {}
unsafe impl<T: Send, const N: usize> Send for SpscQueue<T, N> {}

impl<T, const N: usize> SpscQueue<T, N> {
    const MASK: usize = N - 1;

    /// Create a new empty queue.
    ///
    /// # Panics
    ///
    /// Compile-time assertion: `N` must be a non-zero power of two.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "SPSC queue size must be a power of two");

        SpscQueue {
            // SAFETY: An array of uninitialized MaybeUninit<T> is always valid.
            // UnsafeCell is a transparent wrapper that doesn't affect validity.
            buffer: unsafe {
                MaybeUninit::<[UnsafeCell<MaybeUninit<T>>; N]>::uninit().assume_init()
            },
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Push a value (producer side).
    ///
    /// Returns `Err(val)` if the queue is full, handing ownership back.
    pub fn push(&self, val: T) -> Result<(), T> {
        let head = self.head.load(Ordering::Relaxed);
        if head.wrapping_sub(self.tail.load(Ordering::Acquire)) == N {
            return Err(val);
        }

        // SAFETY: We are the sole producer and the slot is not occupied:
        // fewer than N items are in flight.
        unsafe {
            (*self.buffer[head & Self::MASK].get()).write(val);
        }

        self.head.store(head.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Pop a value (consumer side). Returns `None` if the queue is empty.
    pub fn pop(&self) -> Option<T> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: We are the sole consumer and `tail != head` guarantees this
        // slot holds a value published by the producer.
        let val = unsafe { (*self.buffer[tail & Self::MASK].get()).assume_init_read() };

        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(val)
    }

    /// Pop and drop everything currently queued (consumer side).
    /// Returns the number of items removed.
    pub fn clear(&self) -> usize {
        let mut n = 0;
        while self.pop().is_some() {
            n += 1;
        }
        n
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the queue is full.
    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        head.wrapping_sub(tail)
    }

    /// Number of slots.
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T, const N: usize> Default for SpscQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Drop for SpscQueue<T, N> {
    fn drop(&mut self) {
        // Drop any remaining items; queued blocks go back to their pool.
        self.clear();
    }
}
