//! Circular delay line with power-of-two addressing.
//!
//! The shared history buffer for nodes that look back (or ahead) across tick
//! boundaries: delay effects, lookahead limiters, noise blankers, anything
//! reassembling a window longer than one block.
//!
//! The buffer length is always `2^k`, so wraparound is `index & mask` with
//! no modulo and no branch, and every index produced that way is in bounds.
//!
//! # Addressing
//!
//! The line keeps a write cursor. [`write`](DelayLine::write) stores at the
//! cursor without moving it; [`advance`](DelayLine::advance) moves it by the
//! number of samples consumed. [`push`](DelayLine::push) does both for one
//! sample. [`read_at`](DelayLine::read_at) reads `cursor + offset`, which
//! makes negative offsets (as wrapping `usize`) look back in time, and
//! [`delayed`](DelayLine::delayed) names the common case directly: the value
//! pushed `lag` samples before the most recent one.

use alloc::boxed::Box;
use alloc::vec;

use crate::error::ConfigError;

/// Mask `index` into a buffer whose length is `mask + 1`.
#[inline]
pub fn wrap(index: usize, mask: usize) -> usize {
    index & mask
}

/// A `2^k`-sample circular history buffer.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Box<[f32]>,
    mask: usize,
    cursor: usize,
}

impl DelayLine {
    /// Create a silent delay line of exactly `size` samples.
    ///
    /// `size` must be a non-zero power of two.
    pub fn new(size: usize) -> Result<Self, ConfigError> {
        if !size.is_power_of_two() {
            return Err(ConfigError::DelayNotPowerOfTwo(size));
        }
        Ok(DelayLine {
            buffer: vec![0.0; size].into_boxed_slice(),
            mask: size - 1,
            cursor: 0,
        })
    }

    /// Create the smallest delay line holding at least `min_len` samples.
    pub fn with_min_len(min_len: usize) -> Self {
        let size = min_len.max(1).next_power_of_two();
        DelayLine {
            buffer: vec![0.0; size].into_boxed_slice(),
            mask: size - 1,
            cursor: 0,
        }
    }

    /// Buffer length in samples.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Always false; a delay line holds at least one sample.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// `len() - 1`.
    pub fn mask(&self) -> usize {
        self.mask
    }

    /// Current write position, already masked into range.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Store `sample` at the cursor without moving it.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.cursor] = sample;
    }

    /// Read the sample at `cursor + offset`, wrapping.
    #[inline]
    pub fn read_at(&self, offset: usize) -> f32 {
        self.buffer[wrap(self.cursor.wrapping_add(offset), self.mask)]
    }

    /// Move the cursor forward by `n` samples.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.cursor = wrap(self.cursor.wrapping_add(n), self.mask);
    }

    /// Write one sample and advance past it.
    #[inline]
    pub fn push(&mut self, sample: f32) {
        self.write(sample);
        self.advance(1);
    }

    /// The sample pushed `lag` samples before the most recent one.
    ///
    /// `delayed(0)` is the last pushed sample. Lags of `len()` or more alias
    /// back into the buffer.
    #[inline]
    pub fn delayed(&self, lag: usize) -> f32 {
        self.read_at(lag.wrapping_add(1).wrapping_neg())
    }

    /// Push a whole block.
    pub fn push_block(&mut self, samples: &[f32]) {
        for &s in samples {
            self.push(s);
        }
    }

    /// Fill `out` with the most recent `out.len()` samples delayed by `delay`.
    ///
    /// After pushing a block of `n` samples, `read_delayed_block(d, out)` with
    /// `out.len() == n` yields that block as it was `d` samples ago. The
    /// caller keeps `delay + out.len() <= len()`.
    pub fn read_delayed_block(&self, delay: usize, out: &mut [f32]) {
        let n = out.len();
        debug_assert!(delay + n <= self.len(), "delay window exceeds line length");
        for (i, sample) in out.iter_mut().enumerate() {
            *sample = self.delayed(delay + n - 1 - i);
        }
    }

    /// Silence the buffer and reset the cursor.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.cursor = 0;
    }
}
