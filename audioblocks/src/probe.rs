//! Lock-free diagnostic values read from outside the tick.
//!
//! Analysis nodes publish a measurement once per window; a supervisory
//! context (console, UI thread) polls it. Both sides only touch atomics, so
//! a read never waits on the audio callback and the callback never waits on
//! a reader.

use core::sync::atomic::{AtomicBool, Ordering};

use portable_atomic::AtomicF32;

/// A single published `f32` with a "new value" flag.
#[derive(Debug)]
pub struct LevelProbe {
    level: AtomicF32,
    fresh: AtomicBool,
}

impl LevelProbe {
    /// A probe holding 0.0 with nothing published yet.
    pub const fn new() -> Self {
        LevelProbe {
            level: AtomicF32::new(0.0),
            fresh: AtomicBool::new(false),
        }
    }

    /// Store a new measurement (tick side).
    pub fn publish(&self, value: f32) {
        self.level.store(value, Ordering::Relaxed);
        self.fresh.store(true, Ordering::Release);
    }

    /// Whether a measurement arrived since the last [`read`](Self::read).
    pub fn available(&self) -> bool {
        self.fresh.load(Ordering::Acquire)
    }

    /// Take the latest measurement and clear the flag.
    pub fn read(&self) -> f32 {
        self.fresh.store(false, Ordering::Relaxed);
        self.level.load(Ordering::Acquire)
    }

    /// Latest measurement, leaving the flag alone.
    pub fn peek(&self) -> f32 {
        self.level.load(Ordering::Relaxed)
    }
}

impl Default for LevelProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_then_read_clears_flag() {
        let probe = LevelProbe::new();
        assert!(!probe.available());

        probe.publish(0.75);
        assert!(probe.available());
        assert_eq!(probe.peek(), 0.75);
        assert!(probe.available());

        assert_eq!(probe.read(), 0.75);
        assert!(!probe.available());
        assert_eq!(probe.peek(), 0.75);
    }

    #[test]
    #[cfg(feature = "std")]
    fn read_from_another_thread() {
        use alloc::sync::Arc;

        let probe = Arc::new(LevelProbe::new());
        let writer = Arc::clone(&probe);
        std::thread::spawn(move || writer.publish(0.5)).join().unwrap();
        assert!(probe.available());
        assert_eq!(probe.read(), 0.5);
    }
}
