//! # audioblocks
//!
//! A block-based streaming audio graph runtime for real-time audio. Nodes
//! exchange fixed-size, reference-counted sample blocks drawn from a bounded
//! pool; a scheduler runs every node once per tick in registration order.
//! Nothing on the tick path blocks, locks or touches the heap, so a tick can
//! run from an audio interrupt or a device callback.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Config | [`config`] / [`error`] | Injected sample rate, frame and pool sizing; configuration errors |
//! | Memory | [`block`] | Lock-free block pool with refcounted RAII handles |
//! | Trait | [`node`] | `AudioNode` and the per-tick `Ports` view |
//! | Graph | [`graph`] | Edges, input queues and the registration-order scheduler |
//! | I/O | [`io`] | Lock-free SPSC queue, play/record transports |
//! | Utility | [`delay_line`] / [`probe`] | Power-of-two history buffer; lock-free diagnostic values |
//! | DSP | [`dsp`] / [`nodes`] | Synthesis, routing, effects, analysis (feature-gated) |
//!
//! ## Quick start
//!
//! ```ignore
//! use audioblocks::prelude::*;
//!
//! // sine → amplifier → peak analyzer
//! let pool = BlockPool::new(&AudioConfig::default())?;
//! let mut graph = AudioGraph::new(pool);
//!
//! let sine = graph.add_node(AudioSynthSine::new());
//! let amp = graph.add_node(AudioAmplifier::new());
//! let peak = AudioAnalyzePeak::new();
//! let level = peak.probe();
//! let peak = graph.add_node(peak);
//!
//! graph.connect(sine, 0, amp, 0)?;
//! graph.connect(amp, 0, peak, 0)?;
//!
//! let s = graph.node_mut(sine).unwrap();
//! s.frequency(440.0);
//! s.amplitude(1.0);
//! graph.node_mut(amp).unwrap().gain(0.5);
//!
//! // In your audio ISR / device callback:
//! graph.tick();
//!
//! // Anywhere else:
//! if level.available() {
//!     let value = level.read();
//! }
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `std` | yes | `std` support in dependencies; without it the crate is `no_std` + `alloc` |
//! | `dsp` | yes | DSP math utilities, synthesis/effect/analysis nodes |
//! | `tracing` | yes | Debug/trace events for graph construction and dropped blocks |
//! | `serde` | no | `Serialize`/`Deserialize` for [`AudioConfig`](config::AudioConfig) |
//!
//! ## Audio parameters
//!
//! - **Block capacity:** 128 samples ([`constants::AUDIO_BLOCK_SAMPLES`])
//! - **Default sample rate:** 44 117.647 Hz ([`constants::AUDIO_SAMPLE_RATE_EXACT`])
//! - **Sample format:** `f32`
//! - **Default pool:** 32 blocks ([`constants::DEFAULT_POOL_BLOCKS`])

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod constants;
pub mod config;
pub mod error;
pub mod block;
pub mod node;
pub mod graph;
pub mod io;
pub mod delay_line;
pub mod probe;

#[cfg(feature = "dsp")]
pub mod dsp;

#[cfg(feature = "dsp")]
pub mod nodes;

/// Commonly used types in one import.
pub mod prelude {
    pub use crate::block::{AudioBlockMut, AudioBlockRef, BlockPool};
    pub use crate::config::AudioConfig;
    pub use crate::delay_line::DelayLine;
    pub use crate::error::ConfigError;
    pub use crate::graph::{AudioGraph, NodeHandle, NodeId};
    pub use crate::io::{AudioPlayQueue, AudioRecordQueue, PlayProducer, RecordConsumer};
    pub use crate::node::{AudioNode, Ports};
    pub use crate::probe::LevelProbe;

    #[cfg(feature = "dsp")]
    pub use crate::nodes::*;
}
