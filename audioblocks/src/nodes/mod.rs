//! Built-in audio processing nodes.
//!
//! Each implements the [`AudioNode`](crate::node::AudioNode) trait and
//! follows its ownership rules; they double as reference implementations
//! for custom nodes.
//!
//! | Node | Inputs | Outputs | Description |
//! |------|--------|---------|-------------|
//! | [`AudioSynthWaveformDc`] | 0 | 1 | Constant level with linear ramps |
//! | [`AudioSynthSine`] | 0 | 1 | Sine oscillator |
//! | [`AudioEffectKeyer`] | 0 | 1 | Morse keying gate |
//! | [`AudioAmplifier`] | 1 | 1 | Gain |
//! | [`AudioMixer`] | N | 1 | Weighted sum |
//! | [`AudioMultiply`] | 2 | 1 | Sample-by-sample product |
//! | [`AudioSwitch`] | 1 | N | Route to one output |
//! | [`AudioEffectDelay`] | 1 | 1 | Whole-sample delay |
//! | [`AudioAnalyzePeak`] | 1 | 0 | Peak level probe |
//! | [`AudioAnalyzeRms`] | 1 | 0 | RMS level probe |
//! | [`AudioAnalyzeSteps`] | 1 | 2 | Stepped measurement controller |

mod amplifier;
mod analyze_peak;
mod analyze_rms;
mod analyze_steps;
mod effect_delay;
mod effect_keyer;
mod mixer;
mod multiply;
mod switch;
mod synth_dc;
mod synth_sine;

pub use amplifier::AudioAmplifier;
pub use analyze_peak::AudioAnalyzePeak;
pub use analyze_rms::AudioAnalyzeRms;
pub use analyze_steps::{AudioAnalyzeSteps, MeasureState};
pub use effect_delay::AudioEffectDelay;
pub use effect_keyer::{AudioEffectKeyer, KeyElement, KeyerState};
pub use mixer::AudioMixer;
pub use multiply::AudioMultiply;
pub use switch::AudioSwitch;
pub use synth_dc::AudioSynthWaveformDc;
pub use synth_sine::AudioSynthSine;
