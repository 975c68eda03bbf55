//! Morse keying sequencer.
//!
//! Produces a 0.0/1.0 gate, one value per sample, that keys characters
//! queued with [`AudioEffectKeyer::send_char`]. Multiply it with an
//! oscillator (see [`AudioMultiply`](super::AudioMultiply)) for a keyed tone.
//!
//! Timing uses the PARIS convention: one unit is `1.2 / wpm` seconds.
//!
//! | Element | Key down | Key up after |
//! |---------|----------|--------------|
//! | dit | 1 unit | 1 unit |
//! | dah | 3 units | 1 unit |
//! | end of character | | 2 more units (3 total) |
//! | word gap | | 4 more units (7 total) |

use crate::io::spsc::SpscQueue;
use crate::node::{AudioNode, Ports};

/// Elements waiting to be keyed.
const ELEMENT_QUEUE_SLOTS: usize = 64;

/// One keying instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyElement {
    Dit,
    Dah,
    CharSpace,
    WordSpace,
}

/// Keyer phase, carrying the samples left in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyerState {
    #[default]
    Idle,
    Mark { remaining: usize },
    ElementSpace { remaining: usize },
    CharacterSpace { remaining: usize },
    WordSpace { remaining: usize },
}

impl KeyerState {
    /// State for the next sample.
    ///
    /// `unit` is the dit length in samples (at least 1). `next_element` is
    /// only called when the keyer is ready to start a new element, so a
    /// sequence of elements plays back to back with no idle samples between
    /// them.
    pub fn advance(self, unit: usize, next_element: impl FnOnce() -> Option<KeyElement>) -> Self {
        let unit = unit.max(1);
        match self {
            KeyerState::Mark { remaining } if remaining > 1 => KeyerState::Mark {
                remaining: remaining - 1,
            },
            KeyerState::Mark { .. } => KeyerState::ElementSpace { remaining: unit },
            KeyerState::ElementSpace { remaining } if remaining > 1 => KeyerState::ElementSpace {
                remaining: remaining - 1,
            },
            KeyerState::CharacterSpace { remaining } if remaining > 1 => {
                KeyerState::CharacterSpace {
                    remaining: remaining - 1,
                }
            }
            KeyerState::WordSpace { remaining } if remaining > 1 => KeyerState::WordSpace {
                remaining: remaining - 1,
            },
            KeyerState::Idle
            | KeyerState::ElementSpace { .. }
            | KeyerState::CharacterSpace { .. }
            | KeyerState::WordSpace { .. } => match next_element() {
                Some(KeyElement::Dit) => KeyerState::Mark { remaining: unit },
                Some(KeyElement::Dah) => KeyerState::Mark { remaining: 3 * unit },
                Some(KeyElement::CharSpace) => KeyerState::CharacterSpace { remaining: 2 * unit },
                Some(KeyElement::WordSpace) => KeyerState::WordSpace { remaining: 4 * unit },
                None => KeyerState::Idle,
            },
        }
    }

    /// Whether the key is down in this state.
    pub fn is_key_down(self) -> bool {
        matches!(self, KeyerState::Mark { .. })
    }
}

/// Morse pattern for `c` as dots and dashes, `None` if it has no code.
fn morse_pattern(c: char) -> Option<&'static str> {
    let pattern = match c.to_ascii_uppercase() {
        'A' => ".-",
        'B' => "-...",
        'C' => "-.-.",
        'D' => "-..",
        'E' => ".",
        'F' => "..-.",
        'G' => "--.",
        'H' => "....",
        'I' => "..",
        'J' => ".---",
        'K' => "-.-",
        'L' => ".-..",
        'M' => "--",
        'N' => "-.",
        'O' => "---",
        'P' => ".--.",
        'Q' => "--.-",
        'R' => ".-.",
        'S' => "...",
        'T' => "-",
        'U' => "..-",
        'V' => "...-",
        'W' => ".--",
        'X' => "-..-",
        'Y' => "-.--",
        'Z' => "--..",
        '0' => "-----",
        '1' => ".----",
        '2' => "..---",
        '3' => "...--",
        '4' => "....-",
        '5' => ".....",
        '6' => "-....",
        '7' => "--...",
        '8' => "---..",
        '9' => "----.",
        _ => return None,
    };
    Some(pattern)
}

/// Morse keyer. Source node: 0 inputs, 1 output.
///
/// # Example
/// ```ignore
/// let mut keyer = AudioEffectKeyer::new();
/// keyer.set_wpm(20.0);
/// keyer.send_str("CQ TEST");
/// ```
pub struct AudioEffectKeyer {
    state: KeyerState,
    wpm: f32,
    elements: SpscQueue<KeyElement, ELEMENT_QUEUE_SLOTS>,
}

impl AudioEffectKeyer {
    /// Create an idle keyer at 20 words per minute.
    pub const fn new() -> Self {
        AudioEffectKeyer {
            state: KeyerState::Idle,
            wpm: 20.0,
            elements: SpscQueue::new(),
        }
    }

    /// Set the keying speed in words per minute (minimum 1).
    pub fn set_wpm(&mut self, wpm: f32) {
        self.wpm = wpm.max(1.0);
    }

    /// Keying speed in words per minute.
    pub fn wpm(&self) -> f32 {
        self.wpm
    }

    /// Dit length in samples at `sample_rate_hz`.
    pub fn unit_samples(&self, sample_rate_hz: f32) -> usize {
        let samples = libm::roundf(1.2 / self.wpm * sample_rate_hz) as usize;
        samples.max(1)
    }

    /// Queue one character. A space queues a word gap.
    ///
    /// Returns `false`, queuing nothing, if `c` has no Morse code or the
    /// queue cannot take the whole character.
    pub fn send_char(&mut self, c: char) -> bool {
        if c == ' ' {
            return self.elements.push(KeyElement::WordSpace).is_ok();
        }
        let Some(pattern) = morse_pattern(c) else {
            return false;
        };
        // marks plus the trailing character space
        if self.elements.capacity() - self.elements.len() < pattern.len() + 1 {
            return false;
        }
        for symbol in pattern.bytes() {
            let element = if symbol == b'.' { KeyElement::Dit } else { KeyElement::Dah };
            // capacity checked above
            let _ = self.elements.push(element);
        }
        let _ = self.elements.push(KeyElement::CharSpace);
        true
    }

    /// Queue every character of `text`, stopping at the first rejected one.
    /// Returns the number of characters queued.
    pub fn send_str(&mut self, text: &str) -> usize {
        text.chars().take_while(|&c| self.send_char(c)).count()
    }

    /// Current keyer phase.
    pub fn state(&self) -> KeyerState {
        self.state
    }

    /// Whether nothing is playing or queued.
    pub fn is_idle(&self) -> bool {
        self.state == KeyerState::Idle && self.elements.is_empty()
    }

    /// Drop everything queued and release the key.
    pub fn abort(&mut self) {
        self.elements.clear();
        self.state = KeyerState::Idle;
    }
}

impl Default for AudioEffectKeyer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioNode for AudioEffectKeyer {
    const NUM_INPUTS: usize = 0;
    const NUM_OUTPUTS: usize = 1;

    fn update(&mut self, ports: &mut Ports<'_>) {
        let config = *ports.config();
        let unit = self.unit_samples(config.sample_rate_hz);
        let elements = &self.elements;

        let mut block = if ports.is_connected(0) { ports.allocate() } else { None };
        match block.as_mut() {
            Some(out) => {
                for sample in out.iter_mut() {
                    self.state = self.state.advance(unit, || elements.pop());
                    *sample = if self.state.is_key_down() { 1.0 } else { 0.0 };
                }
            }
            None => {
                for _ in 0..config.frame_len {
                    self.state = self.state.advance(unit, || elements.pop());
                }
            }
        }

        if let Some(out) = block {
            ports.transmit(0, out);
        }
    }
}
