//! Speech: microphone capture, remote recognition, and synthesis.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → calibrate ambient RMS → utterance endpointing
//!           → downmix + resample to 16 kHz → SpeechRecognizer (HTTP)
//!           → AppEvent::SpeechRecognized
//! ```
//!
//! [`SpeechListener`] runs the loop on its own thread;
//! [`SpeechSynthesizer`] is the reverse direction (label → audible speech).

pub mod listener;
pub mod mic;
pub mod pcm;
pub mod recognizer;
pub mod synth;

pub use listener::SpeechListener;
pub use mic::{ListenParams, MicError, Microphone, UtteranceSource};
pub use recognizer::{RecognizeError, SpeechRecognizer, WebSpeechRecognizer};
pub use synth::{CommandSynthesizer, NullSynthesizer, SpeechSynthesizer, SynthError};

#[cfg(test)]
pub use recognizer::MockRecognizer;
#[cfg(test)]
pub use synth::RecordingSynthesizer;
