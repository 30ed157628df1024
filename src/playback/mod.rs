//! Clip playback: catalog lookup, tokenizing, and sequencing.
//!
//! # Pipeline
//!
//! ```text
//! phrase / text diff ──▶ tokenize ──▶ plan_tokens ──▶ ClipSequencer
//!                                                       ├─ Clip  → ClipPlayer::play
//!                                                       └─ Dwell → cancellable sleep
//! ```

pub mod catalog;
pub mod player;
pub mod sequencer;
pub mod tokenize;

pub use catalog::ClipCatalog;
pub use player::{ClipPlayer, CommandPlayer, NullPlayer, PlaybackError};
pub use sequencer::{
    plan_tokens, run_sequencer, ClipSequencer, PlanStep, PlayOutcome, SequencerCommand,
};
pub use tokenize::{added_tokens, tokenize};

#[cfg(test)]
pub use player::RecordingPlayer;
