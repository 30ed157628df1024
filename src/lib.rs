//! Sign Bridge — desktop translator between hand gestures, speech and text.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   frames   ┌───────────┐  box  ┌────────────┐  canvas  ┌────────────┐
//! │ FrameSource│ ─────────▶ │HandLocal- │ ────▶ │ Normalizer │ ───────▶ │ Gesture    │
//! │ (vision)   │            │izer       │       │ (vision)   │          │ Classifier │
//! └────────────┘            └───────────┘       └────────────┘          └─────┬──────┘
//!                                                                             │
//!                        GestureLoop: threshold + debounce + speak            ▼
//!                                                                   AppEvent channel
//!                                                                             ▲
//! ┌────────────┐ utterance ┌───────────────┐   phrase events                  │
//! │ Microphone │ ────────▶ │ SpeechRecog-  │ ─────────────────────────────────┘
//! │ (speech)   │           │ nizer (HTTP)  │
//! └────────────┘           └───────────────┘
//!
//! UI shell (app) ──tokens──▶ ClipSequencer ──clips──▶ ClipPlayer (playback)
//! ```
//!
//! Two worker loops ([`gesture::GestureLoop`], [`speech::SpeechListener`])
//! run on their own threads and report back to the UI exclusively through a
//! `tokio::sync::mpsc` event channel.  The clip sequencer runs as a tokio
//! task and serialises playback requests so clips never overlap.

pub mod app;
pub mod classify;
pub mod config;
pub mod gesture;
pub mod playback;
pub mod speech;
pub mod vision;
