//! Gesture recognition loop.
//!
//! [`RecognitionState`] applies the confidence threshold and the
//! changed-from-last debounce; [`GestureLoop`] drives the full
//! capture → localize → normalize → classify → emit cycle on a worker
//! thread.

pub mod runner;
pub mod state;

pub use runner::GestureLoop;
pub use state::RecognitionState;
