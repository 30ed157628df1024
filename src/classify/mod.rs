//! Gesture classification.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              GestureClassifier (trait)              │
//! │                                                     │
//! │   labels.txt ──▶ ┌───────────────────┐              │
//! │   gesture-model ─▶│ LinearClassifier │              │
//! │                   └────────┬─────────┘              │
//! │                            ▼                        │
//! │              predict(canvas) → Prediction           │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The trait is the adapter boundary around the pretrained model: anything
//! that maps a normalized canvas to a label + confidence can stand behind
//! it.

pub mod engine;
pub mod labels;

pub use engine::{ClassifyError, GestureClassifier, LinearClassifier, Prediction};
pub use labels::{load_labels, GESTURE_LABELS};

// test-only re-export so loop tests can import the mock without the full
// module path.
#[cfg(test)]
pub use engine::MockClassifier;
