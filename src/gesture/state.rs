//! Recognition state: threshold gate + changed-from-last debounce.
//!
//! A label is emitted only when its confidence clears the threshold AND it
//! differs from the previously emitted label.  This is *not* a time-window
//! debounce — alternating between two labels emits on every alternation,
//! while holding one gesture emits exactly once.

use crate::classify::Prediction;

/// Debouncing state of the gesture loop.
///
/// Persists across recording sessions, matching the loop's contract that a
/// stop/start cycle does not re-announce the gesture still being held.
///
/// ```
/// use sign_bridge::classify::Prediction;
/// use sign_bridge::gesture::RecognitionState;
///
/// let mut state = RecognitionState::new(0.90);
///
/// // Below threshold: never emits.
/// assert_eq!(state.observe(&Prediction::new(0, "Yes", 0.50)), None);
///
/// // First confident sighting emits; the repeat does not.
/// assert_eq!(state.observe(&Prediction::new(0, "Yes", 0.95)).as_deref(), Some("Yes"));
/// assert_eq!(state.observe(&Prediction::new(0, "Yes", 0.99)), None);
///
/// // A different label emits again.
/// assert_eq!(state.observe(&Prediction::new(3, "No", 0.93)).as_deref(), Some("No"));
/// ```
pub struct RecognitionState {
    threshold: f32,
    last_label: Option<String>,
}

impl RecognitionState {
    /// Create a state gate with the given confidence threshold.
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            last_label: None,
        }
    }

    /// Feed one prediction through the gate.
    ///
    /// Returns `Some(label)` exactly when the prediction should be emitted:
    /// confidence ≥ threshold and label ≠ last emitted label.
    pub fn observe(&mut self, prediction: &Prediction) -> Option<String> {
        if prediction.confidence < self.threshold {
            return None;
        }
        if self.last_label.as_deref() == Some(prediction.label.as_str()) {
            return None;
        }
        self.last_label = Some(prediction.label.clone());
        self.last_label.clone()
    }

    /// The most recently emitted label, if any.
    pub fn last_label(&self) -> Option<&str> {
        self.last_label.as_deref()
    }

    /// Forget the last label; the next confident prediction emits again.
    pub fn reset(&mut self) {
        self.last_label = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
