//! Gesture loop — Idle → Recording → Idle.
//!
//! # Iteration
//!
//! ```text
//! FrameSource.next_frame      (miss/error → skip)
//!   └─▶ HandLocalizer.locate  (no hand   → skip)
//!         └─▶ normalize_hand  (degenerate → skip)
//!               └─▶ GestureClassifier.predict
//!                     └─▶ RecognitionState.observe
//!                           ├─ None        → nothing
//!                           └─ Some(label) → AppEvent::GestureRecognized
//!                                            + blocking speak(label)
//! ```
//!
//! The blocking synthesis call after an emission deliberately paces the
//! loop — no new recognition is attempted until the label has been spoken.
//! All per-iteration failures are logged and skipped; only construction can
//! permanently disable a stage.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::app::AppEvent;
use crate::classify::GestureClassifier;
use crate::config::RecognitionConfig;
use crate::speech::SpeechSynthesizer;
use crate::vision::{normalize_hand, FrameSource, HandLocalizer};

use super::state::RecognitionState;

// ---------------------------------------------------------------------------
// GestureLoop
// ---------------------------------------------------------------------------

/// The gesture recognition loop state machine.
///
/// Exactly one worker runs per recording session: [`start`](Self::start)
/// while already recording is a no-op, and [`stop`](Self::stop) joins the
/// worker before returning, so a stop/start pair can never interleave two
/// workers.
pub struct GestureLoop {
    running: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
    source: Arc<Mutex<dyn FrameSource>>,
    localizer: Arc<dyn HandLocalizer>,
    classifier: Arc<dyn GestureClassifier>,
    synth: Arc<dyn SpeechSynthesizer>,
    state: Arc<Mutex<RecognitionState>>,
    events: mpsc::Sender<AppEvent>,
    crop_margin: u32,
    canvas_size: u32,
    tick: Duration,
}

impl GestureLoop {
    /// Create a loop; no thread runs until [`start`](Self::start).
    pub fn new(
        source: Arc<Mutex<dyn FrameSource>>,
        localizer: Arc<dyn HandLocalizer>,
        classifier: Arc<dyn GestureClassifier>,
        synth: Arc<dyn SpeechSynthesizer>,
        events: mpsc::Sender<AppEvent>,
        config: &RecognitionConfig,
    ) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
            source,
            localizer,
            classifier,
            synth,
            state: Arc::new(Mutex::new(RecognitionState::new(
                config.confidence_threshold,
            ))),
            events,
            crop_margin: config.crop_margin,
            canvas_size: config.canvas_size,
            tick: Duration::from_millis(config.tick_ms),
        }
    }

    /// `true` while a recording session is active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Label most recently emitted by any session.
    pub fn last_label(&self) -> Option<String> {
        self.state.lock().unwrap().last_label().map(str::to_string)
    }

    /// Idle → Recording.  Returns `false` (no observable effect) when a
    /// session is already active.
    pub fn start(&mut self) -> bool {
        if self.running.swap(true, Ordering::SeqCst) {
            log::debug!("gesture: already recording, start ignored");
            return false;
        }

        let running = Arc::clone(&self.running);
        let source = Arc::clone(&self.source);
        let localizer = Arc::clone(&self.localizer);
        let classifier = Arc::clone(&self.classifier);
        let synth = Arc::clone(&self.synth);
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let margin = self.crop_margin;
        let size = self.canvas_size;
        let tick = self.tick;

        self.handle = Some(
            std::thread::Builder::new()
                .name("gesture-loop".into())
                .spawn(move || {
                    log::info!("gesture loop started");
                    while running.load(Ordering::SeqCst) {
                        iterate(
                            &source, &localizer, &classifier, &synth, &state, &events, margin,
                            size,
                        );
                        std::thread::sleep(tick);
                    }
                    log::info!("gesture loop stopped");
                })
                .expect("failed to spawn gesture-loop thread"),
        );
        true
    }

    /// Recording → Idle.  Blocks until the worker has exited; once this
    /// returns, no further events are emitted.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for GestureLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// One iteration
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn iterate(
    source: &Mutex<dyn FrameSource>,
    localizer: &Arc<dyn HandLocalizer>,
    classifier: &Arc<dyn GestureClassifier>,
    synth: &Arc<dyn SpeechSynthesizer>,
    state: &Mutex<RecognitionState>,
    events: &mpsc::Sender<AppEvent>,
    margin: u32,
    size: u32,
) {
    let frame = match source.lock().unwrap().next_frame() {
        Ok(Some(frame)) => frame,
        Ok(None) => return,
        Err(e) => {
            log::debug!("gesture: frame capture failed: {e}");
            return;
        }
    };

    let Some(hand) = localizer.locate(&frame) else {
        return;
    };

    let Some(canvas) = normalize_hand(&frame, hand, margin, size) else {
        log::debug!("gesture: hand region degenerate after clamping, frame skipped");
        return;
    };

    let prediction = match classifier.predict(&canvas) {
        Ok(prediction) => prediction,
        Err(e) => {
            log::warn!("gesture: classification failed: {e}");
            return;
        }
    };

    let emitted = state.lock().unwrap().observe(&prediction);
    if let Some(label) = emitted {
        log::info!(
            "gesture recognized: {label} ({:.1}%)",
            prediction.confidence * 100.0
        );

        if events
            .blocking_send(AppEvent::GestureRecognized {
                label: label.clone(),
            })
            .is_err()
        {
            log::warn!("gesture: event channel closed, dropping event");
        }

        // Blocking on purpose: the loop stays quiet while the label is
        // being spoken.
        if let Err(e) = synth.speak(&label) {
            log::warn!("gesture: speech synthesis failed: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
