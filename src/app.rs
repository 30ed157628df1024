//! The egui shell — thin by design.
//!
//! [`SignBridgeApp`] owns the three mode toggles, the transcript, and the
//! live text field.  It never blocks: loop results arrive over an
//! [`AppEvent`] channel drained each frame with `try_recv`, and playback
//! requests leave over the sequencer command channel with `try_send`.
//!
//! The worker loops themselves are started and stopped from the toggle
//! handlers; `stop` joins the worker, blocking the UI thread for at most
//! the tail of the current iteration.

use eframe::egui;
use tokio::sync::{mpsc, watch};

use crate::config::AppConfig;
use crate::gesture::GestureLoop;
use crate::playback::{added_tokens, SequencerCommand};
use crate::speech::SpeechListener;

// ---------------------------------------------------------------------------
// AppEvent
// ---------------------------------------------------------------------------

/// Events delivered from the worker loops to the UI thread.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The gesture loop recognized a new label.
    GestureRecognized { label: String },
    /// The speech loop recognized a phrase.
    SpeechRecognized { text: String },
}

// ---------------------------------------------------------------------------
// SignBridgeApp
// ---------------------------------------------------------------------------

/// eframe application — the Sign Bridge window.
pub struct SignBridgeApp {
    // ── Worker loops ─────────────────────────────────────────────────────
    gesture: GestureLoop,
    speech: SpeechListener,

    // ── Channels ─────────────────────────────────────────────────────────
    events_rx: mpsc::Receiver<AppEvent>,
    sequencer_tx: mpsc::Sender<SequencerCommand>,
    cancel_tx: watch::Sender<u64>,

    // ── Mode toggles ─────────────────────────────────────────────────────
    sign_to_text: bool,
    audio_to_sign: bool,
    text_to_sign: bool,

    // ── Text state ───────────────────────────────────────────────────────
    transcript: String,
    input_text: String,
    previous_text: String,

    #[allow(dead_code)]
    config: AppConfig,
}

impl SignBridgeApp {
    /// Create the app.  The worker loops are constructed in `main` and
    /// handed over idle; toggles start them.
    pub fn new(
        gesture: GestureLoop,
        speech: SpeechListener,
        events_rx: mpsc::Receiver<AppEvent>,
        sequencer_tx: mpsc::Sender<SequencerCommand>,
        cancel_tx: watch::Sender<u64>,
        config: AppConfig,
    ) -> Self {
        Self {
            gesture,
            speech,
            events_rx,
            sequencer_tx,
            cancel_tx,
            sign_to_text: false,
            audio_to_sign: false,
            text_to_sign: false,
            transcript: String::new(),
            input_text: String::new(),
            previous_text: String::new(),
            config,
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    /// Drain all pending loop events (non-blocking).
    fn poll_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                AppEvent::GestureRecognized { label } => {
                    append_transcript(&mut self.transcript, &label);
                }
                AppEvent::SpeechRecognized { text } => {
                    self.request_playback(SequencerCommand::PlayPhrase(text));
                }
            }
        }
    }

    fn request_playback(&self, command: SequencerCommand) {
        if self.sequencer_tx.try_send(command).is_err() {
            log::warn!("sequencer busy or gone, playback request dropped");
        }
    }

    /// Abort the in-flight clip sequence, if any.
    fn cancel_playback(&self) {
        self.cancel_tx.send_modify(|generation| *generation += 1);
    }

    // ── Toggle handlers ──────────────────────────────────────────────────

    fn apply_sign_to_text(&mut self) {
        if self.sign_to_text {
            self.gesture.start();
        } else {
            self.gesture.stop();
        }
    }

    fn apply_audio_to_sign(&mut self) {
        if self.audio_to_sign {
            self.speech.start_recording();
        } else {
            self.speech.stop_recording();
            self.cancel_playback();
        }
    }

    fn apply_text_to_sign(&mut self) {
        if self.text_to_sign {
            self.input_text.clear();
            self.previous_text.clear();
        } else {
            self.cancel_playback();
        }
    }

    /// Play the words newly present in the text field.
    fn commit_typed_text(&mut self) {
        let added = added_tokens(&self.previous_text, &self.input_text);
        self.previous_text = self.input_text.clone();
        if !added.is_empty() {
            self.request_playback(SequencerCommand::PlayTokens(added));
        }
    }
}

/// Append a recognized label to the transcript, space-separated.
fn append_transcript(transcript: &mut String, label: &str) {
    if !transcript.is_empty() {
        transcript.push(' ');
    }
    transcript.push_str(label);
}

// ---------------------------------------------------------------------------
// eframe::App
// ---------------------------------------------------------------------------

impl eframe::App for SignBridgeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Sign Bridge");
            ui.add_space(8.0);

            if ui
                .toggle_value(&mut self.sign_to_text, "Sign to Text")
                .changed()
            {
                self.apply_sign_to_text();
            }
            if ui
                .toggle_value(&mut self.audio_to_sign, "Audio to Sign")
                .changed()
            {
                self.apply_audio_to_sign();
            }
            if ui
                .toggle_value(&mut self.text_to_sign, "Text to Sign")
                .changed()
            {
                self.apply_text_to_sign();
            }

            if self.sign_to_text {
                ui.separator();
                ui.label("Transcript");
                egui::ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut self.transcript.as_str())
                            .desired_width(f32::INFINITY),
                    );
                });
            }

            if self.text_to_sign {
                ui.separator();
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.input_text)
                        .hint_text("Type words to sign…"),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    self.commit_typed_text();
                }
            }
        });

        // Keep draining the event channel even while idle.
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{MockClassifier, Prediction};
    use crate::config::RecognitionConfig;
    use crate::speech::listener::SourceFactory;
    use crate::speech::{MicError, NullSynthesizer};
    use crate::vision::{NullFrameSource, SkinLocalizer};
    use std::sync::{Arc, Mutex};

    fn make_app(
        events_rx: mpsc::Receiver<AppEvent>,
        sequencer_tx: mpsc::Sender<SequencerCommand>,
    ) -> (SignBridgeApp, tokio::runtime::Runtime) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (loop_tx, _loop_rx) = mpsc::channel(8);

        let gesture = GestureLoop::new(
            Arc::new(Mutex::new(NullFrameSource)),
            Arc::new(SkinLocalizer::default()),
            Arc::new(MockClassifier::always(Prediction::new(0, "Yes", 0.99))),
            Arc::new(NullSynthesizer),
            loop_tx.clone(),
            &RecognitionConfig::default(),
        );

        let factory: SourceFactory = Arc::new(|| Err(MicError::NoDevice));
        let speech = SpeechListener::new(
            factory,
            Arc::new(crate::speech::MockRecognizer::once("unused")),
            loop_tx,
            rt.handle().clone(),
        );

        let (cancel_tx, _cancel_rx) = watch::channel(0u64);
        let app = SignBridgeApp::new(
            gesture,
            speech,
            events_rx,
            sequencer_tx,
            cancel_tx,
            AppConfig::default(),
        );
        (app, rt)
    }

    #[test]
    fn append_transcript_space_separates() {
        let mut transcript = String::new();
        append_transcript(&mut transcript, "Yes");
        append_transcript(&mut transcript, "Hello");
        assert_eq!(transcript, "Yes Hello");
    }

    #[test]
    fn gesture_events_land_in_the_transcript() {
        let (events_tx, events_rx) = mpsc::channel(8);
        let (seq_tx, _seq_rx) = mpsc::channel(8);
        let (mut app, _rt) = make_app(events_rx, seq_tx);

        events_tx
            .try_send(AppEvent::GestureRecognized { label: "Yes".into() })
            .unwrap();
        events_tx
            .try_send(AppEvent::GestureRecognized { label: "No".into() })
            .unwrap();
        app.poll_events();

        assert_eq!(app.transcript, "Yes No");
    }

    #[test]
    fn speech_events_become_playback_requests() {
        let (events_tx, events_rx) = mpsc::channel(8);
        let (seq_tx, mut seq_rx) = mpsc::channel(8);
        let (mut app, _rt) = make_app(events_rx, seq_tx);

        events_tx
            .try_send(AppEvent::SpeechRecognized { text: "see you".into() })
            .unwrap();
        app.poll_events();

        let command = seq_rx.try_recv().expect("playback request");
        assert!(matches!(
            command,
            SequencerCommand::PlayPhrase(ref phrase) if phrase == "see you"
        ));
    }

    #[test]
    fn typed_text_plays_only_added_words() {
        let (_events_tx, events_rx) = mpsc::channel(8);
        let (seq_tx, mut seq_rx) = mpsc::channel(8);
        let (mut app, _rt) = make_app(events_rx, seq_tx);

        app.input_text = "see you".into();
        app.commit_typed_text();
        assert!(matches!(
            seq_rx.try_recv().unwrap(),
            SequencerCommand::PlayTokens(ref tokens) if *tokens == ["see", "you"]
        ));

        // Appending one word only plays that word.
        app.input_text = "see you tomorrow".into();
        app.commit_typed_text();
        assert!(matches!(
            seq_rx.try_recv().unwrap(),
            SequencerCommand::PlayTokens(ref tokens) if *tokens == ["tomorrow"]
        ));

        // No change, no request.
        app.commit_typed_text();
        assert!(seq_rx.try_recv().is_err());
    }

    #[test]
    fn cancel_bumps_the_generation() {
        let (_events_tx, events_rx) = mpsc::channel(8);
        let (seq_tx, _seq_rx) = mpsc::channel(8);
        let (app, _rt) = make_app(events_rx, seq_tx);

        let cancel_rx = app.cancel_tx.subscribe();
        app.cancel_playback();
        assert_eq!(*cancel_rx.borrow(), 1);
    }
}
