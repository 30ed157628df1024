//! Speech capture loop — Idle → Listening → Idle.
//!
//! [`SpeechListener`] owns a worker thread that repeatedly captures one
//! utterance and submits it to the remote recognizer.  Results flow to the
//! UI as [`AppEvent::SpeechRecognized`]; failures are logged and swallowed
//! (no retry policy — the loop just listens again).
//!
//! `start_recording` is idempotent; `stop_recording` clears the running
//! flag and joins, and the capture side polls the flag at chunk
//! granularity, so the join returns promptly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::app::AppEvent;
use crate::speech::mic::{MicError, UtteranceSource, TARGET_RATE};
use crate::speech::recognizer::{RecognizeError, SpeechRecognizer};

/// Utterances shorter than this (0.1 s at 16 kHz) are discarded unsent.
const MIN_SAMPLES: usize = 1_600;

/// Builds a fresh [`UtteranceSource`] for each listening session.
///
/// The source is constructed on the worker thread because audio streams are
/// generally not `Send`.
pub type SourceFactory =
    Arc<dyn Fn() -> Result<Box<dyn UtteranceSource>, MicError> + Send + Sync>;

// ---------------------------------------------------------------------------
// SpeechListener
// ---------------------------------------------------------------------------

/// The speech capture loop state machine.
pub struct SpeechListener {
    listening: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
    source_factory: SourceFactory,
    recognizer: Arc<dyn SpeechRecognizer>,
    events: mpsc::Sender<AppEvent>,
    rt: tokio::runtime::Handle,
}

impl SpeechListener {
    /// Create a listener; no thread runs until [`start_recording`].
    ///
    /// [`start_recording`]: Self::start_recording
    pub fn new(
        source_factory: SourceFactory,
        recognizer: Arc<dyn SpeechRecognizer>,
        events: mpsc::Sender<AppEvent>,
        rt: tokio::runtime::Handle,
    ) -> Self {
        Self {
            listening: Arc::new(AtomicBool::new(false)),
            handle: None,
            source_factory,
            recognizer,
            events,
            rt,
        }
    }

    /// `true` while the capture loop is active.
    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    /// Idle → Listening.  Returns `false` (no observable effect) when a
    /// session is already active.
    pub fn start_recording(&mut self) -> bool {
        if self.listening.swap(true, Ordering::SeqCst) {
            log::debug!("speech: already listening, start ignored");
            return false;
        }

        let listening = Arc::clone(&self.listening);
        let factory = Arc::clone(&self.source_factory);
        let recognizer = Arc::clone(&self.recognizer);
        let events = self.events.clone();
        let rt = self.rt.clone();

        self.handle = Some(
            std::thread::Builder::new()
                .name("speech-listener".into())
                .spawn(move || {
                    run_loop(&listening, factory, recognizer, events, rt);
                    listening.store(false, Ordering::SeqCst);
                })
                .expect("failed to spawn speech-listener thread"),
        );
        true
    }

    /// Listening → Idle.  Blocks until the worker has exited; once this
    /// returns, no further events are emitted.
    pub fn stop_recording(&mut self) {
        self.listening.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SpeechListener {
    fn drop(&mut self) {
        self.stop_recording();
    }
}

// ---------------------------------------------------------------------------
// Worker loop
// ---------------------------------------------------------------------------

fn run_loop(
    listening: &AtomicBool,
    factory: SourceFactory,
    recognizer: Arc<dyn SpeechRecognizer>,
    events: mpsc::Sender<AppEvent>,
    rt: tokio::runtime::Handle,
) {
    let mut source = match factory() {
        Ok(source) => source,
        Err(e) => {
            log::error!("speech: microphone unavailable: {e}");
            return;
        }
    };

    log::info!("speech listener started");

    while listening.load(Ordering::SeqCst) {
        match source.next_utterance(listening) {
            Ok(Some(samples)) => {
                if samples.len() < MIN_SAMPLES {
                    log::debug!("speech: utterance too short ({} samples), ignored", samples.len());
                    continue;
                }

                match rt.block_on(recognizer.recognize(&samples, TARGET_RATE)) {
                    Ok(text) => {
                        log::info!("speech recognized: {text:?}");
                        if events
                            .blocking_send(AppEvent::SpeechRecognized { text })
                            .is_err()
                        {
                            log::warn!("speech: event channel closed, stopping");
                            return;
                        }
                    }
                    Err(RecognizeError::Unintelligible) => {
                        log::debug!("speech: could not understand audio");
                    }
                    Err(e) => {
                        log::warn!("speech: recognition failed: {e}");
                    }
                }
            }
            Ok(None) => {
                // Stop observed mid-capture; the while condition exits.
            }
            Err(e) => {
                log::warn!("speech: capture failed: {e}");
                std::thread::sleep(Duration::from_millis(500));
            }
        }
    }

    log::info!("speech listener stopped");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
