//! Application entry point — Sign Bridge.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Resolve [`AppPaths`] and create the tokio runtime.
//! 4. Build the gesture-side adapters (frame source, localizer, classifier,
//!    synthesizer) — each degrades gracefully when its backing resource is
//!    missing.
//! 5. Build the speech-side adapters (microphone factory, recognizer).
//! 6. Spawn the clip sequencer task on the tokio runtime.
//! 7. Run [`eframe::run_native`] — blocks the main thread until the window
//!    is closed.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use sign_bridge::{
    app::{AppEvent, SignBridgeApp},
    classify::{ClassifyError, GestureClassifier, LinearClassifier, Prediction},
    config::{AppConfig, AppPaths},
    gesture::GestureLoop,
    playback::{
        run_sequencer, ClipCatalog, ClipPlayer, ClipSequencer, CommandPlayer, NullPlayer,
        SequencerCommand,
    },
    speech::{
        listener::SourceFactory, CommandSynthesizer, ListenParams, Microphone, NullSynthesizer,
        SpeechListener, SpeechRecognizer, SpeechSynthesizer, UtteranceSource,
        WebSpeechRecognizer,
    },
    vision::{FrameDirSource, FrameSource, NullFrameSource, SkinLocalizer},
};

use eframe::egui;

// ---------------------------------------------------------------------------
// Adapter construction
// ---------------------------------------------------------------------------

/// Pick the frame source: camera when compiled in, else the configured
/// frame directory, else an inert source.
fn build_frame_source(config: &AppConfig) -> Arc<Mutex<dyn FrameSource>> {
    #[cfg(feature = "camera")]
    {
        match sign_bridge::vision::CameraSource::new(0) {
            Ok(camera) => {
                log::info!("frame source: camera 0");
                return Arc::new(Mutex::new(camera));
            }
            Err(e) => log::warn!("camera unavailable ({e}), falling back"),
        }
    }

    if let Some(dir) = &config.recognition.frame_dir {
        match FrameDirSource::new(dir) {
            Ok(source) => {
                log::info!("frame source: {} ({} frames)", dir.display(), source.len());
                return Arc::new(Mutex::new(source));
            }
            Err(e) => log::warn!("frame directory {} unusable: {e}", dir.display()),
        }
    }

    log::warn!("no capture backend configured; gesture recognition will be inactive");
    Arc::new(Mutex::new(NullFrameSource))
}

/// Load the classifier, degrading to a stub that errors on every call so
/// the app still launches without model files present.
fn build_classifier(paths: &AppPaths) -> Arc<dyn GestureClassifier> {
    match LinearClassifier::load(&paths.model_file, &paths.labels_file) {
        Ok(classifier) => {
            log::info!(
                "classifier loaded: {} ({} labels)",
                paths.model_file.display(),
                classifier.labels().len()
            );
            Arc::new(classifier)
        }
        Err(e) => {
            log::warn!("could not load classifier ({e}); recognition will never fire");
            Arc::new(NoModelClassifier {
                path: paths.model_file.display().to_string(),
            })
        }
    }
}

fn build_synthesizer(config: &AppConfig) -> Arc<dyn SpeechSynthesizer> {
    if let Some(program) = &config.speech.synth_program {
        return Arc::new(CommandSynthesizer::with_program(program));
    }
    match CommandSynthesizer::discover() {
        Some(synth) => Arc::new(synth),
        None => {
            log::warn!("no TTS program found; recognized labels will not be spoken");
            Arc::new(NullSynthesizer)
        }
    }
}

fn build_player(config: &AppConfig) -> Arc<dyn ClipPlayer> {
    if let Some(program) = &config.playback.player_program {
        return Arc::new(CommandPlayer::with_program(program));
    }
    match CommandPlayer::discover() {
        Ok(player) => Arc::new(player),
        Err(e) => {
            log::warn!("{e}; clips will not be shown");
            Arc::new(NullPlayer)
        }
    }
}

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let mut vp = egui::ViewportBuilder::default()
        .with_inner_size([420.0, 360.0])
        .with_min_inner_size([320.0, 240.0]);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    if let Some((x, y)) = config.ui.window_position {
        vp = vp.with_position(egui::pos2(x, y));
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Sign Bridge starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    let paths = AppPaths::new();

    // 3. Tokio runtime (sequencer task + recognition HTTP client)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Event channel: worker loops → UI
    let (events_tx, events_rx) = mpsc::channel::<AppEvent>(64);

    // 5. Gesture side
    let gesture = GestureLoop::new(
        build_frame_source(&config),
        Arc::new(SkinLocalizer::new(config.recognition.min_hand_pixels)),
        build_classifier(&paths),
        build_synthesizer(&config),
        events_tx.clone(),
        &config.recognition,
    );

    // 6. Speech side — the microphone is opened per listening session, on
    //    the listener's own thread.
    let recognizer: Arc<dyn SpeechRecognizer> =
        Arc::new(WebSpeechRecognizer::from_config(&config.speech));
    let listen_params = ListenParams::from(&config.speech);
    let mic_factory: SourceFactory = Arc::new(move || {
        Microphone::new(listen_params.clone()).map(|m| Box::new(m) as Box<dyn UtteranceSource>)
    });
    let speech = SpeechListener::new(mic_factory, recognizer, events_tx, rt.handle().clone());

    // 7. Playback: catalog + sequencer task
    let catalog = Arc::new(ClipCatalog::new(&paths.media_dir));
    let sequencer = ClipSequencer::new(
        catalog,
        build_player(&config),
        Duration::from_secs_f32(config.playback.dwell_secs),
    );
    let (sequencer_tx, sequencer_rx) = mpsc::channel::<SequencerCommand>(32);
    let (cancel_tx, cancel_rx) = watch::channel(0u64);
    rt.spawn(run_sequencer(sequencer, sequencer_rx, cancel_rx));

    // 8. Run the UI (blocks until the window is closed)
    let app = SignBridgeApp::new(gesture, speech, events_rx, sequencer_tx, cancel_tx, config.clone());

    eframe::run_native(
        "Sign Bridge",
        native_options(&config),
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}

// ---------------------------------------------------------------------------
// NoModelClassifier — fallback when the model file is not present
// ---------------------------------------------------------------------------

struct NoModelClassifier {
    path: String,
}

impl GestureClassifier for NoModelClassifier {
    fn predict(&self, _image: &image::RgbImage) -> Result<Prediction, ClassifyError> {
        Err(ClassifyError::ModelNotFound(self.path.clone()))
    }
}
