//! Microphone capture and utterance endpointing via `cpal`.
//!
//! [`Microphone::listen`] implements the calibrate-then-capture contract of
//! the speech loop: estimate the ambient noise floor, wait for a chunk loud
//! enough to be speech, then accumulate until a run of trailing silence (or
//! the hard length cap) ends the utterance.  The running flag is polled at
//! chunk granularity, so a stop request never waits for a full utterance.
//!
//! [`UtteranceSource`] abstracts the device away so the listener loop can
//! be tested with scripted utterances.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use super::pcm;
use crate::config::SpeechConfig;

/// Sample rate delivered to the recognizer.
pub const TARGET_RATE: u32 = 16_000;

// ---------------------------------------------------------------------------
// MicError
// ---------------------------------------------------------------------------

/// Errors that can occur while setting up or running microphone capture.
#[derive(Debug, Error)]
pub enum MicError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("audio stream stopped unexpectedly")]
    StreamClosed,
}

// ---------------------------------------------------------------------------
// ListenParams
// ---------------------------------------------------------------------------

/// Endpointing parameters for one `listen` call.
#[derive(Debug, Clone)]
pub struct ListenParams {
    /// Milliseconds of audio used to estimate the ambient noise floor.
    pub calibrate_ms: u64,
    /// Trailing silence that ends an utterance, in milliseconds.
    pub silence_ms: u64,
    /// Hard cap on utterance length, in seconds.
    pub max_utterance_secs: f32,
    /// Absolute lower bound on the speech RMS threshold.
    pub threshold_floor: f32,
    /// Multiplier applied to the ambient RMS to obtain the speech threshold.
    pub threshold_factor: f32,
}

impl From<&SpeechConfig> for ListenParams {
    fn from(cfg: &SpeechConfig) -> Self {
        Self {
            calibrate_ms: cfg.calibrate_ms,
            silence_ms: cfg.silence_ms,
            max_utterance_secs: cfg.max_utterance_secs,
            threshold_floor: cfg.threshold_floor,
            threshold_factor: cfg.threshold_factor,
        }
    }
}

impl Default for ListenParams {
    fn default() -> Self {
        Self::from(&SpeechConfig::default())
    }
}

// ---------------------------------------------------------------------------
// UtteranceSource trait
// ---------------------------------------------------------------------------

/// Blocking source of complete utterances at [`TARGET_RATE`] mono.
///
/// `Ok(None)` means capture was interrupted by the running flag going
/// false; the loop exits without an event.
pub trait UtteranceSource: Send {
    fn next_utterance(&mut self, running: &AtomicBool) -> Result<Option<Vec<f32>>, MicError>;
}

// ---------------------------------------------------------------------------
// Microphone
// ---------------------------------------------------------------------------

/// Default-input-device microphone with energy-based endpointing.
pub struct Microphone {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_rate: u32,
    channels: u16,
    params: ListenParams,
}

impl Microphone {
    /// Interval at which the running flag and chunk channel are polled.
    const POLL: Duration = Duration::from_millis(100);

    /// Open the system default input device.
    pub fn new(params: ListenParams) -> Result<Self, MicError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(MicError::NoDevice)?;
        let supported = device.default_input_config()?;

        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        Ok(Self {
            device,
            config,
            sample_rate,
            channels,
            params,
        })
    }

    /// Native sample rate reported by the device (Hz).
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn start_stream(
        &self,
        tx: mpsc::Sender<Vec<f32>>,
    ) -> Result<cpal::Stream, MicError> {
        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                // Ignore send errors; the receiver may have been dropped.
                let _ = tx.send(data.to_vec());
            },
            |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
            },
            None,
        )?;
        stream.play()?;
        Ok(stream)
    }

    /// Receive the next mono chunk, honoring the running flag.
    ///
    /// `Ok(None)` = stop requested; `Err(StreamClosed)` = device went away.
    fn next_chunk(
        &self,
        rx: &mpsc::Receiver<Vec<f32>>,
        running: &AtomicBool,
    ) -> Result<Option<Vec<f32>>, MicError> {
        loop {
            if !running.load(Ordering::SeqCst) {
                return Ok(None);
            }
            match rx.recv_timeout(Self::POLL) {
                Ok(chunk) => return Ok(Some(pcm::downmix(&chunk, self.channels))),
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => return Err(MicError::StreamClosed),
            }
        }
    }

    fn ms_of(&self, samples: usize) -> u64 {
        (samples as u64 * 1000) / u64::from(self.sample_rate)
    }
}

impl UtteranceSource for Microphone {
    /// Capture one utterance: calibrate, wait for onset, collect until
    /// trailing silence or the length cap, return 16 kHz mono samples.
    fn next_utterance(&mut self, running: &AtomicBool) -> Result<Option<Vec<f32>>, MicError> {
        let (tx, rx) = mpsc::channel::<Vec<f32>>();
        let _stream = self.start_stream(tx)?;

        // ── 1. Ambient noise calibration ─────────────────────────────────
        let mut calibration: Vec<f32> = Vec::new();
        while self.ms_of(calibration.len()) < self.params.calibrate_ms {
            match self.next_chunk(&rx, running)? {
                Some(chunk) => calibration.extend(chunk),
                None => return Ok(None),
            }
        }
        let ambient = pcm::rms(&calibration);
        let threshold = (ambient * self.params.threshold_factor).max(self.params.threshold_floor);
        log::debug!("mic: ambient rms {ambient:.4}, speech threshold {threshold:.4}");

        // ── 2. Wait for speech onset ─────────────────────────────────────
        let mut utterance: Vec<f32> = loop {
            match self.next_chunk(&rx, running)? {
                Some(chunk) => {
                    if pcm::rms(&chunk) > threshold {
                        break chunk;
                    }
                }
                None => return Ok(None),
            }
        };

        // ── 3. Collect until trailing silence or the hard cap ────────────
        let max_samples =
            (self.params.max_utterance_secs * self.sample_rate as f32) as usize;
        let mut silent_ms: u64 = 0;

        while silent_ms < self.params.silence_ms && utterance.len() < max_samples {
            match self.next_chunk(&rx, running)? {
                Some(chunk) => {
                    if pcm::rms(&chunk) > threshold {
                        silent_ms = 0;
                    } else {
                        silent_ms += self.ms_of(chunk.len());
                    }
                    utterance.extend(chunk);
                }
                None => break, // stop requested: ship what we have
            }
        }

        log::debug!(
            "mic: captured utterance of {:.2} s",
            utterance.len() as f32 / self.sample_rate as f32
        );
        Ok(Some(pcm::resample(&utterance, self.sample_rate, TARGET_RATE)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
