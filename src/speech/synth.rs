//! Text-to-speech adapter.
//!
//! [`SpeechSynthesizer::speak`] is one-shot and blocking: it returns when
//! the utterance has finished.  The gesture loop relies on this to pace
//! itself between recognitions.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

// ---------------------------------------------------------------------------
// SynthError
// ---------------------------------------------------------------------------

/// Errors from the speech synthesis adapter.
#[derive(Debug, Error)]
pub enum SynthError {
    #[error("failed to launch {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("{program} exited with {status}")]
    Failed { program: String, status: String },
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer trait
// ---------------------------------------------------------------------------

/// Converts a recognized label to audible speech, blocking until done.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str) -> Result<(), SynthError>;
}

// ---------------------------------------------------------------------------
// CommandSynthesizer
// ---------------------------------------------------------------------------

/// Shells out to a system TTS program and waits for it to exit.
pub struct CommandSynthesizer {
    program: PathBuf,
}

impl CommandSynthesizer {
    /// TTS programs tried in order by [`discover`](Self::discover).
    const CANDIDATES: [&'static str; 4] = ["espeak-ng", "espeak", "say", "spd-say"];

    /// Find the first available TTS program on `PATH`.
    pub fn discover() -> Option<Self> {
        Self::CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(|program| {
                log::info!("speech synthesis via {}", program.display());
                Self { program }
            })
    }

    /// Use an explicit program instead of discovery.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn speak(&self, text: &str) -> Result<(), SynthError> {
        let status = Command::new(&self.program)
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| SynthError::Spawn {
                program: self.program.display().to_string(),
                reason: e.to_string(),
            })?;

        if !status.success() {
            return Err(SynthError::Failed {
                program: self.program.display().to_string(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// NullSynthesizer
// ---------------------------------------------------------------------------

/// No-op synthesizer installed when no TTS program is available.
pub struct NullSynthesizer;

impl SpeechSynthesizer for NullSynthesizer {
    fn speak(&self, text: &str) -> Result<(), SynthError> {
        log::debug!("speech synthesis unavailable, dropping {text:?}");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingSynthesizer  (test-only)
// ---------------------------------------------------------------------------

/// Test double that records everything it is asked to speak.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSynthesizer {
    spoken: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingSynthesizer {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl SpeechSynthesizer for RecordingSynthesizer {
    fn speak(&self, text: &str) -> Result<(), SynthError> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
