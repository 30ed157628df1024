//! Clip playback adapter.
//!
//! [`ClipPlayer::play`] is non-blocking: it starts the clip and returns
//! immediately; a new play replaces whatever was previously showing.  The
//! sequencer provides the timing between plays.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use thiserror::Error;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Errors from the clip playback adapter.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no media player found on PATH (tried {0})")]
    NoPlayer(String),

    #[error("failed to launch player for {clip}: {reason}")]
    Spawn { clip: String, reason: String },
}

// ---------------------------------------------------------------------------
// ClipPlayer trait
// ---------------------------------------------------------------------------

/// Starts playback of one clip, replacing the previous one.
pub trait ClipPlayer: Send + Sync {
    fn play(&self, clip: &Path) -> Result<(), PlaybackError>;
}

// ---------------------------------------------------------------------------
// CommandPlayer
// ---------------------------------------------------------------------------

/// Plays clips by spawning an external player process.
///
/// Each `play` kills the previous player instance first, so at most one
/// clip is ever showing — the behaviour of a single media surface.
pub struct CommandPlayer {
    program: PathBuf,
    current: Mutex<Option<Child>>,
}

impl CommandPlayer {
    /// Player programs tried in order by [`discover`](Self::discover).
    const CANDIDATES: [&'static str; 3] = ["mpv", "ffplay", "cvlc"];

    /// Find the first available player on `PATH`.
    pub fn discover() -> Result<Self, PlaybackError> {
        Self::CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(|program| {
                log::info!("clip playback via {}", program.display());
                Self::with_program(program)
            })
            .ok_or_else(|| PlaybackError::NoPlayer(Self::CANDIDATES.join(", ")))
    }

    /// Use an explicit program instead of discovery.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            current: Mutex::new(None),
        }
    }

    /// Quietness/exit flags appropriate for the chosen player.
    fn player_args(program: &Path) -> &'static [&'static str] {
        match program.file_stem().and_then(|s| s.to_str()) {
            Some("mpv") => &["--really-quiet"],
            Some("ffplay") => &["-autoexit", "-loglevel", "error"],
            Some("cvlc") => &["--play-and-exit"],
            _ => &[],
        }
    }

    fn kill_current(&self) {
        if let Some(mut child) = self.current.lock().unwrap().take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl ClipPlayer for CommandPlayer {
    fn play(&self, clip: &Path) -> Result<(), PlaybackError> {
        self.kill_current();

        let child = Command::new(&self.program)
            .args(Self::player_args(&self.program))
            .arg(clip)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PlaybackError::Spawn {
                clip: clip.display().to_string(),
                reason: e.to_string(),
            })?;

        log::debug!("playing {}", clip.display());
        *self.current.lock().unwrap() = Some(child);
        Ok(())
    }
}

impl Drop for CommandPlayer {
    fn drop(&mut self) {
        self.kill_current();
    }
}

// ---------------------------------------------------------------------------
// NullPlayer
// ---------------------------------------------------------------------------

/// No-op player installed when no player binary is available.
pub struct NullPlayer;

impl ClipPlayer for NullPlayer {
    fn play(&self, clip: &Path) -> Result<(), PlaybackError> {
        log::debug!("no player available, skipping {}", clip.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingPlayer  (test-only)
// ---------------------------------------------------------------------------

/// Test double that records every clip it is asked to play.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingPlayer {
    plays: Mutex<Vec<PathBuf>>,
}

#[cfg(test)]
impl RecordingPlayer {
    pub fn plays(&self) -> Vec<PathBuf> {
        self.plays.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ClipPlayer for RecordingPlayer {
    fn play(&self, clip: &Path) -> Result<(), PlaybackError> {
        self.plays.lock().unwrap().push(clip.to_path_buf());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
