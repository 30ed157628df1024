//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::AppPaths;

// ---------------------------------------------------------------------------
// RecognitionConfig
// ---------------------------------------------------------------------------

/// Settings for the gesture recognition loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Minimum classifier confidence before a label may be emitted.
    pub confidence_threshold: f32,
    /// Side length in pixels of the square canvas fed to the classifier.
    pub canvas_size: u32,
    /// Margin in pixels added on all sides of the detected hand box before
    /// cropping (clamped against the frame bounds).
    pub crop_margin: u32,
    /// Minimum number of skin-classified pixels for a detection to count as
    /// a hand.
    pub min_hand_pixels: u32,
    /// Sleep between loop iterations in milliseconds; keeps the loop
    /// responsive to `stop()`.
    pub tick_ms: u64,
    /// Directory of still images to replay as the frame source when no
    /// camera backend is available.  `None` leaves the loop inert.
    pub frame_dir: Option<PathBuf>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.90,
            canvas_size: 300,
            crop_margin: 20,
            min_hand_pixels: 400,
            tick_ms: 15,
            frame_dir: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for microphone capture and the remote speech-to-text service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Recognition endpoint URL.
    pub endpoint: String,
    /// Language tag sent to the service (e.g. `"en-us"`).
    pub language: String,
    /// API key appended to the request — `None` sends no key parameter.
    pub api_key: Option<String>,
    /// Maximum seconds to wait for a recognition response.
    pub timeout_secs: u64,
    /// Milliseconds of audio sampled to estimate the ambient noise floor
    /// before each utterance.
    pub calibrate_ms: u64,
    /// Trailing silence in milliseconds that ends an utterance.
    pub silence_ms: u64,
    /// Hard cap on utterance length in seconds.
    pub max_utterance_secs: f32,
    /// Absolute lower bound on the speech RMS threshold.
    pub threshold_floor: f32,
    /// Multiplier applied to the measured ambient RMS to obtain the speech
    /// threshold.
    pub threshold_factor: f32,
    /// Text-to-speech program override — `None` auto-discovers one.
    pub synth_program: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://www.google.com/speech-api/v2/recognize".into(),
            language: "en-us".into(),
            api_key: None,
            timeout_secs: 10,
            calibrate_ms: 500,
            silence_ms: 700,
            max_utterance_secs: 10.0,
            threshold_floor: 0.012,
            threshold_factor: 1.8,
            synth_program: None,
        }
    }
}

// ---------------------------------------------------------------------------
// PlaybackConfig
// ---------------------------------------------------------------------------

/// Settings for clip playback sequencing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Pause in seconds between sequential clip plays.
    pub dwell_secs: f32,
    /// Media player program override — `None` auto-discovers one.
    pub player_program: Option<String>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            dwell_secs: 2.0,
            player_program: None,
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Window appearance and behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Last saved window position `(x, y)` in screen pixels.  `None` means
    /// let the OS / window manager pick a position on first launch.
    pub window_position: Option<(f32, f32)>,
    /// Keep the window floating above all other windows.
    pub always_on_top: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_position: None,
            always_on_top: false,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use sign_bridge::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gesture recognition loop settings.
    pub recognition: RecognitionConfig,
    /// Microphone / speech service settings.
    pub speech: SpeechConfig,
    /// Clip sequencing settings.
    pub playback: PlaybackConfig,
    /// Window settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(
            original.recognition.confidence_threshold,
            loaded.recognition.confidence_threshold
        );
        assert_eq!(original.recognition.canvas_size, loaded.recognition.canvas_size);
        assert_eq!(original.recognition.crop_margin, loaded.recognition.crop_margin);
        assert_eq!(original.speech.endpoint, loaded.speech.endpoint);
        assert_eq!(original.speech.language, loaded.speech.language);
        assert_eq!(original.speech.api_key, loaded.speech.api_key);
        assert_eq!(original.playback.dwell_secs, loaded.playback.dwell_secs);
        assert_eq!(original.ui.always_on_top, loaded.ui.always_on_top);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(
            config.recognition.confidence_threshold,
            default.recognition.confidence_threshold
        );
        assert_eq!(config.speech.endpoint, default.speech.endpoint);
        assert_eq!(config.playback.dwell_secs, default.playback.dwell_secs);
    }

    /// Verify default values match the design constants.
    #[test]
    fn default_values_match_design() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.recognition.confidence_threshold, 0.90);
        assert_eq!(cfg.recognition.canvas_size, 300);
        assert_eq!(cfg.recognition.crop_margin, 20);
        assert_eq!(cfg.recognition.tick_ms, 15);
        assert!(cfg.recognition.frame_dir.is_none());
        assert_eq!(cfg.speech.language, "en-us");
        assert!(cfg.speech.api_key.is_none());
        assert_eq!(cfg.speech.timeout_secs, 10);
        assert_eq!(cfg.playback.dwell_secs, 2.0);
        assert!(cfg.playback.player_program.is_none());
        assert!(!cfg.ui.always_on_top);
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.recognition.confidence_threshold = 0.75;
        cfg.recognition.frame_dir = Some(PathBuf::from("/tmp/frames"));
        cfg.speech.language = "en-gb".into();
        cfg.speech.api_key = Some("test-key".into());
        cfg.playback.dwell_secs = 1.25;
        cfg.playback.player_program = Some("ffplay".into());
        cfg.ui.window_position = Some((100.0, 200.0));

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.recognition.confidence_threshold, 0.75);
        assert_eq!(loaded.recognition.frame_dir, Some(PathBuf::from("/tmp/frames")));
        assert_eq!(loaded.speech.language, "en-gb");
        assert_eq!(loaded.speech.api_key, Some("test-key".into()));
        assert_eq!(loaded.playback.dwell_secs, 1.25);
        assert_eq!(loaded.playback.player_program, Some("ffplay".into()));
        assert_eq!(loaded.ui.window_position, Some((100.0, 200.0)));
    }
}
