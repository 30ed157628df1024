//! Configuration: typed settings with TOML persistence and resolved
//! application paths.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, PlaybackConfig, RecognitionConfig, SpeechConfig, UiConfig};
