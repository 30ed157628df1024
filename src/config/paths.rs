//! Application paths: platform config directory plus the bundled resource
//! root.
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\sign-bridge\
//!   macOS:   ~/Library/Application Support/sign-bridge/
//!   Linux:   ~/.config/sign-bridge/
//!
//! The resource root holds the classifier model and the clip catalog.  It is
//! resolved so that both a development checkout and a packaged binary work:
//!
//! 1. `$SIGN_BRIDGE_RESOURCES` when set,
//! 2. `<exe dir>/resources` when that directory exists (packaged layout),
//! 3. `./resources` otherwise (development layout).

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Root of the bundled resources (model + media).
    pub resource_dir: PathBuf,
    /// Classifier weights, `<resources>/model/gesture-model.json`.
    pub model_file: PathBuf,
    /// Label list, `<resources>/model/labels.txt`.
    pub labels_file: PathBuf,
    /// Clip catalog root, `<resources>/media`.
    pub media_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "sign-bridge";

    /// Resolves all paths using the `dirs` crate and the resource-root
    /// fallback chain described in the module docs.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);
        let settings_file = config_dir.join("settings.toml");

        let resource_dir = Self::resource_root();
        let model_dir = resource_dir.join("model");

        Self {
            config_dir,
            settings_file,
            model_file: model_dir.join("gesture-model.json"),
            labels_file: model_dir.join("labels.txt"),
            media_dir: resource_dir.join("media"),
            resource_dir,
        }
    }

    /// Resolve the resource root for both dev and packaged layouts.
    fn resource_root() -> PathBuf {
        if let Ok(dir) = std::env::var("SIGN_BRIDGE_RESOURCES") {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }

        if let Ok(exe) = std::env::current_exe() {
            if let Some(exe_dir) = exe.parent() {
                let bundled = exe_dir.join("resources");
                if bundled.is_dir() {
                    return bundled;
                }
            }
        }

        PathBuf::from("resources")
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
