use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::input::TriggerPredicate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "dom-copier";
const APP_CONFIG_FILE: &str = "config.json";

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// How long a captured pointer context stays authoritative.
    pub context_ttl_ms: u64,
    /// Upper bound on each frame's answer during an election. `None` waits
    /// for every frame.
    pub frame_query_timeout_ms: Option<u64>,
    pub capture_trigger: TriggerPredicate,
    /// Interaction that opens the palette in place, without an election.
    pub direct_trigger: Option<TriggerPredicate>,
    pub palette: PaletteSettings,
}

impl AppConfig {
    pub fn frame_query_timeout(&self) -> Option<Duration> {
        self.frame_query_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            context_ttl_ms: 30_000,
            frame_query_timeout_ms: None,
            capture_trigger: TriggerPredicate::secondary_click(),
            direct_trigger: None,
            palette: PaletteSettings::default(),
        }
    }
}

/// Sizes and limits of the palette, its previews and the highlight box.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PaletteSettings {
    pub max_snippet_len: usize,
    pub max_id_len: usize,
    pub max_class_count: usize,
    pub cursor_offset_px: f64,
    pub viewport_padding_px: f64,
    pub highlight_padding_px: f64,
    pub min_width: f64,
    pub max_width: f64,
    pub max_height: f64,
    pub header_height: f64,
    pub section_height: f64,
    pub item_height: f64,
    pub sticky_height: f64,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self {
            max_snippet_len: 90,
            max_id_len: 20,
            max_class_count: 3,
            cursor_offset_px: 12.0,
            viewport_padding_px: 8.0,
            highlight_padding_px: 2.0,
            min_width: 320.0,
            max_width: 560.0,
            max_height: 360.0,
            header_height: 44.0,
            section_height: 28.0,
            item_height: 52.0,
            sticky_height: 32.0,
        }
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
