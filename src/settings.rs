use crate::error::Result;
use crate::geometry::DEFAULT_QUANTUM;
use crate::model::BlockType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MIN_CANVAS_WIDTH: f32 = 200.0;
pub const MAX_CANVAS_WIDTH: f32 = 1600.0;
/// Canvas height is always this multiple of its width.
pub const CANVAS_ASPECT: f32 = 1.5;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorSettings {
    pub grid_size: f32,
    pub canvas_width: f32,
    pub default_block_type: BlockType,
    pub layouts_path: String,
    pub export_path: String,
    pub history_limit: Option<usize>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_QUANTUM,
            canvas_width: 600.0,
            default_block_type: BlockType::Div,
            layouts_path: "layouts.json".to_string(),
            export_path: "layout.json".to_string(),
            history_limit: None,
        }
    }
}

pub fn clamp_canvas_width(width: f32) -> f32 {
    if width.is_nan() {
        return MIN_CANVAS_WIDTH;
    }
    width.clamp(MIN_CANVAS_WIDTH, MAX_CANVAS_WIDTH)
}

/// First settings file that exists: the user config, then the working directory.
pub fn config_path() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home).join(".config").join("blockgrid.toml");
        if path.exists() {
            return Some(path);
        }
    }
    ["settings.toml", "settings.json"]
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "toml")
}

pub fn load_settings(path: impl AsRef<Path>) -> Result<EditorSettings> {
    let path = path.as_ref();
    let s = std::fs::read_to_string(path)?;
    if is_toml(path) {
        match toml::from_str::<EditorSettings>(&s) {
            Ok(settings) => Ok(settings),
            Err(e) => serde_json::from_str(&s).map_err(|_| e.into()),
        }
    } else {
        match serde_json::from_str::<EditorSettings>(&s) {
            Ok(settings) => Ok(settings),
            Err(e) => toml::from_str(&s).map_err(|_| e.into()),
        }
    }
}

pub fn save_settings(path: impl AsRef<Path>, settings: &EditorSettings) -> Result<()> {
    let path = path.as_ref();
    let text = if is_toml(path) {
        toml::to_string_pretty(settings)?
    } else {
        serde_json::to_string_pretty(settings)?
    };
    std::fs::write(path, text)?;
    log::info!("saved settings to {}", path.display());
    Ok(())
}

/// Settings from [`config_path`], falling back to defaults when there is no
/// file or it cannot be read.
pub fn load_or_default() -> (EditorSettings, PathBuf) {
    let Some(path) = config_path() else {
        return (EditorSettings::default(), PathBuf::from("settings.toml"));
    };
    match load_settings(&path) {
        Ok(settings) => {
            log::info!("loaded settings from {}", path.display());
            (settings, path)
        }
        Err(e) => {
            log::warn!("ignoring settings in {}: {e}", path.display());
            (EditorSettings::default(), path)
        }
    }
}
