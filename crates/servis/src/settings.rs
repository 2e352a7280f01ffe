//! Persistent user settings
//!
//! A small JSON file at a fixed per-user location. It is read once at startup
//! and rewritten in full whenever a setting changes. Keys this version does not
//! know about are carried through unchanged.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ServisError};

pub const APP_FOLDER: &str = "StefanPOS";
pub const SETTINGS_FILE: &str = "settings.json";
/// Environment variable overriding the settings file location
pub const SETTINGS_PATH_ENV: &str = "STEFANPOS_SETTINGS";

pub const DEFAULT_FONT_SIZE: u32 = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Point size of the interface font
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// Path of the remote database credentials file; empty when not configured
    #[serde(default)]
    pub cred_location: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            cred_location: String::new(),
            extra: serde_json::Map::new(),
        }
    }
}

impl Settings {
    /// Credentials path, if one is configured
    pub fn credentials_path(&self) -> Option<&Path> {
        (!self.cred_location.trim().is_empty()).then(|| Path::new(self.cred_location.trim()))
    }
}

/// Settings bound to the file they were loaded from
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Fixed per-user settings location.
    ///
    /// `%APPDATA%\StefanPOS\settings.json` on Windows, `~/.config/StefanPOS/settings.json`
    /// elsewhere; `STEFANPOS_SETTINGS` overrides both.
    pub fn default_path() -> PathBuf {
        if let Some(path) = std::env::var_os(SETTINGS_PATH_ENV) {
            return PathBuf::from(path);
        }
        let base = std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut path = PathBuf::from(home);
                    path.push(".config");
                    path
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));
        base.join(APP_FOLDER).join(SETTINGS_FILE)
    }

    /// Load settings from `path`; a missing file yields the defaults
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|source| {
                ServisError::SettingsFormat {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("[SettingsStore] No settings at {}, using defaults", path.display());
                Settings::default()
            }
            Err(source) => return Err(ServisError::SettingsIo { path, source }),
        };
        debug!("[SettingsStore] Loaded {:?} from {}", settings, path.display());
        Ok(Self { path, settings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Change settings and rewrite the whole file
    pub fn update(&mut self, change: impl FnOnce(&mut Settings)) -> Result<()> {
        change(&mut self.settings);
        self.save()
    }

    pub fn set_font_size(&mut self, font_size: u32) -> Result<()> {
        self.update(|s| s.font_size = font_size)
    }

    pub fn save(&self) -> Result<()> {
        let io_err = |source| ServisError::SettingsIo {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.settings
            .serialize(&mut serializer)
            .map_err(|source| ServisError::SettingsFormat {
                path: self.path.clone(),
                source,
            })?;

        fs::write(&self.path, buf).map_err(io_err)?;
        debug!("[SettingsStore] Saved {}", self.path.display());
        Ok(())
    }
}
