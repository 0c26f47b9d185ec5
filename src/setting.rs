//! Global settings for figures, palettes and logging.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{LazyLock, RwLock};

use crate::error::Result;
use crate::utility::get_file_path;

/// Default settings
fn default_settings() -> HashMap<String, SettingValue> {
    let mut settings = HashMap::new();

    // Figure settings
    settings.insert("figure.width".to_string(), SettingValue::Int(800));
    settings.insert("figure.height".to_string(), SettingValue::Int(400));

    // Palette settings
    settings.insert("palette.default".to_string(), SettingValue::String("Category10_10".to_string()));
    settings.insert("palette.muted_alpha".to_string(), SettingValue::Float(0.2));

    // Chart helper settings
    settings.insert("bbands.window".to_string(), SettingValue::Int(20));
    settings.insert("hist.bins".to_string(), SettingValue::Int(10));
    settings.insert("tooltip.auto".to_string(), SettingValue::Bool(true));
    settings.insert("grayscale.bits".to_string(), SettingValue::Int(4));

    // Log settings
    settings.insert("log.active".to_string(), SettingValue::Bool(true));
    settings.insert("log.level".to_string(), SettingValue::Int(20)); // INFO level
    settings.insert("log.console".to_string(), SettingValue::Bool(true));
    settings.insert("log.file".to_string(), SettingValue::Bool(false));

    settings
}

/// Setting value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl SettingValue {
    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64
    pub fn as_float(&self) -> Option<f64> {
        match self {
            SettingValue::Float(f) => Some(*f),
            SettingValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Settings container
pub struct Settings {
    settings: RwLock<HashMap<String, SettingValue>>,
}

impl Settings {
    /// Create new Settings with defaults, overridden by the settings file
    pub fn new() -> Self {
        let settings = Self::with_defaults();
        let filepath = get_file_path(SETTING_FILENAME);
        if let Some(file_settings) = load_settings_from_file(&filepath) {
            settings.update(file_settings);
        }
        settings
    }

    /// Create Settings holding only the built-in defaults
    pub fn with_defaults() -> Self {
        Self {
            settings: RwLock::new(default_settings()),
        }
    }

    /// Create Settings from defaults overridden by a specific file
    pub fn from_file(filepath: &Path) -> Self {
        let settings = Self::with_defaults();
        if let Some(file_settings) = load_settings_from_file(filepath) {
            settings.update(file_settings);
        }
        settings
    }

    /// Get a setting value
    pub fn get(&self, key: &str) -> Option<SettingValue> {
        self.settings.read().ok()?.get(key).cloned()
    }

    /// Get a string setting
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(|s| s.to_string()))
    }

    /// Get an integer setting
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_int())
    }

    /// Get a float setting
    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.as_float())
    }

    /// Get a bool setting
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    /// Get a non-negative integer setting as usize
    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get_int(key).and_then(|v| usize::try_from(v).ok())
    }

    /// Set a setting value
    pub fn set(&self, key: impl Into<String>, value: SettingValue) {
        if let Ok(mut settings) = self.settings.write() {
            settings.insert(key.into(), value);
        }
    }

    /// Update settings from a map
    pub fn update(&self, new_settings: HashMap<String, SettingValue>) {
        if let Ok(mut settings) = self.settings.write() {
            for (key, value) in new_settings {
                settings.insert(key, value);
            }
        }
    }

    /// Get all settings as HashMap
    pub fn get_all(&self) -> HashMap<String, SettingValue> {
        self.settings
            .read()
            .map(|settings| settings.clone())
            .unwrap_or_default()
    }

    /// Save settings to the default settings file
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_file_path(SETTING_FILENAME))
    }

    /// Save settings to a specific file
    pub fn save_to(&self, filepath: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.get_all())?;
        fs::write(filepath, json)?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Setting filename
pub const SETTING_FILENAME: &str = "figkit_setting.json";

/// Load settings from JSON file
fn load_settings_from_file(filepath: &Path) -> Option<HashMap<String, SettingValue>> {
    if filepath.exists() {
        let content = fs::read_to_string(filepath).ok()?;
        match serde_json::from_str(&content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!("ignoring malformed settings file {}: {}", filepath.display(), e);
                None
            }
        }
    } else {
        None
    }
}

/// Global settings instance
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::new);
