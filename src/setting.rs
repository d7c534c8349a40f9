//! Service settings.
//!
//! Settings are a flat map of dotted keys. Values come from the defaults
//! below, then from the JSON settings file, then from environment variables
//! (`redis.port` is overridden by `REDIS_PORT`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::SettingError;

/// Setting filename, used when `BAR_INGEST_SETTINGS` is not set
pub const SETTING_FILENAME: &str = "bar_ingest_setting.json";

/// Environment variable naming the settings file
pub const SETTING_PATH_ENV: &str = "BAR_INGEST_SETTINGS";

/// Default settings
fn default_settings() -> HashMap<String, SettingValue> {
    let mut settings = HashMap::new();

    settings.insert("project.name".to_string(), SettingValue::String("bars-backend".to_string()));

    // HTTP listener
    settings.insert("app.host".to_string(), SettingValue::String("0.0.0.0".to_string()));
    settings.insert("app.port".to_string(), SettingValue::Int(8000));

    // Reserved for a future model integration, not read anywhere yet
    settings.insert("open_api.key".to_string(), SettingValue::String(String::new()));
    settings.insert("open_api.model".to_string(), SettingValue::String(String::new()));

    // Redis settings
    settings.insert("redis.host".to_string(), SettingValue::String("localhost".to_string()));
    settings.insert("redis.port".to_string(), SettingValue::Int(6379));
    settings.insert("redis.db".to_string(), SettingValue::Int(0));

    // Database settings
    settings.insert("database.name".to_string(), SettingValue::String("redis".to_string()));
    settings.insert("database.key".to_string(), SettingValue::String("bars".to_string()));

    // Schema settings
    settings.insert("schema.venues".to_string(), SettingValue::String(String::new()));
    settings.insert("schema.providers".to_string(), SettingValue::String(String::new()));
    settings.insert("schema.strict".to_string(), SettingValue::Bool(false));

    // Log settings
    settings.insert("log.level".to_string(), SettingValue::Int(20)); // INFO level
    settings.insert("log.console".to_string(), SettingValue::Bool(true));
    settings.insert("log.file".to_string(), SettingValue::Bool(false));
    settings.insert("log.folder".to_string(), SettingValue::String("log".to_string()));

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

    /// Parse raw text into the same variant as `self`.
    fn parse_like(&self, raw: &str) -> Option<SettingValue> {
        match self {
            SettingValue::String(_) => Some(SettingValue::String(raw.to_string())),
            SettingValue::Int(_) => raw.trim().parse().ok().map(SettingValue::Int),
            SettingValue::Float(_) => raw.trim().parse().ok().map(SettingValue::Float),
            SettingValue::Bool(_) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Some(SettingValue::Bool(true)),
                "0" | "false" | "no" | "off" => Some(SettingValue::Bool(false)),
                _ => None,
            },
        }
    }
}

/// Environment variable name for a setting key: `log.level` -> `LOG_LEVEL`.
pub fn env_key(key: &str) -> String {
    key.replace('.', "_").to_ascii_uppercase()
}

/// Settings container
pub struct Settings {
    settings: RwLock<HashMap<String, SettingValue>>,
}

impl Settings {
    /// Create new Settings with defaults only
    pub fn new() -> Self {
        Self {
            settings: RwLock::new(default_settings()),
        }
    }

    /// Defaults, then `.env`, the settings file and the process environment.
    pub fn load() -> Result<Self, SettingError> {
        // A missing .env is normal.
        let _ = dotenvy::dotenv();

        let settings = Self::new();
        settings.update(load_settings_from_file(&settings_path())?);
        settings.apply_env(std::env::vars())?;
        Ok(settings)
    }

    /// Override known keys from `(NAME, value)` pairs. Unknown names are ignored.
    pub fn apply_env<I>(&self, vars: I) -> Result<(), SettingError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        let mut settings = self.settings.write().map_err(|e| SettingError::Poisoned(e.to_string()))?;

        for (key, current) in settings.iter_mut() {
            let Some(raw) = vars.get(&env_key(key)) else {
                continue;
            };
            *current = current.parse_like(raw).ok_or_else(|| SettingError::InvalidValue {
                key: key.clone(),
                value: raw.clone(),
            })?;
        }
        Ok(())
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

    /// Comma separated string setting, blanks dropped
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get_string(key)
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
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

    /// Save settings to file
    pub fn save(&self, path: &Path) -> Result<(), SettingError> {
        let settings = self.settings.read().map_err(|e| SettingError::Poisoned(e.to_string()))?;
        let json = serde_json::to_string_pretty(&*settings)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings file location
pub fn settings_path() -> PathBuf {
    std::env::var_os(SETTING_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(SETTING_FILENAME))
}

/// Load settings from JSON file. A missing file yields no overrides.
pub fn load_settings_from_file(path: &Path) -> Result<HashMap<String, SettingValue>, SettingError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
