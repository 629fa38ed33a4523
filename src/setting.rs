//! Global runtime settings of the engine process.
//!
//! These cover the ambient concerns (logging, dashboard defaults). Indicator
//! parameters live in [`crate::config::EngineConfig`] instead so every
//! computation stays a pure function of its inputs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::{LazyLock, RwLock};

use crate::error::ConfigError;

/// Environment variable naming an optional JSON settings file
pub const SETTING_FILE_ENV: &str = "FXLAB_SETTING_FILE";

pub const LOG_LEVEL: &str = "log.level";
pub const LOG_CONSOLE: &str = "log.console";
pub const DASHBOARD_TIMEFRAMES: &str = "dashboard.timeframes";
pub const DASHBOARD_FRACTAL_WIDTH: &str = "dashboard.fractal_width";
pub const DASHBOARD_MIN_BARS: &str = "dashboard.min_bars";

fn default_settings() -> HashMap<String, SettingValue> {
    HashMap::from([
        (LOG_LEVEL.to_string(), SettingValue::Int(20)), // INFO
        (LOG_CONSOLE.to_string(), SettingValue::Bool(true)),
        (
            DASHBOARD_TIMEFRAMES.to_string(),
            SettingValue::IntList(vec![1, 5, 15, 60, 240]),
        ),
        (DASHBOARD_FRACTAL_WIDTH.to_string(), SettingValue::Int(5)),
        (DASHBOARD_MIN_BARS.to_string(), SettingValue::Int(10)),
    ])
}

/// Setting value types, matched from plain JSON values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    IntList(Vec<i64>),
}

impl SettingValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int_list(&self) -> Option<&[i64]> {
        match self {
            SettingValue::IntList(v) => Some(v),
            _ => None,
        }
    }
}

/// Read a flat `{"key": value}` JSON settings document
pub fn read_settings_file(path: impl AsRef<Path>) -> Result<HashMap<String, SettingValue>, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Thread-safe key/value settings store
pub struct Settings {
    values: RwLock<HashMap<String, SettingValue>>,
}

impl Settings {
    /// Defaults overlaid by the file named in [`SETTING_FILE_ENV`], if any.
    ///
    /// An unreadable or malformed file is reported and ignored.
    pub fn new() -> Self {
        let settings = Self::with_defaults();

        if let Some(path) = env::var_os(SETTING_FILE_ENV) {
            match read_settings_file(&path) {
                Ok(overlay) => settings.update(overlay),
                Err(e) => tracing::warn!("配置文件 {:?} 无法加载: {}", path, e),
            }
        }

        settings
    }

    /// Settings holding only the built-in defaults
    pub fn with_defaults() -> Self {
        Self {
            values: RwLock::new(default_settings()),
        }
    }

    pub fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn get_as<T>(&self, key: &str, convert: impl FnOnce(&SettingValue) -> Option<T>) -> Option<T> {
        let values = self.values.read().ok()?;
        values.get(key).and_then(convert)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_as(key, |v| v.as_str().map(str::to_string))
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get_as(key, SettingValue::as_int)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_as(key, SettingValue::as_bool)
    }

    pub fn get_int_list(&self, key: &str) -> Option<Vec<i64>> {
        self.get_as(key, |v| v.as_int_list().map(<[i64]>::to_vec))
    }

    pub fn set(&self, key: impl Into<String>, value: SettingValue) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.into(), value);
        }
    }

    /// Overlay several values at once
    pub fn update(&self, overlay: HashMap<String, SettingValue>) {
        if let Ok(mut values) = self.values.write() {
            values.extend(overlay);
        }
    }

    /// Snapshot of every value
    pub fn get_all(&self) -> HashMap<String, SettingValue> {
        self.values
            .read()
            .map(|values| values.clone())
            .unwrap_or_default()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Global settings instance
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::new);

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_setting_value_conversions() {
        assert_eq!(SettingValue::String("x".to_string()).as_str(), Some("x"));
        assert_eq!(SettingValue::Float(3.5).as_int(), None);
        assert_eq!(serde_json::from_str::<SettingValue>("3.5").unwrap(), SettingValue::Float(3.5));
        assert_eq!(SettingValue::Bool(true).as_bool(), Some(true));
        assert_eq!(SettingValue::IntList(vec![1, 5]).as_int_list(), Some(&[1, 5][..]));
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::with_defaults();
        assert_eq!(settings.get_bool(LOG_CONSOLE), Some(true));
        assert_eq!(settings.get_int(LOG_LEVEL), Some(20));
        assert_eq!(settings.get_int_list(DASHBOARD_TIMEFRAMES), Some(vec![1, 5, 15, 60, 240]));
        assert_eq!(settings.get_string(LOG_LEVEL), None);
        assert_eq!(settings.get_all().len(), 5);
    }

    #[test]
    fn test_set_and_update() {
        let settings = Settings::with_defaults();
        settings.set(LOG_LEVEL, SettingValue::Int(10));
        assert_eq!(settings.get_int(LOG_LEVEL), Some(10));

        settings.update(HashMap::from([(
            DASHBOARD_MIN_BARS.to_string(),
            SettingValue::Int(20),
        )]));
        assert_eq!(settings.get_int(DASHBOARD_MIN_BARS), Some(20));
        assert_eq!(settings.get_all().len(), 5);
    }

    #[test]
    fn test_read_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"log.level": 30, "log.console": false, "dashboard.timeframes": [5, 60]}}"#).unwrap();

        let overlay = read_settings_file(file.path()).unwrap();
        assert_eq!(overlay[LOG_LEVEL], SettingValue::Int(30));
        assert_eq!(overlay[LOG_CONSOLE], SettingValue::Bool(false));
        assert_eq!(overlay[DASHBOARD_TIMEFRAMES], SettingValue::IntList(vec![5, 60]));

        assert!(read_settings_file("/nonexistent/settings.json").is_err());
    }
}
