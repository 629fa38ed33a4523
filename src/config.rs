//! Engine configuration: which indicators run, with what parameters, at which timeframe.
//!
//! Field names follow the camelCase JSON document consumed from the UI layer.
//! Every field has a default, so a partial document such as
//! `{"rsi": {"enabled": true}}` is accepted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::data::Timeframe;
use crate::error::ConfigError;

/// Simple moving average or RSI toggle with its window length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PeriodOption {
    pub enabled: bool,
    pub period: usize,
}

impl PeriodOption {
    pub fn new(enabled: bool, period: usize) -> Self {
        Self { enabled, period }
    }
}

impl Default for PeriodOption {
    fn default() -> Self {
        Self::new(false, 20)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BollingerOption {
    pub enabled: bool,
    pub period: usize,
    pub deviation: f64,
}

impl Default for BollingerOption {
    fn default() -> Self {
        Self {
            enabled: false,
            period: 20,
            deviation: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MacdOption {
    pub enabled: bool,
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl MacdOption {
    pub fn new(enabled: bool, fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            enabled,
            fast,
            slow,
            signal,
        }
    }
}

impl Default for MacdOption {
    fn default() -> Self {
        Self::new(false, 12, 26, 9)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwingOption {
    pub enabled: bool,
    /// Bars required on each side of a fractal
    pub fractal_width: usize,
}

impl Default for SwingOption {
    fn default() -> Self {
        Self {
            enabled: false,
            fractal_width: 5,
        }
    }
}

/// Full set of recognized options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub sma_fast: PeriodOption,
    pub sma_slow: PeriodOption,
    pub bollinger: BollingerOption,
    pub rsi: PeriodOption,
    pub macd_primary: MacdOption,
    pub macd_secondary: MacdOption,
    pub swings: SwingOption,
    pub timeframe_minutes: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sma_fast: PeriodOption::new(false, 20),
            sma_slow: PeriodOption::new(false, 50),
            bollinger: BollingerOption::default(),
            rsi: PeriodOption::new(false, 14),
            macd_primary: MacdOption::new(false, 12, 26, 9),
            macd_secondary: MacdOption::new(false, 19, 39, 9),
            swings: SwingOption::default(),
            timeframe_minutes: 5,
        }
    }
}

/// Recursively replace fields of `base` with those present in `patch`
fn overlay(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn check_period(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidPeriod { name, value });
    }
    Ok(())
}

fn check_macd(names: [&'static str; 3], option: &MacdOption) -> Result<(), ConfigError> {
    check_period(names[0], option.fast)?;
    check_period(names[1], option.slow)?;
    check_period(names[2], option.signal)
}

impl EngineConfig {
    /// Parse a JSON configuration document and validate it.
    ///
    /// The document is overlaid onto the defaults field by field, so a
    /// partial option such as `{"macdSecondary": {"enabled": true}}` keeps
    /// the 19/39/9 periods of that option rather than generic ones.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let patch: Value = serde_json::from_str(text)?;
        let mut merged = serde_json::to_value(EngineConfig::default())?;
        overlay(&mut merged, patch);

        let config: EngineConfig = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range parameters of enabled options and the timeframe.
    ///
    /// Disabled options are not inspected, so a UI may keep a half-edited
    /// value around while the option is switched off.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Timeframe::new(self.timeframe_minutes)?;

        if self.sma_fast.enabled {
            check_period("smaFast", self.sma_fast.period)?;
        }
        if self.sma_slow.enabled {
            check_period("smaSlow", self.sma_slow.period)?;
        }
        if self.bollinger.enabled {
            check_period("bollinger", self.bollinger.period)?;
            let deviation = self.bollinger.deviation;
            if !deviation.is_finite() || deviation < 0.0 {
                return Err(ConfigError::InvalidDeviation(deviation));
            }
        }
        if self.rsi.enabled {
            check_period("rsi", self.rsi.period)?;
        }
        if self.macd_primary.enabled {
            check_macd(
                ["macdPrimary.fast", "macdPrimary.slow", "macdPrimary.signal"],
                &self.macd_primary,
            )?;
        }
        if self.macd_secondary.enabled {
            check_macd(
                ["macdSecondary.fast", "macdSecondary.slow", "macdSecondary.signal"],
                &self.macd_secondary,
            )?;
        }
        if self.swings.enabled && self.swings.fractal_width == 0 {
            return Err(ConfigError::InvalidFractalWidth(0));
        }
        Ok(())
    }

    /// Validated timeframe
    pub fn timeframe(&self) -> Result<Timeframe, ConfigError> {
        Timeframe::new(self.timeframe_minutes)
    }
}

/// Load and validate a configuration file
pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let text = fs::read_to_string(path)?;
    EngineConfig::from_json_str(&text)
}
