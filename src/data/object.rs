//! Bar data structures shared by every stage of the pipeline.

use serde::{Deserialize, Serialize};

/// One OHLC sample. `time` is the bar-open timestamp in epoch seconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
        }
    }

    /// Check `low <= open, close <= high`
    pub fn is_consistent(&self) -> bool {
        self.low <= self.high
            && self.low <= self.open
            && self.low <= self.close
            && self.open <= self.high
            && self.close <= self.high
    }
}

/// Timestamp as delivered by a bar source: epoch milliseconds or a text date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTime {
    Millis(f64),
    Text(String),
}

/// Bar record as delivered by a bar source, before normalization.
///
/// Price fields are optional so that incomplete records survive decoding and
/// can be filtered by [`crate::data::normalize`] rather than failing the
/// whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub time: RawTime,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_consistency() {
        assert!(Bar::new(0, 1.0, 2.0, 0.5, 1.5).is_consistent());
        assert!(!Bar::new(0, 1.0, 0.9, 0.5, 0.7).is_consistent());
        assert!(!Bar::new(0, 1.0, 2.0, 1.2, 1.5).is_consistent());
    }

    #[test]
    fn test_raw_bar_decoding() {
        let raw: Vec<RawBar> = serde_json::from_str(
            r#"[
                {"time": "2025-04-01T00:00:00Z", "open": 1.1, "high": 1.2, "low": 1.0, "close": 1.15},
                {"time": 1743465660000, "open": 1.1, "high": 1.2, "low": 1.0},
                {"time": 1743465720000, "open": null, "high": 1.2, "low": 1.0, "close": 1.1}
            ]"#,
        )
        .unwrap();

        assert_eq!(raw.len(), 3);
        assert_eq!(raw[0].time, RawTime::Text("2025-04-01T00:00:00Z".to_string()));
        assert_eq!(raw[1].time, RawTime::Millis(1743465660000.0));
        assert_eq!(raw[1].close, None);
        assert_eq!(raw[2].open, None);
    }
}
