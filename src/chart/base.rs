//! Time-stamped output points shared by all indicators.
//!
//! Every series is index-aligned with the bar series it was computed from:
//! warm-up positions are emitted as points without a value, never skipped.

use serde::Serialize;

use crate::data::Bar;

/// One value of a single-line indicator
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl IndicatorPoint {
    pub fn new(time: i64, value: f64) -> Self {
        Self {
            time,
            value: Some(value),
        }
    }

    /// Point inside the warm-up period
    pub fn absent(time: i64) -> Self {
        Self { time, value: None }
    }

    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }
}

/// One value of Bollinger Bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandPoint {
    pub time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
}

impl BandPoint {
    pub fn absent(time: i64) -> Self {
        Self {
            time,
            upper: None,
            middle: None,
            lower: None,
        }
    }
}

/// Sign of a histogram bar, used by renderers for coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistogramSign {
    Positive,
    Negative,
}

/// One MACD histogram bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramPoint {
    pub time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub sign: HistogramSign,
}

impl HistogramPoint {
    /// Zero counts as positive
    pub fn new(time: i64, value: Option<f64>) -> Self {
        let sign = match value {
            Some(v) if v < 0.0 => HistogramSign::Negative,
            _ => HistogramSign::Positive,
        };
        Self { time, value, sign }
    }
}

/// Pair each bar's time with the value at the same index
pub fn to_points(bars: &[Bar], values: &[Option<f64>]) -> Vec<IndicatorPoint> {
    bars.iter()
        .zip(values)
        .map(|(bar, value)| IndicatorPoint {
            time: bar.time,
            value: *value,
        })
        .collect()
}
