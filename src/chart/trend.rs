//! Coarse trend direction from the most recent swings.

use serde::Serialize;
use std::fmt;

use super::swing::{SwingDetector, SwingKind, SwingPoint};
use crate::data::Bar;

/// Swings considered when classifying
const TREND_WINDOW: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendLabel {
    Up,
    Down,
    Flat,
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TrendLabel::Up => "UP",
            TrendLabel::Down => "DOWN",
            TrendLabel::Flat => "FLAT",
        };
        f.write_str(text)
    }
}

/// Classify the last four swings.
///
/// `Up` needs both a higher high and a higher low, `Down` both a lower high
/// and a lower low. Anything else, including fewer than four swings, is `Flat`.
pub fn classify(swings: &[SwingPoint]) -> TrendLabel {
    if swings.len() < TREND_WINDOW {
        return TrendLabel::Flat;
    }

    let recent = &swings[swings.len() - TREND_WINDOW..];
    let values = |kind: SwingKind| -> Vec<f64> {
        recent
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.value)
            .collect()
    };
    let highs = values(SwingKind::High);
    let lows = values(SwingKind::Low);

    if highs.len() < 2 || lows.len() < 2 {
        return TrendLabel::Flat;
    }
    let (first_high, last_high) = (highs[0], highs[highs.len() - 1]);
    let (first_low, last_low) = (lows[0], lows[lows.len() - 1]);

    if last_high > first_high && last_low > first_low {
        TrendLabel::Up
    } else if last_high < first_high && last_low < first_low {
        TrendLabel::Down
    } else {
        TrendLabel::Flat
    }
}

/// Bars-to-label classifier used by the dashboard
#[derive(Debug, Clone)]
pub struct TrendClassifier {
    detector: SwingDetector,
    min_bars: usize,
}

impl TrendClassifier {
    /// `min_bars` is the series length below which the answer is `Flat`
    /// without looking for swings
    pub fn new(detector: SwingDetector, min_bars: usize) -> Self {
        Self { detector, min_bars }
    }

    pub fn classify_bars(&self, bars: &[Bar]) -> TrendLabel {
        if bars.len() < self.min_bars {
            return TrendLabel::Flat;
        }
        classify(&self.detector.detect(bars))
    }
}
