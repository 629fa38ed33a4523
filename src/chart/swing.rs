//! Fractal swing detection (ZigZag / Dow swings).
//!
//! A bar is a high fractal when its high is strictly above the highs of the
//! `width` bars on each side, and a low fractal when its low is strictly
//! below theirs. Ties on either side disqualify. Accepted fractals form an
//! alternating High/Low sequence: a fractal of the same kind as the pending
//! swing replaces it when more extreme and is dropped otherwise.

use serde::Serialize;
use tracing::debug;

use super::base::IndicatorPoint;
use super::indicator::Indicator;
use crate::data::Bar;
use crate::error::ConfigError;

/// Default fractal half-width
pub const DEFAULT_FRACTAL_WIDTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SwingKind {
    High,
    Low,
}

/// One confirmed swing extreme
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SwingPoint {
    pub time: i64,
    pub value: f64,
    pub kind: SwingKind,
}

impl SwingPoint {
    pub fn high(time: i64, value: f64) -> Self {
        Self {
            time,
            value,
            kind: SwingKind::High,
        }
    }

    pub fn low(time: i64, value: f64) -> Self {
        Self {
            time,
            value,
            kind: SwingKind::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerPosition {
    AboveBar,
    BelowBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerShape {
    ArrowDown,
    ArrowUp,
}

/// Overlay annotation for one swing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwingMarker {
    pub time: i64,
    pub position: MarkerPosition,
    pub shape: MarkerShape,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwingOutput {
    pub points: Vec<SwingPoint>,
    /// Swing values as a line series for the ZigZag overlay
    pub line: Vec<IndicatorPoint>,
    pub markers: Vec<SwingMarker>,
}

/// Pending swing sequence with replace-last-if-more-extreme revision
#[derive(Debug, Default)]
struct SwingStack {
    points: Vec<SwingPoint>,
}

impl SwingStack {
    /// Offer a fractal candidate, returning whether it was kept
    fn offer(&mut self, candidate: SwingPoint) -> bool {
        let Some(last) = self.points.last() else {
            self.points.push(candidate);
            return true;
        };

        if last.kind != candidate.kind {
            self.points.push(candidate);
            return true;
        }

        let more_extreme = match candidate.kind {
            SwingKind::High => candidate.value > last.value,
            SwingKind::Low => candidate.value < last.value,
        };
        if more_extreme {
            self.points.pop();
            self.points.push(candidate);
        }
        more_extreme
    }

    fn into_points(self) -> Vec<SwingPoint> {
        self.points
    }
}

/// Fractal-based swing point extractor
#[derive(Debug, Clone)]
pub struct SwingDetector {
    width: usize,
    name: String,
}

impl Default for SwingDetector {
    fn default() -> Self {
        Self {
            width: DEFAULT_FRACTAL_WIDTH,
            name: format!("SWING{}", DEFAULT_FRACTAL_WIDTH),
        }
    }
}

impl SwingDetector {
    pub fn new(width: usize) -> Result<Self, ConfigError> {
        if width == 0 {
            return Err(ConfigError::InvalidFractalWidth(width));
        }
        Ok(Self {
            width,
            name: format!("SWING{}", width),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    fn is_high_fractal(&self, bars: &[Bar], i: usize) -> bool {
        let high = bars[i].high;
        bars[i - self.width..i].iter().all(|b| b.high < high)
            && bars[i + 1..=i + self.width].iter().all(|b| b.high < high)
    }

    fn is_low_fractal(&self, bars: &[Bar], i: usize) -> bool {
        let low = bars[i].low;
        bars[i - self.width..i].iter().all(|b| b.low > low)
            && bars[i + 1..=i + self.width].iter().all(|b| b.low > low)
    }

    /// Extract the alternating swing sequence.
    ///
    /// A series shorter than `2 * width + 1` bars has no fractal and yields
    /// no swings. A bar that is both a high and a low fractal offers its high
    /// first and falls back to its low when the high is not kept.
    pub fn detect(&self, bars: &[Bar]) -> Vec<SwingPoint> {
        let p = self.width;
        if bars.len() <= 2 * p {
            debug!(bars = bars.len(), width = p, "series too short for fractals");
            return Vec::new();
        }

        let mut stack = SwingStack::default();
        let mut rejected = 0usize;
        for i in p..bars.len() - p {
            let is_high = self.is_high_fractal(bars, i);
            if is_high && stack.offer(SwingPoint::high(bars[i].time, bars[i].high)) {
                continue;
            }
            if self.is_low_fractal(bars, i) {
                if !stack.offer(SwingPoint::low(bars[i].time, bars[i].low)) {
                    rejected += 1;
                }
            } else if is_high {
                rejected += 1;
            }
        }

        let points = stack.into_points();
        debug!(swings = points.len(), rejected, width = p, "detected swings");
        points
    }
}

/// HH/LH/LL/HL label of each swing relative to the previous swing of the
/// same kind. The first High is `H`, the first Low is `L`.
pub fn label_swings(points: &[SwingPoint]) -> Vec<&'static str> {
    let mut last_high: Option<f64> = None;
    let mut last_low: Option<f64> = None;

    points
        .iter()
        .map(|point| match point.kind {
            SwingKind::High => {
                let label = match last_high {
                    None => "H",
                    Some(prev) if point.value > prev => "HH",
                    Some(_) => "LH",
                };
                last_high = Some(point.value);
                label
            }
            SwingKind::Low => {
                let label = match last_low {
                    None => "L",
                    Some(prev) if point.value < prev => "LL",
                    Some(_) => "HL",
                };
                last_low = Some(point.value);
                label
            }
        })
        .collect()
}

/// Overlay markers: Highs above the bar pointing down, Lows below pointing up
pub fn swing_markers(points: &[SwingPoint]) -> Vec<SwingMarker> {
    points
        .iter()
        .zip(label_swings(points))
        .map(|(point, label)| {
            let (position, shape) = match point.kind {
                SwingKind::High => (MarkerPosition::AboveBar, MarkerShape::ArrowDown),
                SwingKind::Low => (MarkerPosition::BelowBar, MarkerShape::ArrowUp),
            };
            SwingMarker {
                time: point.time,
                position,
                shape,
                text: label.to_string(),
            }
        })
        .collect()
}

impl Indicator for SwingDetector {
    type Output = SwingOutput;

    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.width
    }

    fn calculate(&self, bars: &[Bar]) -> SwingOutput {
        let points = self.detect(bars);
        let line = points
            .iter()
            .map(|point| IndicatorPoint::new(point.time, point.value))
            .collect();
        let markers = swing_markers(&points);
        SwingOutput {
            points,
            line,
            markers,
        }
    }
}
