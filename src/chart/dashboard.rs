//! Multi-timeframe market summary for dashboard tiles.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use super::swing::{SwingDetector, DEFAULT_FRACTAL_WIDTH};
use super::trend::{TrendClassifier, TrendLabel};
use crate::data::{aggregate, Bar, Timeframe};
use crate::error::ConfigError;
use crate::setting::{Settings, DASHBOARD_FRACTAL_WIDTH, DASHBOARD_MIN_BARS, DASHBOARD_TIMEFRAMES, SETTINGS};

const DEFAULT_TIMEFRAMES: [u32; 5] = [1, 5, 15, 60, 240];
const DEFAULT_MIN_BARS: usize = 10;

/// Last close compared with the one before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PriceDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeframeTrend {
    pub timeframe: Timeframe,
    pub trend: TrendLabel,
}

/// Parameters of a dashboard pass
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub timeframes: Vec<Timeframe>,
    pub fractal_width: usize,
    /// Resampled series shorter than this are reported `Flat`
    pub min_bars: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            timeframes: DEFAULT_TIMEFRAMES.iter().filter_map(|m| Timeframe::new(*m).ok()).collect(),
            fractal_width: DEFAULT_FRACTAL_WIDTH,
            min_bars: DEFAULT_MIN_BARS,
        }
    }
}

impl DashboardOptions {
    /// Read `dashboard.*` settings, keeping the default for anything missing or invalid
    pub fn from_settings(settings: &Settings) -> Self {
        let mut options = Self::default();

        if let Some(list) = settings.get_int_list(DASHBOARD_TIMEFRAMES) {
            let timeframes: Vec<Timeframe> = list
                .iter()
                .filter_map(|m| u32::try_from(*m).ok())
                .filter_map(|m| Timeframe::new(m).ok())
                .collect();
            if timeframes.len() == list.len() && !timeframes.is_empty() {
                options.timeframes = timeframes;
            } else {
                warn!(?list, "invalid dashboard.timeframes, using defaults");
            }
        }
        if let Some(width) = settings.get_int(DASHBOARD_FRACTAL_WIDTH) {
            match usize::try_from(width) {
                Ok(width) if width > 0 => options.fractal_width = width,
                _ => warn!(width, "invalid dashboard.fractal_width, using default"),
            }
        }
        if let Some(min_bars) = settings.get_int(DASHBOARD_MIN_BARS).and_then(|v| usize::try_from(v).ok()) {
            options.min_bars = min_bars;
        }

        options
    }

    /// Classifier for these options. A fractal width of zero is rejected.
    pub fn classifier(&self) -> Result<TrendClassifier, ConfigError> {
        let detector = SwingDetector::new(self.fractal_width)?;
        Ok(TrendClassifier::new(detector, self.min_bars))
    }
}

/// Timeframes of the dashboard as configured in the global settings
pub fn default_timeframes() -> Vec<Timeframe> {
    DashboardOptions::from_settings(&SETTINGS).timeframes
}

/// One dashboard tile
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_close: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<PriceDirection>,
    pub trends: Vec<TimeframeTrend>,
}

impl MarketSummary {
    /// Summarize a 1-minute series over `timeframes` with the default
    /// fractal width and minimum length
    pub fn build(symbol: &str, bars: &[Bar], timeframes: &[Timeframe]) -> Self {
        let classifier = TrendClassifier::new(SwingDetector::default(), DEFAULT_MIN_BARS);
        Self::summarize(symbol, bars, timeframes, &classifier)
    }

    /// Summarize a 1-minute series with explicit options
    pub fn build_with(symbol: &str, bars: &[Bar], options: &DashboardOptions) -> Result<Self, ConfigError> {
        let classifier = options.classifier()?;
        Ok(Self::summarize(symbol, bars, &options.timeframes, &classifier))
    }

    /// Timeframes are classified in parallel, each on its own resampled copy
    fn summarize(symbol: &str, bars: &[Bar], timeframes: &[Timeframe], classifier: &TrendClassifier) -> Self {
        let trends: Vec<TimeframeTrend> = timeframes
            .par_iter()
            .map(|timeframe| {
                let resampled = aggregate(bars, *timeframe);
                TimeframeTrend {
                    timeframe: *timeframe,
                    trend: classifier.classify_bars(&resampled),
                }
            })
            .collect();

        let last_close = bars.last().map(|bar| bar.close);
        let direction = match bars {
            [.., previous, last] => Some(if last.close >= previous.close {
                PriceDirection::Up
            } else {
                PriceDirection::Down
            }),
            _ => None,
        };

        debug!(symbol, bars = bars.len(), timeframes = trends.len(), "built market summary");

        Self {
            symbol: symbol.to_string(),
            last_close,
            direction,
            trends,
        }
    }

    /// Trend for one timeframe, if it was requested
    pub fn trend(&self, timeframe: Timeframe) -> Option<TrendLabel> {
        self.trends
            .iter()
            .find(|t| t.timeframe == timeframe)
            .map(|t| t.trend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setting::SettingValue;
    use std::f64::consts::PI;

    fn tf(minutes: u32) -> Timeframe {
        Timeframe::new(minutes).unwrap()
    }

    /// Oscillating series with a linear drift per bar
    fn drifting_wave(drift: f64, len: i64) -> Vec<Bar> {
        (0..len)
            .map(|i| {
                let mid = 100.0 + drift * i as f64 + (2.0 * PI * i as f64 / 24.0).sin();
                Bar::new(i * 60, mid, mid + 0.001, mid - 0.001, mid)
            })
            .collect()
    }

    #[test]
    fn test_trends_per_timeframe() {
        let timeframes = [tf(1), tf(240)];

        let up = MarketSummary::build("EURUSD", &drifting_wave(0.02, 240), &timeframes);
        assert_eq!(up.trend(tf(1)), Some(TrendLabel::Up));
        // One 4-hour bar is below the minimum length
        assert_eq!(up.trend(tf(240)), Some(TrendLabel::Flat));
        assert_eq!(up.trend(tf(15)), None);

        let down = MarketSummary::build("EURUSD", &drifting_wave(-0.02, 240), &timeframes);
        assert_eq!(down.trend(tf(1)), Some(TrendLabel::Down));
    }

    #[test]
    fn test_trend_order_follows_request() {
        let timeframes = [tf(60), tf(1), tf(15)];
        let summary = MarketSummary::build("USDJPY", &drifting_wave(0.01, 120), &timeframes);
        let order: Vec<Timeframe> = summary.trends.iter().map(|t| t.timeframe).collect();
        assert_eq!(order, timeframes.to_vec());
    }

    #[test]
    fn test_price_direction() {
        let bars = vec![Bar::new(0, 1.0, 1.0, 1.0, 1.2), Bar::new(60, 1.2, 1.2, 1.2, 1.2)];
        let summary = MarketSummary::build("EURUSD", &bars, &[tf(1)]);
        assert_eq!(summary.last_close, Some(1.2));
        assert_eq!(summary.direction, Some(PriceDirection::Up));

        let bars = vec![Bar::new(0, 1.0, 1.0, 1.0, 1.2), Bar::new(60, 1.2, 1.2, 1.1, 1.1)];
        let summary = MarketSummary::build("EURUSD", &bars, &[tf(1)]);
        assert_eq!(summary.direction, Some(PriceDirection::Down));
    }

    #[test]
    fn test_empty_series() {
        let summary = MarketSummary::build("EURUSD", &[], &DashboardOptions::default().timeframes);
        assert_eq!(summary.last_close, None);
        assert_eq!(summary.direction, None);
        assert_eq!(summary.trends.len(), 5);
        assert!(summary.trends.iter().all(|t| t.trend == TrendLabel::Flat));
    }

    #[test]
    fn test_options_from_settings() {
        let settings = Settings::with_defaults();
        let options = DashboardOptions::from_settings(&settings);
        assert_eq!(options.timeframes.len(), 5);
        assert_eq!(options.fractal_width, 5);
        assert_eq!(options.min_bars, 10);

        settings.set(DASHBOARD_TIMEFRAMES, SettingValue::IntList(vec![1, 0]));
        settings.set(DASHBOARD_FRACTAL_WIDTH, SettingValue::Int(3));
        let options = DashboardOptions::from_settings(&settings);
        assert_eq!(options.timeframes, DashboardOptions::default().timeframes);
        assert_eq!(options.fractal_width, 3);
    }

    #[test]
    fn test_zero_fractal_width_rejected() {
        let options = DashboardOptions {
            fractal_width: 0,
            ..DashboardOptions::default()
        };
        let result = MarketSummary::build_with("EURUSD", &drifting_wave(0.02, 240), &options);
        assert!(matches!(result, Err(ConfigError::InvalidFractalWidth(0))));
    }

    #[test]
    fn test_build_with_matches_build_on_defaults() {
        let bars = drifting_wave(0.02, 240);
        let options = DashboardOptions::default();
        let summary = MarketSummary::build_with("EURUSD", &bars, &options).unwrap();
        assert_eq!(summary, MarketSummary::build("EURUSD", &bars, &options.timeframes));
    }
}
