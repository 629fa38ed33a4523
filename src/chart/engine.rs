//! One stateless indicator pass per configuration.

use serde::Serialize;
use tracing::debug;

use super::base::{BandPoint, IndicatorPoint};
use super::indicator::{Bollinger, Indicator, Macd, MacdOutput, Rsi, Sma};
use super::swing::{SwingDetector, SwingOutput};
use crate::config::{EngineConfig, MacdOption, PeriodOption};
use crate::data::{Bar, Timeframe};
use crate::error::ConfigError;

/// Everything computed for one resampled series.
///
/// Disabled options are `None` and left out of the serialized document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOutput {
    pub timeframe: Timeframe,
    pub bars: Vec<Bar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_fast: Option<Vec<IndicatorPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_slow: Option<Vec<IndicatorPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger: Option<Vec<BandPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<Vec<IndicatorPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_primary: Option<MacdOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_secondary: Option<MacdOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swings: Option<SwingOutput>,
}

/// Indicator set built from a validated [`EngineConfig`]
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    config: EngineConfig,
    timeframe: Timeframe,
    sma_fast: Option<Sma>,
    sma_slow: Option<Sma>,
    bollinger: Option<Bollinger>,
    rsi: Option<Rsi>,
    macd_primary: Option<Macd>,
    macd_secondary: Option<Macd>,
    swings: Option<SwingDetector>,
}

fn build_sma(option: &PeriodOption) -> Result<Option<Sma>, ConfigError> {
    option.enabled.then(|| Sma::new(option.period)).transpose()
}

fn build_macd(option: &MacdOption) -> Result<Option<Macd>, ConfigError> {
    option
        .enabled
        .then(|| Macd::new(option.fast, option.slow, option.signal))
        .transpose()
}

fn run<I: Indicator>(indicator: &Option<I>, bars: &[Bar]) -> Option<I::Output> {
    indicator.as_ref().map(|i| {
        debug!(indicator = i.name(), bars = bars.len(), "computing");
        i.calculate(bars)
    })
}

impl IndicatorEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let bollinger = config
            .bollinger
            .enabled
            .then(|| Bollinger::new(config.bollinger.period, config.bollinger.deviation))
            .transpose()?;
        let rsi = config.rsi.enabled.then(|| Rsi::new(config.rsi.period)).transpose()?;
        let swings = config
            .swings
            .enabled
            .then(|| SwingDetector::new(config.swings.fractal_width))
            .transpose()?;

        Ok(Self {
            timeframe: config.timeframe()?,
            sma_fast: build_sma(&config.sma_fast)?,
            sma_slow: build_sma(&config.sma_slow)?,
            bollinger,
            rsi,
            macd_primary: build_macd(&config.macd_primary)?,
            macd_secondary: build_macd(&config.macd_secondary)?,
            swings,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Timeframe the engine's input is resampled to
    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Longest warm-up among the enabled options, in resampled bars.
    /// A series no longer than this has no value in at least one output.
    pub fn warmup(&self) -> usize {
        [
            self.sma_fast.as_ref().map(|i| i.warmup()),
            self.sma_slow.as_ref().map(|i| i.warmup()),
            self.bollinger.as_ref().map(|i| i.warmup()),
            self.rsi.as_ref().map(|i| i.warmup()),
            self.macd_primary.as_ref().map(|i| i.warmup()),
            self.macd_secondary.as_ref().map(|i| i.warmup()),
            self.swings.as_ref().map(|i| i.warmup()),
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0)
    }

    /// Compute every enabled option over `bars`
    pub fn compute(&self, bars: &[Bar]) -> ChartOutput {
        ChartOutput {
            timeframe: self.timeframe,
            bars: bars.to_vec(),
            sma_fast: run(&self.sma_fast, bars),
            sma_slow: run(&self.sma_slow, bars),
            bollinger: run(&self.bollinger, bars),
            rsi: run(&self.rsi, bars),
            macd_primary: run(&self.macd_primary, bars),
            macd_secondary: run(&self.macd_secondary, bars),
            swings: run(&self.swings, bars),
        }
    }
}
