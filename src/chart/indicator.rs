//! Technical indicators for charting.
//!
//! Every indicator is built once from validated parameters and then computes
//! a fresh, index-aligned output on each call. Moving averages keep a `ta`
//! prototype that is cloned per pass, so two passes never share state.

use ta::indicators::{ExponentialMovingAverage, SimpleMovingAverage};
use ta::Next;

use super::base::{to_points, BandPoint, HistogramPoint, IndicatorPoint};
use crate::data::Bar;
use crate::error::ConfigError;

/// Substituted for a zero loss sum so RSI stays strictly below 100
pub const RSI_EPSILON: f64 = 0.001;

/// Base trait for all indicators
pub trait Indicator: Send + Sync {
    type Output;

    /// Get indicator name
    fn name(&self) -> &str;

    /// Number of leading bars without a value
    fn warmup(&self) -> usize;

    /// Calculate indicator values for given bar data
    fn calculate(&self, bars: &[Bar]) -> Self::Output;
}

fn require_period(name: &'static str, period: usize) -> Result<(), ConfigError> {
    if period == 0 {
        return Err(ConfigError::InvalidPeriod { name, value: period });
    }
    Ok(())
}

fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|bar| bar.close).collect()
}

/// Simple Moving Average (SMA)
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
    prototype: SimpleMovingAverage,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, ConfigError> {
        require_period("sma", period)?;
        let prototype = SimpleMovingAverage::new(period)
            .map_err(|_| ConfigError::InvalidPeriod { name: "sma", value: period })?;
        Ok(Self {
            period,
            name: format!("SMA{}", period),
            prototype,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Raw values over a close series
    pub fn values(&self, source: &[f64]) -> Vec<Option<f64>> {
        let mut sma = self.prototype.clone();
        source
            .iter()
            .enumerate()
            .map(|(i, close)| {
                let value = sma.next(*close);
                (i + 1 >= self.period).then_some(value)
            })
            .collect()
    }
}

impl Indicator for Sma {
    type Output = Vec<IndicatorPoint>;

    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.period - 1
    }

    fn calculate(&self, bars: &[Bar]) -> Vec<IndicatorPoint> {
        to_points(bars, &self.values(&closes(bars)))
    }
}

/// Exponential Moving Average (EMA), seeded with the first sample
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
    prototype: ExponentialMovingAverage,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, ConfigError> {
        require_period("ema", period)?;
        let prototype = ExponentialMovingAverage::new(period)
            .map_err(|_| ConfigError::InvalidPeriod { name: "ema", value: period })?;
        Ok(Self {
            period,
            name: format!("EMA{}", period),
            prototype,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// EMA over a dense series
    pub fn values(&self, source: &[f64]) -> Vec<f64> {
        let mut ema = self.prototype.clone();
        source.iter().map(|value| ema.next(*value)).collect()
    }

    /// EMA over a series with gaps.
    ///
    /// An absent sample carries the previous EMA forward unchanged. Points
    /// before the first present sample stay absent.
    pub fn apply(&self, source: &[Option<f64>]) -> Vec<Option<f64>> {
        let mut ema = self.prototype.clone();
        let mut last = None;
        source
            .iter()
            .map(|sample| {
                if let Some(value) = sample {
                    last = Some(ema.next(*value));
                }
                last
            })
            .collect()
    }
}

impl Indicator for Ema {
    type Output = Vec<IndicatorPoint>;

    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        0
    }

    fn calculate(&self, bars: &[Bar]) -> Vec<IndicatorPoint> {
        bars.iter()
            .zip(self.values(&closes(bars)))
            .map(|(bar, value)| IndicatorPoint::new(bar.time, value))
            .collect()
    }
}

/// Bollinger Bands (BOLL) with population variance
#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    deviation: f64,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, deviation: f64) -> Result<Self, ConfigError> {
        require_period("bollinger", period)?;
        if !deviation.is_finite() || deviation < 0.0 {
            return Err(ConfigError::InvalidDeviation(deviation));
        }
        Ok(Self {
            period,
            deviation,
            name: format!("BOLL({},{})", period, deviation),
        })
    }
}

impl Indicator for Bollinger {
    type Output = Vec<BandPoint>;

    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.period - 1
    }

    fn calculate(&self, bars: &[Bar]) -> Vec<BandPoint> {
        let n = self.period as f64;
        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                if i + 1 < self.period {
                    return BandPoint::absent(bar.time);
                }

                let window = &bars[i + 1 - self.period..=i];
                let (sum, sum_sq) = window
                    .iter()
                    .fold((0.0, 0.0), |(s, sq), b| (s + b.close, sq + b.close * b.close));
                let avg = sum / n;
                // Cancellation can push the variance slightly below zero
                let std = (sum_sq / n - avg * avg).max(0.0).sqrt();

                BandPoint {
                    time: bar.time,
                    upper: Some(avg + self.deviation * std),
                    middle: Some(avg),
                    lower: Some(avg - self.deviation * std),
                }
            })
            .collect()
    }
}

/// Relative Strength Index over a simple rolling window of price changes.
///
/// Gains and losses are plain sums over the last `period` changes, not
/// Wilder-smoothed averages.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, ConfigError> {
        require_period("rsi", period)?;
        Ok(Self {
            period,
            name: format!("RSI{}", period),
        })
    }
}

impl Indicator for Rsi {
    type Output = Vec<IndicatorPoint>;

    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Vec<IndicatorPoint> {
        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                if i < self.period {
                    return IndicatorPoint::absent(bar.time);
                }

                let (gain, loss) = (i + 1 - self.period..=i).fold((0.0, 0.0), |(gain, loss), j| {
                    let diff = bars[j].close - bars[j - 1].close;
                    if diff >= 0.0 {
                        (gain + diff, loss)
                    } else {
                        (gain, loss - diff)
                    }
                });
                let loss = if loss == 0.0 { RSI_EPSILON } else { loss };
                let rs = gain / loss;

                IndicatorPoint::new(bar.time, 100.0 - 100.0 / (1.0 + rs))
            })
            .collect()
    }
}

/// MACD line, signal line and histogram, index-aligned with the bars
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MacdOutput {
    pub macd: Vec<IndicatorPoint>,
    pub signal: Vec<IndicatorPoint>,
    pub histogram: Vec<HistogramPoint>,
}

/// Moving Average Convergence Divergence
#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self, ConfigError> {
        require_period("macd fast", fast)?;
        require_period("macd slow", slow)?;
        require_period("macd signal", signal)?;
        Ok(Self {
            fast: Ema::new(fast)?,
            slow: Ema::new(slow)?,
            signal: Ema::new(signal)?,
            name: format!("MACD({},{},{})", fast, slow, signal),
        })
    }
}

impl Indicator for Macd {
    type Output = MacdOutput;

    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        0
    }

    fn calculate(&self, bars: &[Bar]) -> MacdOutput {
        let source = closes(bars);
        let fast = self.fast.values(&source);
        let slow = self.slow.values(&source);

        let macd_line: Vec<Option<f64>> = fast
            .iter()
            .zip(&slow)
            .map(|(f, s)| Some(f - s))
            .collect();
        let signal_line = self.signal.apply(&macd_line);

        let histogram = bars
            .iter()
            .zip(macd_line.iter().zip(&signal_line))
            .map(|(bar, (macd, signal))| {
                let value = match (macd, signal) {
                    (Some(m), Some(s)) => Some(m - s),
                    _ => None,
                };
                HistogramPoint::new(bar.time, value)
            })
            .collect();

        MacdOutput {
            macd: to_points(bars, &macd_line),
            signal: to_points(bars, &signal_line),
            histogram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::base::HistogramSign;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EPS: f64 = 1e-9;

    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| Bar::new(i as i64 * 60, *c, *c, *c, *c))
            .collect()
    }

    fn random_walk(seed: u64, len: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut price = 100.0;
        (0..len)
            .map(|_| {
                price += rng.random_range(-1.0..1.0);
                price
            })
            .collect()
    }

    #[test]
    fn test_constructors_reject_zero_period() {
        assert!(Sma::new(0).is_err());
        assert!(Ema::new(0).is_err());
        assert!(Bollinger::new(0, 2.0).is_err());
        assert!(Bollinger::new(20, -1.0).is_err());
        assert!(Rsi::new(0).is_err());
        assert!(Macd::new(12, 0, 9).is_err());
    }

    #[test]
    fn test_sma_warmup_and_mean() {
        let closes = random_walk(7, 60);
        let bars = bars_from_closes(&closes);
        let sma = Sma::new(5).unwrap();
        let points = sma.calculate(&bars);

        assert_eq!(points.len(), bars.len());
        assert_eq!(sma.warmup(), 4);
        for (i, point) in points.iter().enumerate() {
            assert_eq!(point.time, bars[i].time);
            if i < 4 {
                assert!(point.is_absent());
            } else {
                let mean = closes[i - 4..=i].iter().sum::<f64>() / 5.0;
                assert!((point.value.unwrap() - mean).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_sma_short_series_all_absent() {
        let bars = bars_from_closes(&[1.0, 2.0]);
        let points = Sma::new(20).unwrap().calculate(&bars);
        assert!(points.iter().all(IndicatorPoint::is_absent));
        assert!(Sma::new(20).unwrap().calculate(&[]).is_empty());
    }

    #[test]
    fn test_ema_recurrence() {
        let closes = [10.0, 11.0, 12.0, 11.5];
        let ema = Ema::new(3).unwrap();
        let values = ema.values(&closes);

        let k = 2.0 / 4.0;
        let mut expected = closes[0];
        assert!((values[0] - expected).abs() < EPS);
        for i in 1..closes.len() {
            expected = closes[i] * k + expected * (1.0 - k);
            assert!((values[i] - expected).abs() < EPS);
        }
        assert_eq!(ema.name(), "EMA3");
    }

    #[test]
    fn test_ema_carries_forward_over_gaps() {
        let ema = Ema::new(3).unwrap();
        let out = ema.apply(&[None, Some(4.0), None, Some(6.0)]);
        assert_eq!(out[0], None);
        assert_eq!(out[1], Some(4.0));
        assert_eq!(out[2], Some(4.0));
        assert!((out[3].unwrap() - 5.0).abs() < EPS);
    }

    #[test]
    fn test_ema_no_state_leak_between_passes() {
        let closes = random_walk(11, 80);
        let mut bars = bars_from_closes(&closes);
        let ema = Ema::new(12).unwrap();
        let first = ema.calculate(&bars);

        let copy = bars[40];
        bars[40] = Bar::new(copy.time, copy.open, copy.high, copy.low, copy.close);
        let second = ema.calculate(&bars);
        assert_eq!(first, second);
    }

    #[test]
    fn test_bollinger_known_values() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0, 4.0]);
        let points = Bollinger::new(2, 2.0).unwrap().calculate(&bars);

        assert_eq!(points[0], BandPoint::absent(0));
        let p = points[1];
        assert!((p.middle.unwrap() - 1.5).abs() < EPS);
        assert!((p.upper.unwrap() - 2.5).abs() < EPS);
        assert!((p.lower.unwrap() - 0.5).abs() < EPS);
    }

    #[test]
    fn test_bollinger_flat_series_has_zero_width() {
        let bars = bars_from_closes(&[1.1; 30]);
        let points = Bollinger::new(20, 2.0).unwrap().calculate(&bars);
        for p in &points[19..] {
            let (upper, middle, lower) = (p.upper.unwrap(), p.middle.unwrap(), p.lower.unwrap());
            assert!(upper >= middle && middle >= lower);
            assert!((upper - lower).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rsi_scenario() {
        let bars = bars_from_closes(&[1.0, 2.0, 1.0, 3.0]);
        let points = Rsi::new(2).unwrap().calculate(&bars);

        assert!(points[0].is_absent());
        assert!(points[1].is_absent());
        assert!((points[2].value.unwrap() - 50.0).abs() < EPS);
        // Changes -1, +2 over the window: RS = 2
        assert!((points[3].value.unwrap() - 200.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn test_rsi_zero_loss_stays_below_100() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0, 4.0]);
        let points = Rsi::new(2).unwrap().calculate(&bars);
        let value = points[3].value.unwrap();
        assert!(value > 99.9);
        assert!(value < 100.0);
    }

    #[test]
    fn test_rsi_bounded_on_random_walks() {
        for seed in 0..20 {
            let bars = bars_from_closes(&random_walk(seed, 200));
            for point in Rsi::new(14).unwrap().calculate(&bars) {
                if let Some(value) = point.value {
                    assert!((0.0..=100.0).contains(&value), "rsi out of range: {value}");
                }
            }
        }
    }

    #[test]
    fn test_macd_histogram_and_sign() {
        let bars = bars_from_closes(&random_walk(3, 120));
        let output = Macd::new(12, 26, 9).unwrap().calculate(&bars);

        assert_eq!(output.macd.len(), bars.len());
        for i in 0..bars.len() {
            let macd = output.macd[i].value.unwrap();
            let signal = output.signal[i].value.unwrap();
            let hist = output.histogram[i];
            assert!((hist.value.unwrap() - (macd - signal)).abs() < EPS);
            let expected = if macd - signal >= 0.0 {
                HistogramSign::Positive
            } else {
                HistogramSign::Negative
            };
            assert_eq!(hist.sign, expected);
        }
    }

    #[test]
    fn test_two_macd_instances_are_independent() {
        let bars = bars_from_closes(&random_walk(5, 150));
        let primary = Macd::new(12, 26, 9).unwrap();
        let secondary = Macd::new(19, 39, 9).unwrap();

        let alone = primary.calculate(&bars);
        let _ = secondary.calculate(&bars);
        let again = primary.calculate(&bars);

        assert_eq!(alone, again);
        assert_ne!(alone.macd, secondary.calculate(&bars).macd);
    }
}
