//! Normalization of raw bar records into [`Bar`]s.
//!
//! Records with an unparseable timestamp or a missing/zero price field are
//! dropped. A legitimate price of exactly zero is indistinguishable from a
//! missing one under this rule; the behaviour is kept for compatibility with
//! existing bar sources.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use super::object::{Bar, RawBar, RawTime};
use crate::error::EngineError;

/// Naive layouts accepted for text timestamps, interpreted as UTC
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Convert a raw timestamp to epoch seconds
pub fn parse_time(time: &RawTime) -> Option<i64> {
    match time {
        RawTime::Millis(ms) => {
            if !ms.is_finite() {
                return None;
            }
            let secs = (ms / 1000.0).floor();
            if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
                return None;
            }
            // Outside the calendar range chrono can represent
            DateTime::from_timestamp(secs as i64, 0).map(|dt| dt.timestamp())
        }
        RawTime::Text(text) => parse_text_time(text.trim()),
    }
}

fn parse_text_time(text: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp());
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

/// Missing, zero and NaN prices all count as absent
fn price(value: Option<f64>) -> Option<f64> {
    value.filter(|p| p.is_finite() && *p != 0.0)
}

/// Normalize one record, or `None` if it must be dropped
pub fn normalize_bar(raw: &RawBar) -> Option<Bar> {
    Some(Bar {
        time: parse_time(&raw.time)?,
        open: price(raw.open)?,
        high: price(raw.high)?,
        low: price(raw.low)?,
        close: price(raw.close)?,
    })
}

/// Normalize a batch of records. Output keeps input order; ordering and
/// deduplication are the job of [`crate::data::BarStore`].
pub fn normalize<I>(raw: I) -> Vec<Bar>
where
    I: IntoIterator<Item = RawBar>,
{
    let mut dropped = 0usize;
    let mut inverted = 0usize;
    let mut bars = Vec::new();

    for record in raw {
        match normalize_bar(&record) {
            Some(bar) => {
                if !bar.is_consistent() {
                    inverted += 1;
                }
                bars.push(bar);
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(dropped, kept = bars.len(), "dropped malformed bar records");
    }
    if inverted > 0 {
        warn!(inverted, "bars with prices outside their high/low range");
    }

    bars
}

/// Decode a JSON array of bar records and normalize it.
///
/// Only a document that is not a JSON array fails; individual records that do
/// not decode are dropped like any other malformed record.
pub fn parse_bars_json(json: &str) -> Result<Vec<Bar>, EngineError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let total = values.len();
    let raw: Vec<RawBar> = values
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();

    if raw.len() < total {
        debug!(undecodable = total - raw.len(), "skipped undecodable bar records");
    }

    Ok(normalize(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(time: RawTime, o: f64, h: f64, l: f64, c: f64) -> RawBar {
        RawBar {
            time,
            open: Some(o),
            high: Some(h),
            low: Some(l),
            close: Some(c),
        }
    }

    #[test]
    fn test_parse_time_formats() {
        let expected = 1743465600; // 2025-04-01T00:00:00Z
        assert_eq!(parse_time(&RawTime::Text("2025-04-01T00:00:00Z".into())), Some(expected));
        assert_eq!(parse_time(&RawTime::Text("2025-04-01T09:00:00+09:00".into())), Some(expected));
        assert_eq!(parse_time(&RawTime::Text("2025-04-01T00:00:00".into())), Some(expected));
        assert_eq!(parse_time(&RawTime::Text("2025-04-01 00:00:00".into())), Some(expected));
        assert_eq!(parse_time(&RawTime::Text("2025-04-01".into())), Some(expected));
        assert_eq!(parse_time(&RawTime::Millis(1743465600999.0)), Some(expected));
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert_eq!(parse_time(&RawTime::Text("not a date".into())), None);
        assert_eq!(parse_time(&RawTime::Millis(f64::NAN)), None);
        assert_eq!(parse_time(&RawTime::Millis(f64::INFINITY)), None);
    }

    #[test]
    fn test_parse_time_rejects_out_of_range_millis() {
        assert_eq!(parse_time(&RawTime::Millis(-9.22e21)), None);
        assert_eq!(parse_time(&RawTime::Millis(9.22e21)), None);
        assert_eq!(parse_time(&RawTime::Millis(-1e15)), Some(-1_000_000_000_000));
    }

    #[test]
    fn test_negative_millis_floor() {
        assert_eq!(parse_time(&RawTime::Millis(-1.0)), Some(-1));
    }

    #[test]
    fn test_normalize_drops_zero_and_missing_prices() {
        let mut missing = raw(RawTime::Millis(60_000.0), 1.0, 1.0, 1.0, 1.0);
        missing.close = None;

        let bars = normalize(vec![
            raw(RawTime::Millis(0.0), 1.0, 2.0, 0.5, 1.5),
            raw(RawTime::Millis(120_000.0), 0.0, 2.0, 0.5, 1.5),
            missing,
            raw(RawTime::Text("garbage".into()), 1.0, 2.0, 0.5, 1.5),
            raw(RawTime::Millis(180_000.0), 1.0, 2.0, 0.5, f64::NAN),
        ]);

        assert_eq!(bars, vec![Bar::new(0, 1.0, 2.0, 0.5, 1.5)]);
    }

    #[test]
    fn test_normalize_keeps_inverted_bars() {
        let bars = normalize(vec![raw(RawTime::Millis(0.0), 1.0, 0.9, 0.5, 0.7)]);
        assert_eq!(bars.len(), 1);
        assert!(!bars[0].is_consistent());
    }

    #[test]
    fn test_parse_bars_json() {
        let json = r#"[
            {"time": "2025-04-01T00:01:00Z", "open": 1.1, "high": 1.2, "low": 1.0, "close": 1.15},
            {"time": true, "open": 1.1, "high": 1.2, "low": 1.0, "close": 1.15},
            {"time": 1743465600000, "open": 1.1, "high": 1.3, "low": 1.05, "close": 1.2}
        ]"#;
        let bars = parse_bars_json(json).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].time, 1743465660);
        assert_eq!(bars[1].time, 1743465600);
    }

    #[test]
    fn test_parse_bars_json_rejects_non_array() {
        assert!(parse_bars_json(r#"{"time": 0}"#).is_err());
    }
}
