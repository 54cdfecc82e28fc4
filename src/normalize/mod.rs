//! Normalization of raw upstream payloads into the canonical table.
//!
//! Every step here is total: a malformed upstream payload is rejected by the
//! fetch call, never by the normalizer. The only data that disappears is
//! row-level — bars whose volume cannot be read as a number are dropped as an
//! intentional cleaning step, not an error path.

use chrono::{FixedOffset, TimeZone, Utc};
use log::debug;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::models::{DailyBar, PriceHistory, RawHistory, Symbol};

/// Normalize a raw upstream payload into the canonical 7-column table.
///
/// - A missing adjusted close is synthesized as a copy of the close.
/// - A missing open stays `None` (unknown), never a computed value.
/// - Bars with a non-numeric volume are dropped; all other bars keep their
///   relative order.
/// - Dates are the exchange-local calendar date with the offset discarded
///   (no timezone conversion beyond applying the reported offset).
/// - The output is explicitly sorted ascending by date, and duplicate dates
///   are collapsed keeping the last bar for each date.
pub fn normalize(symbol: Symbol, raw: &RawHistory) -> PriceHistory {
    let offset = FixedOffset::east_opt(raw.utc_offset_secs)
        .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));

    let mut bars: Vec<DailyBar> = Vec::with_capacity(raw.bars.len());
    let mut dropped = 0usize;

    for bar in &raw.bars {
        let Some(volume) = parse_volume(bar.volume.as_ref()) else {
            dropped += 1;
            continue;
        };
        let Some(timestamp) = Utc.timestamp_opt(bar.timestamp, 0).single() else {
            dropped += 1;
            continue;
        };

        let close = bar.close.and_then(Decimal::from_f64_retain);

        bars.push(DailyBar {
            date: timestamp.with_timezone(&offset).date_naive(),
            open: bar.open.and_then(Decimal::from_f64_retain),
            high: bar.high.and_then(Decimal::from_f64_retain),
            low: bar.low.and_then(Decimal::from_f64_retain),
            close,
            // Synthesized from close when the upstream omits it.
            adj_close: bar.adj_close.and_then(Decimal::from_f64_retain).or(close),
            volume,
        });
    }

    if dropped > 0 {
        debug!("Normalizer: dropped {} malformed bars for '{}'", dropped, symbol);
    }

    // Stable sort preserves upstream order within a date, so keep-last below
    // keeps the upstream's later row.
    bars.sort_by_key(|bar| bar.date);

    let mut deduped: Vec<DailyBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(previous) if previous.date == bar.date => *previous = bar,
            _ => deduped.push(bar),
        }
    }

    PriceHistory {
        symbol,
        bars: deduped,
    }
}

/// Read a volume as a non-negative integer, or `None` if it isn't numeric.
///
/// Accepts JSON numbers and numeric strings (integral floats included);
/// nulls, fractional values, and junk strings are rejected.
fn parse_volume(volume: Option<&Value>) -> Option<u64> {
    match volume? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0).map(|v| v as u64)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<u64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0)
                    .map(|v| v as u64)
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawBar;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn symbol() -> Symbol {
        Symbol::from_quote_url("https://finance.yahoo.com/quote/TSLA/history").unwrap()
    }

    /// 2024-01-02 00:00:00 UTC.
    const DAY: i64 = 1704153600;

    fn raw_bar(timestamp: i64, close: f64, volume: Value) -> RawBar {
        RawBar {
            timestamp,
            open: Some(close - 1.0),
            high: Some(close + 1.0),
            low: Some(close - 2.0),
            close: Some(close),
            adj_close: None,
            volume: Some(volume),
        }
    }

    #[test]
    fn test_adj_close_synthesized_from_close() {
        let raw = RawHistory {
            utc_offset_secs: 0,
            bars: vec![raw_bar(DAY, 100.0, json!(1000))],
        };
        let history = normalize(symbol(), &raw);

        assert_eq!(history.len(), 1);
        assert_eq!(history.bars[0].adj_close, history.bars[0].close);
        assert_eq!(history.bars[0].adj_close, Some(dec!(100)));
    }

    #[test]
    fn test_reported_adj_close_is_kept() {
        let mut bar = raw_bar(DAY, 100.0, json!(1000));
        bar.adj_close = Some(98.5);
        let raw = RawHistory {
            utc_offset_secs: 0,
            bars: vec![bar],
        };
        let history = normalize(symbol(), &raw);

        assert_eq!(history.bars[0].adj_close, Some(dec!(98.5)));
        assert_eq!(history.bars[0].close, Some(dec!(100)));
    }

    #[test]
    fn test_missing_open_stays_unknown() {
        let mut bar = raw_bar(DAY, 100.0, json!(1000));
        bar.open = None;
        let raw = RawHistory {
            utc_offset_secs: 0,
            bars: vec![bar],
        };
        let history = normalize(symbol(), &raw);

        assert_eq!(history.bars[0].open, None);
    }

    #[test]
    fn test_non_numeric_volume_drops_only_that_bar() {
        let mut absent_volume = raw_bar(DAY + 3 * 86400, 103.0, Value::Null);
        absent_volume.volume = None;
        let raw = RawHistory {
            utc_offset_secs: 0,
            bars: vec![
                raw_bar(DAY, 100.0, json!(1000)),
                raw_bar(DAY + 86400, 101.0, json!("N/A")),
                raw_bar(DAY + 2 * 86400, 102.0, json!("3000")),
                raw_bar(DAY + 3 * 86400, 104.0, Value::Null),
                absent_volume,
            ],
        };
        let history = normalize(symbol(), &raw);

        assert_eq!(history.len(), 2);
        assert_eq!(history.bars[0].volume, 1000);
        assert_eq!(history.bars[1].volume, 3000);
        assert_eq!(history.bars[0].close, Some(dec!(100)));
        assert_eq!(history.bars[1].close, Some(dec!(102)));
    }

    #[test]
    fn test_date_uses_exchange_offset_then_discards_it() {
        // 2024-01-02 02:00:00 UTC at UTC-5 is still 2024-01-01 locally.
        let raw = RawHistory {
            utc_offset_secs: -5 * 3600,
            bars: vec![raw_bar(DAY + 2 * 3600, 100.0, json!(1000))],
        };
        let history = normalize(symbol(), &raw);

        assert_eq!(
            history.bars[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_output_sorted_ascending() {
        let raw = RawHistory {
            utc_offset_secs: 0,
            bars: vec![
                raw_bar(DAY + 2 * 86400, 102.0, json!(3)),
                raw_bar(DAY, 100.0, json!(1)),
                raw_bar(DAY + 86400, 101.0, json!(2)),
            ],
        };
        let history = normalize(symbol(), &raw);

        let dates: Vec<_> = history.bars.iter().map(|b| b.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_duplicate_dates_keep_last() {
        let raw = RawHistory {
            utc_offset_secs: 0,
            bars: vec![
                raw_bar(DAY, 100.0, json!(1)),
                raw_bar(DAY + 3600, 105.0, json!(2)),
            ],
        };
        let history = normalize(symbol(), &raw);

        assert_eq!(history.len(), 1);
        assert_eq!(history.bars[0].close, Some(dec!(105)));
        assert_eq!(history.bars[0].volume, 2);
    }

    #[test]
    fn test_normalize_is_idempotent_on_clean_input() {
        let raw = RawHistory {
            utc_offset_secs: 0,
            bars: vec![
                raw_bar(DAY, 100.0, json!(1000)),
                raw_bar(DAY + 86400, 101.0, json!(2000)),
            ],
        };
        let once = normalize(symbol(), &raw);
        let twice = normalize(symbol(), &raw);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_parse_volume_accepts_numeric_forms() {
        assert_eq!(parse_volume(Some(&json!(1000))), Some(1000));
        assert_eq!(parse_volume(Some(&json!(1000.0))), Some(1000));
        assert_eq!(parse_volume(Some(&json!("1000"))), Some(1000));
        assert_eq!(parse_volume(Some(&json!(" 1000 "))), Some(1000));
    }

    #[test]
    fn test_parse_volume_rejects_junk() {
        assert_eq!(parse_volume(None), None);
        assert_eq!(parse_volume(Some(&Value::Null)), None);
        assert_eq!(parse_volume(Some(&json!("N/A"))), None);
        assert_eq!(parse_volume(Some(&json!(-5))), None);
        assert_eq!(parse_volume(Some(&json!(10.5))), None);
        assert_eq!(parse_volume(Some(&json!(true))), None);
    }
}
