//! Raw upstream payloads and the canonical daily series.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::symbol::Symbol;

/// The fixed canonical column names, in output order.
pub const COLUMNS: [&str; 7] = ["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"];

/// One daily record as the upstream returned it.
///
/// Any subset of the fields may be present; prices may be missing and the
/// volume may be any JSON value (number, numeric string, or junk). Only the
/// normalizer ever consumes these.
#[derive(Clone, Debug, Default)]
pub struct RawBar {
    /// Unix timestamp in seconds, UTC.
    pub timestamp: i64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<Value>,
}

/// Opaque upstream payload: the bars plus the exchange's UTC offset.
///
/// Ephemeral; exists only between a fetch call and normalization.
#[derive(Clone, Debug, Default)]
pub struct RawHistory {
    /// Offset of the exchange timezone from UTC, in seconds.
    pub utc_offset_secs: i32,
    pub bars: Vec<RawBar>,
}

/// One normalized daily record.
///
/// `volume` is guaranteed numeric; `open` is `None` when the upstream did not
/// report it (unknown, never a computed value); `adj_close` is synthesized
/// from `close` when the upstream omits it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    /// Timezone-naive calendar date.
    pub date: NaiveDate,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
    pub adj_close: Option<Decimal>,
    pub volume: u64,
}

/// The canonical table: daily bars sorted ascending by date, no duplicate
/// dates, fixed 7-column shape (see [`COLUMNS`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub symbol: Symbol,
    pub bars: Vec<DailyBar>,
}

impl PriceHistory {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
