//! Wire models for the Yahoo Finance v8 chart API.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(super) struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub(super) struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChartError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChartResult {
    #[serde(default)]
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ChartMeta {
    /// Exchange timezone offset from UTC, in seconds.
    #[serde(default)]
    pub gmtoffset: i32,
}

#[derive(Debug, Deserialize)]
pub(super) struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteBlock>,
    #[serde(default)]
    pub adjclose: Vec<AdjCloseBlock>,
}

/// Parallel arrays aligned with `ChartResult::timestamp`.
///
/// Volume is kept as raw JSON: the upstream usually sends integers or nulls,
/// but the normalizer owns the decision of what counts as numeric.
#[derive(Debug, Default, Deserialize)]
pub(super) struct QuoteBlock {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct AdjCloseBlock {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}
