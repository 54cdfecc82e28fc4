//! Yahoo Finance historical data provider.
//!
//! Fetches the full available daily history through the v8 chart API
//! (`range=max&interval=1d`). No authentication is required for chart data;
//! requests carry a browser user agent and a bounded timeout so a hung
//! connection cannot stall the whole request.

mod models;

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{header, StatusCode};
use urlencoding::encode;

use crate::config::AcquireConfig;
use crate::errors::FetchError;
use crate::models::{RawBar, RawHistory, Symbol};
use crate::provider::HistoryProvider;

use models::{ChartResponse, ChartResult};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Yahoo Finance provider for full daily histories.
pub struct YahooProvider {
    client: reqwest::Client,
}

impl YahooProvider {
    /// Create a provider with the default 30-second request timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a provider with the request timeout from an [`AcquireConfig`].
    pub fn from_config(config: &AcquireConfig) -> Result<Self, FetchError> {
        Self::with_timeout(config.request_timeout())
    }

    /// Create a provider with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Network)?;
        Ok(Self { client })
    }

    fn chart_url(symbol: &Symbol) -> String {
        format!(
            "{}/{}?range=max&interval=1d&includeAdjustedClose=true",
            CHART_URL,
            encode(symbol.as_str())
        )
    }

    /// Flatten the chart result's parallel arrays into raw bars.
    ///
    /// Array lengths occasionally disagree in Yahoo responses; indexing is
    /// positional with missing positions treated as absent values.
    fn to_raw_history(result: ChartResult) -> RawHistory {
        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
        let adjclose = result.indicators.adjclose.into_iter().next().unwrap_or_default();

        let bars = result
            .timestamp
            .iter()
            .enumerate()
            .map(|(i, &timestamp)| RawBar {
                timestamp,
                open: quote.open.get(i).copied().flatten(),
                high: quote.high.get(i).copied().flatten(),
                low: quote.low.get(i).copied().flatten(),
                close: quote.close.get(i).copied().flatten(),
                adj_close: adjclose.adjclose.get(i).copied().flatten(),
                volume: quote.volume.get(i).cloned().flatten(),
            })
            .collect();

        RawHistory {
            utc_offset_secs: result.meta.gmtoffset,
            bars,
        }
    }
}

#[async_trait]
impl HistoryProvider for YahooProvider {
    fn id(&self) -> &'static str {
        "YAHOO"
    }

    async fn fetch_full_history(&self, symbol: &Symbol) -> Result<RawHistory, FetchError> {
        debug!("Fetching full history for {} from Yahoo", symbol);

        let response = self
            .client
            .get(Self::chart_url(symbol))
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            warn!("Yahoo rate limited the history request for {}", symbol);
            return Err(FetchError::RateLimited);
        }

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::SymbolNotFound(symbol.to_string()));
        }

        if !response.status().is_success() {
            return Err(FetchError::Upstream {
                message: format!("unexpected HTTP status {}", response.status()),
            });
        }

        let data: ChartResponse = response.json().await.map_err(|e| FetchError::Upstream {
            message: format!("failed to parse chart response: {}", e),
        })?;

        if let Some(error) = data.chart.error {
            return if error.code.eq_ignore_ascii_case("not found") {
                Err(FetchError::SymbolNotFound(symbol.to_string()))
            } else {
                Err(FetchError::Upstream {
                    message: format!("{}: {}", error.code, error.description),
                })
            };
        }

        let result = data
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| FetchError::SymbolNotFound(symbol.to_string()))?;

        Ok(Self::to_raw_history(result))
    }
}
