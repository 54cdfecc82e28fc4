//! Error types for the acquisition pipeline.
//!
//! This module provides:
//! - [`AcquisitionError`]: the public error taxonomy returned by the orchestrator
//! - [`FetchError`]: the upstream-boundary error signal raised by providers
//! - [`ExportError`]: failures while serializing the canonical table

use std::time::Duration;

use thiserror::Error;

/// Errors returned to callers of the acquisition pipeline.
///
/// Every variant is terminal for the current request: there are no automatic
/// retries and no partial results. The only automatic recovery is the cooldown
/// gate's lazy time-based reopening.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// The input does not match the expected quote-page URL pattern.
    /// The user must correct the input; retrying the same string won't help.
    #[error("invalid URL format: expected a quote-page URL like https://finance.yahoo.com/quote/TSLA/history, got '{0}'")]
    InvalidUrlFormat(String),

    /// The cooldown gate denied the request, or the upstream just signaled
    /// throttling. The caller should wait `remaining` before trying again.
    #[error("rate limited by the upstream data source, retry in {}s", remaining.as_secs())]
    RateLimited {
        /// Time left until the cooldown window elapses.
        remaining: Duration,
    },

    /// Any other upstream or network failure, surfaced with its cause.
    /// Not retried automatically; the user may retry manually.
    #[error("failed to fetch historical data: {message}")]
    FetchFailed {
        /// The underlying cause, in human-readable form.
        message: String,
    },
}

/// Errors raised at the provider boundary.
///
/// The orchestrator needs to distinguish an upstream rate-limit condition
/// (which trips the cooldown gate) from every other failure (which does not),
/// so providers report through this enum rather than [`AcquisitionError`].
#[derive(Error, Debug)]
pub enum FetchError {
    /// The upstream throttled the request (HTTP 429).
    #[error("upstream rate limit reached")]
    RateLimited,

    /// The upstream does not know the requested symbol.
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    /// The upstream answered but the response was unusable.
    #[error("upstream error: {message}")]
    Upstream {
        /// The error message reported by the upstream.
        message: String,
    },

    /// A transport-level failure (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl FetchError {
    /// Whether this failure is the upstream's throttling signal.
    ///
    /// The orchestrator trips the cooldown gate exactly when this is true.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// Errors while serializing a canonical table to output bytes.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet serialization failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("I/O error while writing export bytes: {0}")]
    Io(#[from] std::io::Error),
}
