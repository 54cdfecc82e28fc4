//! Histoquote
//!
//! Historical daily price acquisition for instruments identified by a public
//! quote-page URL.
//!
//! # Overview
//!
//! The crate covers the full acquisition pipeline:
//! - Symbol extraction from free-form quote-page URLs
//! - Fetching full daily history from a rate-limited upstream source
//! - A cooldown gate that suppresses requests after an upstream throttle
//! - A per-symbol in-memory result cache with time-based expiry
//! - Normalization of heterogeneous payloads into a fixed 7-column table
//! - CSV and formatted-spreadsheet export of the canonical table
//!
//! # Architecture
//!
//! ```text
//! +-------------+     +------------------+
//! |  quote URL  | --> |     Symbol       |  (extraction, no network)
//! +-------------+     +------------------+
//!                              |
//!                              v
//!                     +------------------+
//!                     |  HistoryService  |  (gate check, cache lookup)
//!                     +------------------+
//!                              |
//!                              v
//!                     +------------------+
//!                     | HistoryProvider  |  (Yahoo chart API)
//!                     +------------------+
//!                              |
//!                              v
//!                     +------------------+
//!                     |  PriceHistory    |  (canonical 7-column table)
//!                     +------------------+
//!                              |
//!                              v
//!                     +------------------+
//!                     |  CSV / XLSX      |  (export bytes)
//!                     +------------------+
//! ```
//!
//! Control flow is strictly linear per request; the cache and gate are the
//! only shared mutable state and both live for the process lifetime. All
//! time-based transitions are evaluated lazily with an injected clock, never
//! by timers.
//!
//! # Core Types
//!
//! - [`Symbol`] - uppercase instrument token extracted from a quote-page URL
//! - [`PriceHistory`] / [`DailyBar`] - the canonical daily series
//! - [`HistoryService`] - the acquisition orchestrator
//! - [`HistoryProvider`] - the upstream data-source boundary
//! - [`AcquisitionError`] - the fixed outcome taxonomy

pub mod acquire;
pub mod cache;
pub mod config;
pub mod errors;
pub mod export;
pub mod gate;
pub mod models;
pub mod normalize;
pub mod provider;

// Re-export the types most callers need.
pub use acquire::HistoryService;
pub use cache::HistoryCache;
pub use config::AcquireConfig;
pub use errors::{AcquisitionError, ExportError, FetchError};
pub use export::{csv_filename, to_csv, to_xlsx, xlsx_filename, CSV_MIME, XLSX_MIME};
pub use gate::{CooldownGate, GateDecision};
pub use models::{DailyBar, PriceHistory, RawBar, RawHistory, Symbol, COLUMNS};
pub use normalize::normalize;
pub use provider::{HistoryProvider, YahooProvider};
