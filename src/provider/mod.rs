//! Upstream data-source boundary.
//!
//! This module defines the [`HistoryProvider`] trait that the orchestrator
//! fetches through, plus the Yahoo Finance implementation.

pub mod yahoo;

mod traits;

pub use traits::HistoryProvider;
pub use yahoo::YahooProvider;
