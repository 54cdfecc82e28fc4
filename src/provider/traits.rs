//! Upstream provider trait definition.

use async_trait::async_trait;

use crate::errors::FetchError;
use crate::models::{RawHistory, Symbol};

/// An upstream source of historical daily price data.
///
/// Implementations must distinguish a rate-limit condition
/// ([`FetchError::RateLimited`]) from every other failure, because the
/// orchestrator's cooldown gate reacts only to the former.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs.
    fn id(&self) -> &'static str;

    /// Fetch the full available daily history for a symbol.
    ///
    /// Returns the raw, unnormalized payload; bars should be ordered by
    /// timestamp ascending but the normalizer does not rely on it.
    async fn fetch_full_history(&self, symbol: &Symbol) -> Result<RawHistory, FetchError>;
}
