//! In-memory result cache for normalized price histories.
//!
//! Memoizes one [`PriceHistory`] per symbol with a time-based expiry so the
//! orchestrator never issues two upstream fetches for the same symbol inside
//! one TTL window. This is a request-scoped optimization for a single
//! process, not a distributed cache; state resets on application restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::models::{PriceHistory, Symbol};

/// Default entry time-to-live.
const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// A stored history plus the instant it was stored.
///
/// Entries are superseded whole by the next successful `put`, never mutated
/// in place.
#[derive(Clone, Debug)]
struct CacheEntry {
    history: PriceHistory,
    stored_at: DateTime<Utc>,
}

/// Per-symbol cache of normalized histories.
///
/// Thread-safe: a single mutex guards the map so a concurrent
/// read-check-then-write cannot interleave. Expired entries are not evicted
/// eagerly; `get` ignores them and the next `put` overwrites them.
pub struct HistoryCache {
    entries: Mutex<HashMap<Symbol, CacheEntry>>,
    ttl: Duration,
}

impl HistoryCache {
    /// Create a cache with the default 1-hour TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Lock the entries mutex, recovering from poison if necessary.
    ///
    /// Worst case after recovery is a redundant upstream fetch, which is
    /// better than panicking.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<Symbol, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("History cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Look up a fresh entry for `symbol` at `now`.
    ///
    /// An entry is fresh while `now - stored_at < ttl`. Stale entries are
    /// left in place and simply ignored.
    pub fn get(&self, symbol: &Symbol, now: DateTime<Utc>) -> Option<PriceHistory> {
        let entries = self.lock_entries();

        let entry = entries.get(symbol)?;
        let age = (now - entry.stored_at).to_std().ok()?;

        if age < self.ttl {
            debug!("History cache: hit for '{}' (age {:?})", symbol, age);
            Some(entry.history.clone())
        } else {
            debug!("History cache: stale entry for '{}' (age {:?})", symbol, age);
            None
        }
    }

    /// Store a freshly normalized history for `symbol` at `now`.
    pub fn put(&self, symbol: Symbol, history: PriceHistory, now: DateTime<Utc>) {
        let mut entries = self.lock_entries();
        debug!("History cache: storing {} bars for '{}'", history.len(), symbol);
        entries.insert(
            symbol,
            CacheEntry {
                history,
                stored_at: now,
            },
        );
    }
}

impl Default for HistoryCache {
    fn default() -> Self {
        Self::new()
    }
}
