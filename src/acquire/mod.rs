//! Acquisition orchestrator: the request lifecycle from URL to table.
//!
//! Composes the extractor, cooldown gate, cache, provider, and normalizer
//! into one linear flow per request:
//!
//! ```text
//! url -> Symbol -> gate check -> cache get -> upstream fetch
//!                                              |-> rate limit: trip gate
//!                                              '-> ok: normalize -> cache put
//! ```
//!
//! Every failure maps to exactly one [`AcquisitionError`] variant and is
//! terminal for the current request; there are no automatic retries.
//!
//! Under concurrent requests the cache's read-check-then-write is made atomic
//! per symbol: a keyed async lock serializes fetches so two simultaneous
//! requests for the same symbol issue a single upstream call, with the second
//! caller served from the cache once the first completes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::cache::HistoryCache;
use crate::config::AcquireConfig;
use crate::errors::{AcquisitionError, FetchError};
use crate::gate::{CooldownGate, GateDecision};
use crate::models::{PriceHistory, Symbol};
use crate::normalize::normalize;
use crate::provider::HistoryProvider;

/// Orchestrates historical data acquisition against a single provider.
///
/// Owns the process-scoped cache and cooldown gate; construct one at process
/// start and share it across requests. The clock is passed into every call so
/// tests can drive time explicitly.
pub struct HistoryService {
    provider: Arc<dyn HistoryProvider>,
    cache: HistoryCache,
    gate: CooldownGate,
    /// Per-symbol fetch locks; entries persist for the process lifetime,
    /// bounded by the number of distinct symbols requested.
    in_flight: Mutex<HashMap<Symbol, Arc<tokio::sync::Mutex<()>>>>,
}

impl HistoryService {
    /// Create a service with default configuration.
    pub fn new(provider: Arc<dyn HistoryProvider>) -> Self {
        Self::with_config(provider, &AcquireConfig::default())
    }

    /// Create a service with explicit cache TTL and cooldown settings.
    pub fn with_config(provider: Arc<dyn HistoryProvider>, config: &AcquireConfig) -> Self {
        Self {
            provider,
            cache: HistoryCache::with_ttl(config.cache_ttl()),
            gate: CooldownGate::with_penalty(config.cooldown()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the in-flight map, recovering from poison if necessary.
    ///
    /// Worst case after recovery is a redundant upstream fetch, which is
    /// better than panicking.
    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<Symbol, Arc<tokio::sync::Mutex<()>>>> {
        self.in_flight.lock().unwrap_or_else(|poisoned| {
            warn!("In-flight lock map mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// The async fetch lock for `symbol`, created on first use.
    fn fetch_lock(&self, symbol: &Symbol) -> Arc<tokio::sync::Mutex<()>> {
        let mut in_flight = self.lock_in_flight();
        in_flight.entry(symbol.clone()).or_default().clone()
    }

    /// Acquire the full daily history for the instrument named by `url`.
    ///
    /// The sequence is extract, gate check, cache lookup, fetch, normalize,
    /// cache store. The fetch itself runs under a per-symbol lock with the
    /// cache re-checked after acquiring it, so concurrent requests for one
    /// symbol issue a single upstream call. Only a successful fetch mutates
    /// the cache, and only an upstream rate-limit signal mutates the gate; a
    /// request cancelled mid-fetch therefore leaves both untouched.
    pub async fn acquire(
        &self,
        url: &str,
        now: DateTime<Utc>,
    ) -> Result<PriceHistory, AcquisitionError> {
        let symbol = Symbol::from_quote_url(url)?;

        if let GateDecision::Deny { remaining } = self.gate.check(now) {
            info!(
                "Acquisition suppressed for '{}': cooling down for {:?} more",
                symbol, remaining
            );
            return Err(AcquisitionError::RateLimited { remaining });
        }

        if let Some(history) = self.cache.get(&symbol, now) {
            debug!("Serving '{}' from cache ({} bars)", symbol, history.len());
            return Ok(history);
        }

        // Serialize fetches per symbol so a concurrent request that missed
        // the cache at the same instant waits here instead of fetching twice.
        let fetch_lock = self.fetch_lock(&symbol);
        let _fetch_guard = fetch_lock.lock().await;

        // Re-check both shared states under the lock: while we waited, the
        // request holding it may have filled the cache or tripped the gate.
        if let Some(history) = self.cache.get(&symbol, now) {
            debug!(
                "Serving '{}' from cache after concurrent fetch ({} bars)",
                symbol,
                history.len()
            );
            return Ok(history);
        }
        if let GateDecision::Deny { remaining } = self.gate.check(now) {
            info!(
                "Acquisition suppressed for '{}': cooling down for {:?} more",
                symbol, remaining
            );
            return Err(AcquisitionError::RateLimited { remaining });
        }

        info!(
            "Fetching full history for '{}' from provider '{}'",
            symbol,
            self.provider.id()
        );

        let raw = match self.provider.fetch_full_history(&symbol).await {
            Ok(raw) => raw,
            Err(e) if e.is_rate_limit() => {
                warn!(
                    "Provider '{}' rate limited request for '{}', tripping cooldown gate",
                    self.provider.id(),
                    symbol
                );
                self.gate.trip(now);
                return Err(AcquisitionError::RateLimited {
                    remaining: self.gate.penalty(),
                });
            }
            Err(e) => {
                warn!("Fetch failed for '{}': {}", symbol, e);
                return Err(AcquisitionError::FetchFailed {
                    message: e.to_string(),
                });
            }
        };

        let history = normalize(symbol.clone(), &raw);
        debug!(
            "Normalized {} raw bars into {} canonical bars for '{}'",
            raw.bars.len(),
            history.len(),
            symbol
        );

        self.cache.put(symbol, history.clone(), now);

        Ok(history)
    }

    /// [`acquire`](Self::acquire) against the current wall clock.
    pub async fn acquire_now(&self, url: &str) -> Result<PriceHistory, AcquisitionError> {
        self.acquire(url, Utc::now()).await
    }
}
