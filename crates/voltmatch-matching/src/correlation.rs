//! Correlation registry — routes oracle callbacks to their trades.
//!
//! Every match issues exactly one decryption request and records the
//! oracle's correlation id against the new trade id. The eventual
//! callback is routed through this map, never through recency: two
//! matches created in sequence settle correctly even when their
//! callbacks arrive in reverse order.
//!
//! An entry lives as long as its trade is pending. It is consumed on
//! successful settlement or operator abandonment; settlement-time
//! business failures leave it registered so the oracle may redeliver
//! (e.g. after the buyer tops up credits).

use std::collections::HashMap;

use voltmatch_types::{CorrelationId, Result, TradeId, VenueError};

/// Outstanding `correlation id → trade id` routing state.
#[derive(Debug, Clone, Default)]
pub struct CorrelationRegistry {
    pending: HashMap<CorrelationId, TradeId>,
}

impl CorrelationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }

    /// Record a freshly issued request.
    ///
    /// # Errors
    /// Returns [`VenueError::Internal`] on a correlation id collision —
    /// the oracle contract guarantees uniqueness, so a duplicate means
    /// the integration is broken.
    pub fn register(&mut self, correlation_id: CorrelationId, trade_id: TradeId) -> Result<()> {
        if self.pending.insert(correlation_id, trade_id).is_some() {
            return Err(VenueError::Internal(format!(
                "correlation id collision: {correlation_id}"
            )));
        }
        Ok(())
    }

    /// Resolve a callback to its pending trade without consuming the entry.
    ///
    /// # Errors
    /// Returns [`VenueError::UnknownCorrelation`] for settled, abandoned,
    /// or never-issued correlation ids.
    pub fn resolve(&self, correlation_id: CorrelationId) -> Result<TradeId> {
        self.pending
            .get(&correlation_id)
            .copied()
            .ok_or(VenueError::UnknownCorrelation(correlation_id))
    }

    /// Remove a completed request.
    pub fn consume(&mut self, correlation_id: CorrelationId) -> Result<TradeId> {
        self.pending
            .remove(&correlation_id)
            .ok_or(VenueError::UnknownCorrelation(correlation_id))
    }

    /// Drop the entry belonging to `trade_id`, if any (operator abandon
    /// path). Returns the removed correlation id.
    pub fn remove_by_trade(&mut self, trade_id: TradeId) -> Option<CorrelationId> {
        let found = self
            .pending
            .iter()
            .find_map(|(cid, tid)| (*tid == trade_id).then_some(*cid))?;
        self.pending.remove(&found);
        Some(found)
    }

    /// Number of outstanding decryption requests.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    /// Export entries for snapshotting, in deterministic order.
    #[must_use]
    pub fn export(&self) -> Vec<(CorrelationId, TradeId)> {
        let mut entries: Vec<_> = self.pending.iter().map(|(c, t)| (*c, *t)).collect();
        entries.sort();
        entries
    }

    /// Rebuild from snapshotted entries.
    #[must_use]
    pub fn import(entries: Vec<(CorrelationId, TradeId)>) -> Self {
        Self {
            pending: entries.into_iter().collect(),
        }
    }
}
