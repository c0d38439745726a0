//! Snapshot of the system-of-record state.
//!
//! The venue's durable state — session, both order stores with their
//! per-poster indices and counters, trades, outstanding correlations,
//! and the credits ledger — serializes into one [`VenueSnapshot`]. The
//! JSON round-trip is the durability contract for real deployments.
//!
//! Not included: oracle-internal state (external collaborator) and the
//! drainable event log (transient, at-least-once delivered elsewhere).

use serde::{Deserialize, Serialize};
use voltmatch_book::OrderBook;
use voltmatch_matching::TradeStore;
use voltmatch_settlement::CreditsLedger;
use voltmatch_types::{CorrelationId, Result, Session, TradeId, VenueConfig};

/// Complete durable state of a venue instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueSnapshot {
    pub config: VenueConfig,
    pub session: Session,
    pub book: OrderBook,
    pub trades: TradeStore,
    /// Outstanding decryption requests, in deterministic order.
    pub correlations: Vec<(CorrelationId, TradeId)>,
    pub ledger: CreditsLedger,
}

impl VenueSnapshot {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
