//! Trade store — append-only record of matched pairs.
//!
//! Trade ids follow the same counter discipline as the order book:
//! strictly increasing from 1, never reused, never deleted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use voltmatch_types::{
    Address, DemandId, EnergyType, OfferId, Result, Trade, TradeId, VenueError, constants,
};

/// All trades ever created, keyed by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeStore {
    trades: BTreeMap<TradeId, Trade>,
    next_trade_id: u64,
}

impl TradeStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            trades: BTreeMap::new(),
            next_trade_id: constants::FIRST_ID,
        }
    }

    /// Create a trade with zeroed settlement fields.
    pub fn create(
        &mut self,
        offer_id: OfferId,
        demand_id: DemandId,
        seller: Address,
        buyer: Address,
        energy_type: EnergyType,
        now: DateTime<Utc>,
    ) -> TradeId {
        let id = TradeId(self.next_trade_id);
        self.next_trade_id += 1;

        self.trades.insert(
            id,
            Trade {
                id,
                offer_id,
                demand_id,
                seller,
                buyer,
                energy_amount: 0,
                trade_price: 0,
                energy_type,
                created_at: now,
                completed: false,
                abandoned: false,
            },
        );
        id
    }

    /// Full trade record.
    ///
    /// # Errors
    /// Returns [`VenueError::InvalidArgument`] for never-issued ids.
    pub fn get(&self, id: TradeId) -> Result<&Trade> {
        self.check_issued(id)?;
        self.trades
            .get(&id)
            .ok_or_else(|| VenueError::Internal(format!("issued {id} missing from store")))
    }

    /// Mutable access for settlement and the operator abandon path.
    pub fn get_mut(&mut self, id: TradeId) -> Result<&mut Trade> {
        self.check_issued(id)?;
        self.trades
            .get_mut(&id)
            .ok_or_else(|| VenueError::Internal(format!("issued {id} missing from store")))
    }

    /// Total trades ever created.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_trade_id - constants::FIRST_ID
    }

    /// Trades settled so far.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.trades.values().filter(|t| t.completed).count()
    }

    /// Trades still awaiting a valid oracle callback.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.trades.values().filter(|t| t.is_pending()).count()
    }

    fn check_issued(&self, id: TradeId) -> Result<()> {
        if id.0 < constants::FIRST_ID || id.0 >= self.next_trade_id {
            return Err(VenueError::InvalidArgument {
                reason: format!("trade id {} was never issued", id.0),
            });
        }
        Ok(())
    }
}

impl Default for TradeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address([b; 20])
    }

    fn create(store: &mut TradeStore) -> TradeId {
        store.create(
            OfferId(1),
            DemandId(1),
            addr(1),
            addr(2),
            EnergyType::Solar,
            Utc::now(),
        )
    }

    #[test]
    fn ids_sequential_from_one() {
        let mut store = TradeStore::new();
        assert_eq!(create(&mut store), TradeId(1));
        assert_eq!(create(&mut store), TradeId(2));
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn new_trade_has_zeroed_settlement_fields() {
        let mut store = TradeStore::new();
        let id = create(&mut store);
        let trade = store.get(id).unwrap();
        assert_eq!(trade.energy_amount, 0);
        assert_eq!(trade.trade_price, 0);
        assert!(!trade.completed);
        assert!(trade.is_pending());
    }

    #[test]
    fn never_issued_id_rejected() {
        let store = TradeStore::new();
        let err = store.get(TradeId(1)).unwrap_err();
        assert!(matches!(err, VenueError::InvalidArgument { .. }));
    }

    #[test]
    fn counts_track_completion() {
        let mut store = TradeStore::new();
        let id1 = create(&mut store);
        let _id2 = create(&mut store);
        assert_eq!(store.pending_count(), 2);

        let trade = store.get_mut(id1).unwrap();
        trade.energy_amount = 100;
        trade.trade_price = 5;
        trade.completed = true;

        assert_eq!(store.completed_count(), 1);
        assert_eq!(store.pending_count(), 1);
    }

    #[test]
    fn serde_roundtrip_preserves_counter() {
        let mut store = TradeStore::new();
        create(&mut store);
        let json = serde_json::to_string(&store).unwrap();
        let mut back: TradeStore = serde_json::from_str(&json).unwrap();
        assert_eq!(create(&mut back), TradeId(2));
    }
}
