//! Trade records and the revealed-value quartet.
//!
//! A [`Trade`] is created at match time with zeroed settlement fields and
//! is mutated exactly once — by settlement — to fill in the clearing
//! amount and price. Trades are never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, DemandId, EnergyType, OfferId, TradeId};

/// A matched offer/demand pair awaiting (or past) settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub offer_id: OfferId,
    pub demand_id: DemandId,
    pub seller: Address,
    pub buyer: Address,
    /// Cleared kWh. Zero until settled, immutable afterwards.
    pub energy_amount: u32,
    /// Clearing price per kWh (the seller's quote). Zero until settled.
    pub trade_price: u32,
    pub energy_type: EnergyType,
    pub created_at: DateTime<Utc>,
    /// Set exactly once, by settlement.
    pub completed: bool,
    /// Set by the operator abandon path; terminal like `completed`.
    pub abandoned: bool,
}

impl Trade {
    /// A trade is pending while it still awaits a valid oracle callback.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.completed && !self.abandoned
    }

    /// Settlement payment: `energy_amount * trade_price`. Zero until settled.
    #[must_use]
    pub fn total_payment(&self) -> u128 {
        u128::from(self.energy_amount) * u128::from(self.trade_price)
    }
}

impl std::fmt::Display for Trade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trade[{}] {} -> {} {} {} kWh @ {}",
            self.id, self.seller, self.buyer, self.energy_type, self.energy_amount,
            self.trade_price,
        )
    }
}

/// The four plaintexts revealed by one decryption round-trip, in request
/// order: offer amount, offer price, demand amount, demand price cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedValues {
    pub offer_amount: u32,
    pub offer_price: u32,
    pub demand_amount: u32,
    pub demand_max_price: u32,
}

impl RevealedValues {
    /// The quantity that clears: the smaller of the two sides.
    #[must_use]
    pub fn clearing_amount(&self) -> u32 {
        self.offer_amount.min(self.demand_amount)
    }

    /// Whether the revealed prices are compatible (offer within the cap).
    #[must_use]
    pub fn prices_cross(&self) -> bool {
        self.offer_price <= self.demand_max_price
    }
}
