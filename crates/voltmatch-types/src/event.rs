//! Venue notifications.
//!
//! Every state-changing entry point appends an event to the venue's
//! drainable log. Delivery to external consumers is fire-and-forget with
//! at-least-once semantics assumed on the consumer side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, DemandId, EnergyType, OfferId, SessionId, TradeId};

/// A notification emitted by the venue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum VenueEvent {
    SessionStarted {
        session_id: SessionId,
        started_at: DateTime<Utc>,
    },
    OfferCreated {
        offer_id: OfferId,
        seller: Address,
        energy_type: EnergyType,
        is_private: bool,
    },
    DemandCreated {
        demand_id: DemandId,
        buyer: Address,
        is_private: bool,
    },
    OfferCancelled {
        offer_id: OfferId,
    },
    DemandCancelled {
        demand_id: DemandId,
    },
    TradeMatched {
        trade_id: TradeId,
        offer_id: OfferId,
        demand_id: DemandId,
    },
    TradeCompleted {
        trade_id: TradeId,
        seller: Address,
        buyer: Address,
        energy_amount: u32,
        trade_price: u32,
    },
    TradeAbandoned {
        trade_id: TradeId,
    },
    CreditsAdded {
        account: Address,
        amount: u128,
    },
}

impl VenueEvent {
    /// Stable event name for log lines and external routing.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "SESSION_STARTED",
            Self::OfferCreated { .. } => "OFFER_CREATED",
            Self::DemandCreated { .. } => "DEMAND_CREATED",
            Self::OfferCancelled { .. } => "OFFER_CANCELLED",
            Self::DemandCancelled { .. } => "DEMAND_CANCELLED",
            Self::TradeMatched { .. } => "TRADE_MATCHED",
            Self::TradeCompleted { .. } => "TRADE_COMPLETED",
            Self::TradeAbandoned { .. } => "TRADE_ABANDONED",
            Self::CreditsAdded { .. } => "CREDITS_ADDED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kinds() {
        let e = VenueEvent::TradeMatched {
            trade_id: TradeId(1),
            offer_id: OfferId(1),
            demand_id: DemandId(1),
        };
        assert_eq!(e.kind(), "TRADE_MATCHED");

        let e = VenueEvent::CreditsAdded {
            account: Address([0u8; 20]),
            amount: 100,
        };
        assert_eq!(e.kind(), "CREDITS_ADDED");
    }

    #[test]
    fn event_serde_roundtrip() {
        let e = VenueEvent::TradeCompleted {
            trade_id: TradeId(2),
            seller: Address([1u8; 20]),
            buyer: Address([2u8; 20]),
            energy_amount: 800,
            trade_price: 50,
        };
        let json = serde_json::to_string(&e).unwrap();
        let back: VenueEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(e, back);
    }
}
