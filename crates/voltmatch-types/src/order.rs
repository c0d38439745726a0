//! Offer and demand records for the confidential order book.
//!
//! Quantities and prices are [`CipherHandle`]s — the venue stores only
//! opaque references plus their decryption ACLs. Plaintexts appear only
//! inside the oracle's settlement callback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, CipherHandle, DemandId, OfferId};

/// The energy source category of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum EnergyType {
    Solar,
    Wind,
    Hydro,
    Nuclear,
}

impl std::fmt::Display for EnergyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Solar => write!(f, "SOLAR"),
            Self::Wind => write!(f, "WIND"),
            Self::Hydro => write!(f, "HYDRO"),
            Self::Nuclear => write!(f, "NUCLEAR"),
        }
    }
}

/// Lifecycle status of an offer or demand.
///
/// Transitions are one-way: ACTIVE → MATCHED or ACTIVE → CANCELLED,
/// plus the documented operator unwind MATCHED → CANCELLED when a trade
/// is abandoned. A status never reverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderStatus {
    Active,
    Matched,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Matched => write!(f, "MATCHED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// An energy offer posted by a seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    /// The poster; the sole party authorized to cancel.
    pub seller: Address,
    /// Encrypted kWh on offer.
    pub energy_amount: CipherHandle,
    /// Encrypted asking price per kWh.
    pub price_per_kwh: CipherHandle,
    pub energy_type: EnergyType,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// Private offers restrict who may initiate a match against them.
    pub is_private: bool,
}

impl Offer {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    /// Whether `who` may initiate a match involving this offer: public
    /// offers are open to all; private ones require being the seller or
    /// holding an explicit grant on both encrypted quantities.
    #[must_use]
    pub fn is_accessible_to(&self, who: Address) -> bool {
        !self.is_private
            || self.seller == who
            || (self.energy_amount.may_decrypt(who) && self.price_per_kwh.may_decrypt(who))
    }
}

/// An energy demand posted by a buyer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demand {
    pub id: DemandId,
    /// The poster; the sole party authorized to cancel.
    pub buyer: Address,
    /// Encrypted kWh needed.
    pub energy_needed: CipherHandle,
    /// Encrypted price ceiling per kWh.
    pub max_price_per_kwh: CipherHandle,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub is_private: bool,
}

impl Demand {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    /// Symmetric counterpart of [`Offer::is_accessible_to`].
    #[must_use]
    pub fn is_accessible_to(&self, who: Address) -> bool {
        !self.is_private
            || self.buyer == who
            || (self.energy_needed.may_decrypt(who) && self.max_price_per_kwh.may_decrypt(who))
    }
}
