//! The confidential order book.
//!
//! Offers and demands live in independent stores keyed by monotonically
//! increasing ids (starting at 1, never reused). Each poster owns an
//! append-only index of the ids they created; index entries survive
//! cancellation and matching so user-scoped history stays complete.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use voltmatch_types::{
    Address, CipherHandle, Demand, DemandId, EnergyType, Offer, OfferId, OrderStatus, Result,
    VenueError, constants,
};

/// Offer/demand stores plus per-poster indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBook {
    offers: BTreeMap<OfferId, Offer>,
    demands: BTreeMap<DemandId, Demand>,
    next_offer_id: u64,
    next_demand_id: u64,
    offers_by_poster: BTreeMap<Address, Vec<OfferId>>,
    demands_by_poster: BTreeMap<Address, Vec<DemandId>>,
}

impl OrderBook {
    #[must_use]
    pub fn new() -> Self {
        Self {
            offers: BTreeMap::new(),
            demands: BTreeMap::new(),
            next_offer_id: constants::FIRST_ID,
            next_demand_id: constants::FIRST_ID,
            offers_by_poster: BTreeMap::new(),
            demands_by_poster: BTreeMap::new(),
        }
    }

    // =================================================================
    // Insertion
    // =================================================================

    /// Store a new ACTIVE offer and index it under its poster.
    /// The id counter advances exactly once per call.
    pub fn insert_offer(
        &mut self,
        seller: Address,
        energy_amount: CipherHandle,
        price_per_kwh: CipherHandle,
        energy_type: EnergyType,
        is_private: bool,
        now: DateTime<Utc>,
    ) -> OfferId {
        let id = OfferId(self.next_offer_id);
        self.next_offer_id += 1;

        let offer = Offer {
            id,
            seller,
            energy_amount,
            price_per_kwh,
            energy_type,
            status: OrderStatus::Active,
            created_at: now,
            is_private,
        };
        self.offers.insert(id, offer);
        self.offers_by_poster.entry(seller).or_default().push(id);
        id
    }

    /// Store a new ACTIVE demand and index it under its poster.
    pub fn insert_demand(
        &mut self,
        buyer: Address,
        energy_needed: CipherHandle,
        max_price_per_kwh: CipherHandle,
        is_private: bool,
        now: DateTime<Utc>,
    ) -> DemandId {
        let id = DemandId(self.next_demand_id);
        self.next_demand_id += 1;

        let demand = Demand {
            id,
            buyer,
            energy_needed,
            max_price_per_kwh,
            status: OrderStatus::Active,
            created_at: now,
            is_private,
        };
        self.demands.insert(id, demand);
        self.demands_by_poster.entry(buyer).or_default().push(id);
        id
    }

    // =================================================================
    // Cancellation
    // =================================================================

    /// Cancel an ACTIVE offer. Rejected (never silently ignored) for
    /// matched or already-cancelled records.
    ///
    /// # Errors
    /// - [`VenueError::InvalidArgument`] for never-issued ids
    /// - [`VenueError::Unauthorized`] if `caller` is not the poster
    /// - [`VenueError::InvalidState`] if the offer is not ACTIVE
    pub fn cancel_offer(&mut self, caller: Address, id: OfferId) -> Result<()> {
        let offer = lookup_mut(&mut self.offers, id, self.next_offer_id, "offer")?;
        if offer.seller != caller {
            return Err(VenueError::Unauthorized {
                reason: format!("{caller} is not the poster of {id}"),
            });
        }
        require_active("offer", offer.status)?;
        offer.status = OrderStatus::Cancelled;
        Ok(())
    }

    /// Cancel an ACTIVE demand. Same preconditions as [`Self::cancel_offer`].
    pub fn cancel_demand(&mut self, caller: Address, id: DemandId) -> Result<()> {
        let demand = lookup_mut(&mut self.demands, id, self.next_demand_id, "demand")?;
        if demand.buyer != caller {
            return Err(VenueError::Unauthorized {
                reason: format!("{caller} is not the poster of {id}"),
            });
        }
        require_active("demand", demand.status)?;
        demand.status = OrderStatus::Cancelled;
        Ok(())
    }

    // =================================================================
    // Access grants
    // =================================================================

    /// Grant `grantee` decryption access to both encrypted quantities of
    /// an ACTIVE offer, enabling it to match against a private record.
    pub fn grant_offer_access(
        &mut self,
        caller: Address,
        id: OfferId,
        grantee: Address,
    ) -> Result<()> {
        let offer = lookup_mut(&mut self.offers, id, self.next_offer_id, "offer")?;
        if offer.seller != caller {
            return Err(VenueError::Unauthorized {
                reason: format!("{caller} is not the poster of {id}"),
            });
        }
        require_active("offer", offer.status)?;
        offer.energy_amount.grant(grantee);
        offer.price_per_kwh.grant(grantee);
        Ok(())
    }

    /// Symmetric counterpart of [`Self::grant_offer_access`].
    pub fn grant_demand_access(
        &mut self,
        caller: Address,
        id: DemandId,
        grantee: Address,
    ) -> Result<()> {
        let demand = lookup_mut(&mut self.demands, id, self.next_demand_id, "demand")?;
        if demand.buyer != caller {
            return Err(VenueError::Unauthorized {
                reason: format!("{caller} is not the poster of {id}"),
            });
        }
        require_active("demand", demand.status)?;
        demand.energy_needed.grant(grantee);
        demand.max_price_per_kwh.grant(grantee);
        Ok(())
    }

    // =================================================================
    // Match-time transitions
    // =================================================================

    /// Transition an offer ACTIVE → MATCHED. The matching engine has
    /// already validated the status; a non-ACTIVE record here means the
    /// call sequence itself is broken.
    pub fn mark_offer_matched(&mut self, id: OfferId) -> Result<()> {
        let offer = lookup_mut(&mut self.offers, id, self.next_offer_id, "offer")?;
        require_active("offer", offer.status)?;
        offer.status = OrderStatus::Matched;
        Ok(())
    }

    /// Transition a demand ACTIVE → MATCHED.
    pub fn mark_demand_matched(&mut self, id: DemandId) -> Result<()> {
        let demand = lookup_mut(&mut self.demands, id, self.next_demand_id, "demand")?;
        require_active("demand", demand.status)?;
        demand.status = OrderStatus::Matched;
        Ok(())
    }

    /// Operator unwind: MATCHED → CANCELLED when a trade is abandoned.
    pub fn unwind_offer(&mut self, id: OfferId) -> Result<()> {
        let offer = lookup_mut(&mut self.offers, id, self.next_offer_id, "offer")?;
        if offer.status != OrderStatus::Matched {
            return Err(VenueError::InvalidState {
                reason: format!("offer is {}, expected MATCHED", offer.status),
            });
        }
        offer.status = OrderStatus::Cancelled;
        Ok(())
    }

    /// Operator unwind: MATCHED → CANCELLED when a trade is abandoned.
    pub fn unwind_demand(&mut self, id: DemandId) -> Result<()> {
        let demand = lookup_mut(&mut self.demands, id, self.next_demand_id, "demand")?;
        if demand.status != OrderStatus::Matched {
            return Err(VenueError::InvalidState {
                reason: format!("demand is {}, expected MATCHED", demand.status),
            });
        }
        demand.status = OrderStatus::Cancelled;
        Ok(())
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Full offer record.
    ///
    /// # Errors
    /// Returns [`VenueError::InvalidArgument`] for ids that were never issued.
    pub fn offer(&self, id: OfferId) -> Result<&Offer> {
        if id.0 < constants::FIRST_ID || id.0 >= self.next_offer_id {
            return Err(VenueError::InvalidArgument {
                reason: format!("offer id {} was never issued", id.0),
            });
        }
        self.offers
            .get(&id)
            .ok_or_else(|| VenueError::Internal(format!("issued offer {id} missing from store")))
    }

    /// Full demand record.
    pub fn demand(&self, id: DemandId) -> Result<&Demand> {
        if id.0 < constants::FIRST_ID || id.0 >= self.next_demand_id {
            return Err(VenueError::InvalidArgument {
                reason: format!("demand id {} was never issued", id.0),
            });
        }
        self.demands
            .get(&id)
            .ok_or_else(|| VenueError::Internal(format!("issued demand {id} missing from store")))
    }

    /// Append-only list of offer ids posted by `poster`.
    #[must_use]
    pub fn offers_of(&self, poster: Address) -> &[OfferId] {
        self.offers_by_poster
            .get(&poster)
            .map_or(&[], Vec::as_slice)
    }

    /// Append-only list of demand ids posted by `poster`.
    #[must_use]
    pub fn demands_of(&self, poster: Address) -> &[DemandId] {
        self.demands_by_poster
            .get(&poster)
            .map_or(&[], Vec::as_slice)
    }

    /// Total offers ever issued.
    #[must_use]
    pub fn offer_count(&self) -> u64 {
        self.next_offer_id - constants::FIRST_ID
    }

    /// Total demands ever issued.
    #[must_use]
    pub fn demand_count(&self) -> u64 {
        self.next_demand_id - constants::FIRST_ID
    }

    /// Offers currently in ACTIVE status.
    #[must_use]
    pub fn active_offer_count(&self) -> usize {
        self.offers.values().filter(|o| o.is_active()).count()
    }

    /// Demands currently in ACTIVE status.
    #[must_use]
    pub fn active_demand_count(&self) -> usize {
        self.demands.values().filter(|d| d.is_active()).count()
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup_mut<'a, K, V>(
    store: &'a mut BTreeMap<K, V>,
    id: K,
    next_id: u64,
    entity: &str,
) -> Result<&'a mut V>
where
    K: Ord + Copy + std::fmt::Display + IdValue,
{
    if id.value() < constants::FIRST_ID || id.value() >= next_id {
        return Err(VenueError::InvalidArgument {
            reason: format!("{entity} id {} was never issued", id.value()),
        });
    }
    store
        .get_mut(&id)
        .ok_or_else(|| VenueError::Internal(format!("issued {entity} {id} missing from store")))
}

fn require_active(entity: &str, status: OrderStatus) -> Result<()> {
    if status == OrderStatus::Active {
        Ok(())
    } else {
        Err(VenueError::InvalidState {
            reason: format!("{entity} is {status}, expected ACTIVE"),
        })
    }
}

/// Access to the raw counter value of an id newtype.
trait IdValue {
    fn value(&self) -> u64;
}

impl IdValue for OfferId {
    fn value(&self) -> u64 {
        self.0
    }
}

impl IdValue for DemandId {
    fn value(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voltmatch_types::HandleId;

    fn addr(b: u8) -> Address {
        Address([b; 20])
    }

    fn public_pair(owner: Address) -> (CipherHandle, CipherHandle) {
        (
            CipherHandle::public(HandleId::new(), owner),
            CipherHandle::public(HandleId::new(), owner),
        )
    }

    fn add_offer(book: &mut OrderBook, seller: Address) -> OfferId {
        let (amount, price) = public_pair(seller);
        book.insert_offer(seller, amount, price, EnergyType::Solar, false, Utc::now())
    }

    fn add_demand(book: &mut OrderBook, buyer: Address) -> DemandId {
        let (needed, cap) = public_pair(buyer);
        book.insert_demand(buyer, needed, cap, false, Utc::now())
    }

    #[test]
    fn ids_start_at_one_and_are_independent() {
        let mut book = OrderBook::new();
        assert_eq!(add_offer(&mut book, addr(1)), OfferId(1));
        assert_eq!(add_offer(&mut book, addr(1)), OfferId(2));
        assert_eq!(add_demand(&mut book, addr(2)), DemandId(1));
        assert_eq!(book.offer_count(), 2);
        assert_eq!(book.demand_count(), 1);
    }

    #[test]
    fn poster_index_is_append_only() {
        let mut book = OrderBook::new();
        let seller = addr(1);
        let id1 = add_offer(&mut book, seller);
        let id2 = add_offer(&mut book, seller);
        book.cancel_offer(seller, id1).unwrap();
        // Index keeps cancelled entries for history.
        assert_eq!(book.offers_of(seller), &[id1, id2]);
        assert_eq!(book.offers_of(addr(9)), &[] as &[OfferId]);
    }

    #[test]
    fn cancel_requires_poster() {
        let mut book = OrderBook::new();
        let id = add_offer(&mut book, addr(1));
        let err = book.cancel_offer(addr(2), id).unwrap_err();
        assert!(matches!(err, VenueError::Unauthorized { .. }));
        assert!(book.offer(id).unwrap().is_active());
    }

    #[test]
    fn double_cancel_rejected() {
        let mut book = OrderBook::new();
        let seller = addr(1);
        let id = add_offer(&mut book, seller);
        book.cancel_offer(seller, id).unwrap();
        let err = book.cancel_offer(seller, id).unwrap_err();
        assert!(matches!(err, VenueError::InvalidState { .. }));
        assert_eq!(book.offer(id).unwrap().status, OrderStatus::Cancelled);
    }

    #[test]
    fn cancel_matched_rejected() {
        let mut book = OrderBook::new();
        let buyer = addr(2);
        let id = add_demand(&mut book, buyer);
        book.mark_demand_matched(id).unwrap();
        let err = book.cancel_demand(buyer, id).unwrap_err();
        assert!(matches!(err, VenueError::InvalidState { .. }));
    }

    #[test]
    fn never_issued_id_is_invalid_argument() {
        let book = OrderBook::new();
        let err = book.offer(OfferId(1)).unwrap_err();
        assert!(matches!(err, VenueError::InvalidArgument { .. }));
        let err = book.demand(DemandId(0)).unwrap_err();
        assert!(matches!(err, VenueError::InvalidArgument { .. }));
    }

    #[test]
    fn grant_extends_both_handles() {
        let mut book = OrderBook::new();
        let seller = addr(1);
        let (amount, price) = (
            CipherHandle::new(HandleId::new(), seller),
            CipherHandle::new(HandleId::new(), seller),
        );
        let id =
            book.insert_offer(seller, amount, price, EnergyType::Hydro, true, Utc::now());

        assert!(!book.offer(id).unwrap().is_accessible_to(addr(3)));
        book.grant_offer_access(seller, id, addr(3)).unwrap();
        assert!(book.offer(id).unwrap().is_accessible_to(addr(3)));
    }

    #[test]
    fn grant_requires_owner() {
        let mut book = OrderBook::new();
        let id = add_demand(&mut book, addr(2));
        let err = book.grant_demand_access(addr(3), id, addr(4)).unwrap_err();
        assert!(matches!(err, VenueError::Unauthorized { .. }));
    }

    #[test]
    fn unwind_only_from_matched() {
        let mut book = OrderBook::new();
        let id = add_offer(&mut book, addr(1));
        let err = book.unwind_offer(id).unwrap_err();
        assert!(matches!(err, VenueError::InvalidState { .. }));

        book.mark_offer_matched(id).unwrap();
        book.unwind_offer(id).unwrap();
        assert_eq!(book.offer(id).unwrap().status, OrderStatus::Cancelled);
    }

    #[test]
    fn active_counts_track_status() {
        let mut book = OrderBook::new();
        let seller = addr(1);
        let id1 = add_offer(&mut book, seller);
        let _id2 = add_offer(&mut book, seller);
        assert_eq!(book.active_offer_count(), 2);
        book.cancel_offer(seller, id1).unwrap();
        assert_eq!(book.active_offer_count(), 1);
        assert_eq!(book.offer_count(), 2);
    }

    #[test]
    fn serde_roundtrip_preserves_counters() {
        let mut book = OrderBook::new();
        let seller = addr(1);
        let id = add_offer(&mut book, seller);
        book.cancel_offer(seller, id).unwrap();

        let json = serde_json::to_string(&book).unwrap();
        let mut back: OrderBook = serde_json::from_str(&json).unwrap();
        assert_eq!(back.offer_count(), 1);
        // Counter continues where it left off.
        assert_eq!(add_offer(&mut back, seller), OfferId(2));
    }
}
