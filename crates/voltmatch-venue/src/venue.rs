//! The venue facade — every public entry point of the system.
//!
//! Each method executes as one indivisible, serialized step: it validates
//! fully before mutating, so a failed call leaves no partial writes. The
//! only asynchronous boundary is the decryption request/callback pair —
//! `match_trade` returns before plaintexts are revealed, and nothing
//! blocks while any number of decryptions are outstanding.

use chrono::Utc;
use voltmatch_book::{OrderBook, SessionManager};
use voltmatch_matching::{
    CorrelationRegistry, DecryptionOracle, DecryptionResult, TradeStore, validate_pairing,
};
use voltmatch_settlement::{CreditsLedger, settle_trade};
use voltmatch_types::{
    Address, CipherHandle, Demand, DemandId, EnergyType, Offer, OfferId, Result, Session, Trade,
    TradeId, VenueConfig, VenueError, VenueEvent,
};

use crate::snapshot::VenueSnapshot;

/// The confidential double-auction venue.
///
/// Generic over the decryption-oracle collaborator so production wiring
/// and the in-memory test oracle share one code path.
pub struct Venue<O> {
    config: VenueConfig,
    sessions: SessionManager,
    book: OrderBook,
    trades: TradeStore,
    correlations: CorrelationRegistry,
    ledger: CreditsLedger,
    events: Vec<VenueEvent>,
    oracle: O,
}

impl<O: DecryptionOracle> Venue<O> {
    /// Create a venue at genesis: no session open, empty stores.
    #[must_use]
    pub fn new(config: VenueConfig, oracle: O) -> Self {
        let sessions = SessionManager::new(&config.session);
        Self {
            config,
            sessions,
            book: OrderBook::new(),
            trades: TradeStore::new(),
            correlations: CorrelationRegistry::new(),
            ledger: CreditsLedger::new(),
            events: Vec::new(),
            oracle,
        }
    }

    // =================================================================
    // Session Manager entry points
    // =================================================================

    /// Start a new trading session. Operator only; the current session
    /// must be expired.
    pub fn start_session(&mut self, caller: Address) -> Result<voltmatch_types::SessionId> {
        self.require_operator(caller)?;
        let now = Utc::now();
        let id = self.sessions.start_new(now)?;
        self.events.push(VenueEvent::SessionStarted {
            session_id: id,
            started_at: now,
        });
        Ok(id)
    }

    /// Change the session duration. Operator only; takes effect
    /// immediately, including for the running session.
    pub fn set_session_duration(
        &mut self,
        caller: Address,
        duration: std::time::Duration,
    ) -> Result<()> {
        self.require_operator(caller)?;
        self.sessions.set_duration(duration);
        Ok(())
    }

    /// Whether the venue currently accepts writes and matches.
    #[must_use]
    pub fn is_session_open(&self) -> bool {
        self.sessions.is_active()
    }

    /// The current session record.
    #[must_use]
    pub fn session(&self) -> &Session {
        self.sessions.current()
    }

    // =================================================================
    // Order Book entry points
    // =================================================================

    /// Post an encrypted energy offer. Returns the new offer id; the id
    /// counter advances exactly once per successful call.
    pub fn create_offer(
        &mut self,
        caller: Address,
        amount: u32,
        price_per_kwh: u32,
        energy_type: EnergyType,
        is_private: bool,
    ) -> Result<OfferId> {
        self.require_open()?;
        require_positive("amount", amount)?;
        require_positive("price", price_per_kwh)?;

        let amount_handle = wrap_handle(self.oracle.encrypt(amount), caller, is_private);
        let price_handle = wrap_handle(self.oracle.encrypt(price_per_kwh), caller, is_private);

        let id = self.book.insert_offer(
            caller,
            amount_handle,
            price_handle,
            energy_type,
            is_private,
            Utc::now(),
        );
        tracing::debug!(offer = %id, seller = %caller, %energy_type, "Offer created");
        self.events.push(VenueEvent::OfferCreated {
            offer_id: id,
            seller: caller,
            energy_type,
            is_private,
        });
        Ok(id)
    }

    /// Post an encrypted energy demand. Symmetric to [`Self::create_offer`].
    pub fn create_demand(
        &mut self,
        caller: Address,
        amount: u32,
        max_price_per_kwh: u32,
        is_private: bool,
    ) -> Result<DemandId> {
        self.require_open()?;
        require_positive("amount", amount)?;
        require_positive("max price", max_price_per_kwh)?;

        let amount_handle = wrap_handle(self.oracle.encrypt(amount), caller, is_private);
        let cap_handle = wrap_handle(self.oracle.encrypt(max_price_per_kwh), caller, is_private);

        let id = self
            .book
            .insert_demand(caller, amount_handle, cap_handle, is_private, Utc::now());
        tracing::debug!(demand = %id, buyer = %caller, "Demand created");
        self.events.push(VenueEvent::DemandCreated {
            demand_id: id,
            buyer: caller,
            is_private,
        });
        Ok(id)
    }

    /// Cancel an ACTIVE offer. Poster only.
    pub fn cancel_offer(&mut self, caller: Address, id: OfferId) -> Result<()> {
        self.book.cancel_offer(caller, id)?;
        self.events.push(VenueEvent::OfferCancelled { offer_id: id });
        Ok(())
    }

    /// Cancel an ACTIVE demand. Poster only.
    pub fn cancel_demand(&mut self, caller: Address, id: DemandId) -> Result<()> {
        self.book.cancel_demand(caller, id)?;
        self.events.push(VenueEvent::DemandCancelled { demand_id: id });
        Ok(())
    }

    /// Grant a party decryption access to a private offer's quantities.
    pub fn grant_offer_access(
        &mut self,
        caller: Address,
        id: OfferId,
        grantee: Address,
    ) -> Result<()> {
        self.book.grant_offer_access(caller, id, grantee)
    }

    /// Grant a party decryption access to a private demand's quantities.
    pub fn grant_demand_access(
        &mut self,
        caller: Address,
        id: DemandId,
        grantee: Address,
    ) -> Result<()> {
        self.book.grant_demand_access(caller, id, grantee)
    }

    // =================================================================
    // Matching Engine entry point
    // =================================================================

    /// Match an offer against a demand.
    ///
    /// Atomically: validates the pairing, creates the trade with zeroed
    /// settlement fields, transitions both records to MATCHED, submits
    /// exactly one decryption request for the four encrypted quantities,
    /// and records `correlation id → trade id` so the callback routes to
    /// this trade no matter how many other matches are outstanding.
    pub fn match_trade(
        &mut self,
        caller: Address,
        offer_id: OfferId,
        demand_id: DemandId,
    ) -> Result<TradeId> {
        self.require_open()?;

        let offer = self.book.offer(offer_id)?;
        let demand = self.book.demand(demand_id)?;
        validate_pairing(caller, offer, demand)?;

        let seller = offer.seller;
        let buyer = demand.buyer;
        let energy_type = offer.energy_type;
        let handles = [
            offer.energy_amount.id,
            offer.price_per_kwh.id,
            demand.energy_needed.id,
            demand.max_price_per_kwh.id,
        ];

        // All validation passed; the remaining steps cannot fail short of
        // a broken invariant, so the mutation below is effectively atomic.
        self.book.mark_offer_matched(offer_id)?;
        self.book.mark_demand_matched(demand_id)?;
        let trade_id = self
            .trades
            .create(offer_id, demand_id, seller, buyer, energy_type, Utc::now());

        let correlation_id = self.oracle.request_decryption(handles);
        self.correlations.register(correlation_id, trade_id)?;

        tracing::info!(
            trade = %trade_id,
            offer = %offer_id,
            demand = %demand_id,
            correlation = %correlation_id,
            "Trade matched, decryption requested"
        );
        self.events.push(VenueEvent::TradeMatched {
            trade_id,
            offer_id,
            demand_id,
        });
        Ok(trade_id)
    }

    // =================================================================
    // Settlement entry point (oracle callback)
    // =================================================================

    /// Consume a decryption callback from the oracle.
    ///
    /// The authenticity proof is verified before any state is touched.
    /// Business-rule failures leave the trade pending and the correlation
    /// registered, so the oracle may redeliver (e.g. after the buyer tops
    /// up credits); the entry is consumed only on successful settlement.
    pub fn on_decryption_result(&mut self, result: &DecryptionResult) -> Result<TradeId> {
        result.verify(&self.config.oracle_key)?;

        let trade_id = self.correlations.resolve(result.correlation_id)?;
        let trade = self.trades.get_mut(trade_id)?;
        let settlement = settle_trade(trade, result.values, &mut self.ledger)?;
        self.correlations.consume(result.correlation_id)?;

        self.events.push(VenueEvent::TradeCompleted {
            trade_id: settlement.trade_id,
            seller: settlement.seller,
            buyer: settlement.buyer,
            energy_amount: settlement.energy_amount,
            trade_price: settlement.trade_price,
        });
        Ok(trade_id)
    }

    // =================================================================
    // Credits Ledger entry points
    // =================================================================

    /// Unconditional credits top-up for the caller.
    pub fn add_credits(&mut self, caller: Address, amount: u128) {
        self.ledger.top_up(caller, amount);
        self.events.push(VenueEvent::CreditsAdded {
            account: caller,
            amount,
        });
    }

    /// Credit balance of an account.
    #[must_use]
    pub fn credits_of(&self, account: Address) -> u128 {
        self.ledger.balance(account)
    }

    // =================================================================
    // Operator extension: abandon a stuck trade
    // =================================================================

    /// Abandon a pending trade whose settlement cannot complete.
    ///
    /// This is the documented unwind for the MATCHED dead-end: the trade
    /// is marked abandoned (terminal, like completion), both source
    /// records move MATCHED → CANCELLED, and the correlation entry is
    /// dropped so a late callback is rejected as unknown.
    pub fn abandon_trade(&mut self, caller: Address, trade_id: TradeId) -> Result<()> {
        self.require_operator(caller)?;

        let trade = self.trades.get(trade_id)?;
        if !trade.is_pending() {
            return Err(VenueError::InvalidState {
                reason: format!("{trade_id} is no longer pending"),
            });
        }
        let (offer_id, demand_id) = (trade.offer_id, trade.demand_id);

        self.book.unwind_offer(offer_id)?;
        self.book.unwind_demand(demand_id)?;
        self.trades.get_mut(trade_id)?.abandoned = true;
        self.correlations.remove_by_trade(trade_id);

        tracing::warn!(trade = %trade_id, "Trade abandoned by operator");
        self.events.push(VenueEvent::TradeAbandoned { trade_id });
        Ok(())
    }

    // =================================================================
    // Read accessors
    // =================================================================

    /// Full offer record.
    pub fn offer(&self, id: OfferId) -> Result<&Offer> {
        self.book.offer(id)
    }

    /// Full demand record.
    pub fn demand(&self, id: DemandId) -> Result<&Demand> {
        self.book.demand(id)
    }

    /// Full trade record.
    pub fn trade(&self, id: TradeId) -> Result<&Trade> {
        self.trades.get(id)
    }

    /// Offer ids posted by `poster`, in creation order.
    #[must_use]
    pub fn offers_of(&self, poster: Address) -> &[OfferId] {
        self.book.offers_of(poster)
    }

    /// Demand ids posted by `poster`, in creation order.
    #[must_use]
    pub fn demands_of(&self, poster: Address) -> &[DemandId] {
        self.book.demands_of(poster)
    }

    /// Total offers ever issued.
    #[must_use]
    pub fn offer_count(&self) -> u64 {
        self.book.offer_count()
    }

    /// Total demands ever issued.
    #[must_use]
    pub fn demand_count(&self) -> u64 {
        self.book.demand_count()
    }

    /// Total trades ever created.
    #[must_use]
    pub fn trade_count(&self) -> u64 {
        self.trades.count()
    }

    /// Decryption requests still awaiting their callback.
    #[must_use]
    pub fn outstanding_decryptions(&self) -> usize {
        self.correlations.outstanding()
    }

    /// Verify the credits conservation invariant.
    pub fn verify_conservation(&self) -> Result<()> {
        self.ledger.verify_conservation()
    }

    /// Events emitted so far (not yet drained).
    #[must_use]
    pub fn events(&self) -> &[VenueEvent] {
        &self.events
    }

    /// Drain the event log for delivery to external consumers.
    pub fn take_events(&mut self) -> Vec<VenueEvent> {
        std::mem::take(&mut self.events)
    }

    /// Access the oracle collaborator (tests drive callback delivery
    /// through this).
    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    // =================================================================
    // Snapshot / restore
    // =================================================================

    /// Capture the system-of-record state. Oracle-internal state is
    /// external and not included; the drainable event log is transient
    /// and not included either.
    #[must_use]
    pub fn snapshot(&self) -> VenueSnapshot {
        VenueSnapshot {
            config: self.config.clone(),
            session: self.sessions.current().clone(),
            book: self.book.clone(),
            trades: self.trades.clone(),
            correlations: self.correlations.export(),
            ledger: self.ledger.clone(),
        }
    }

    /// Rebuild a venue from a snapshot, reattaching an oracle collaborator.
    #[must_use]
    pub fn restore(snapshot: VenueSnapshot, oracle: O) -> Self {
        Self {
            config: snapshot.config,
            sessions: SessionManager::from_session(snapshot.session),
            book: snapshot.book,
            trades: snapshot.trades,
            correlations: CorrelationRegistry::import(snapshot.correlations),
            ledger: snapshot.ledger,
            events: Vec::new(),
            oracle,
        }
    }

    // =================================================================
    // Internal helpers
    // =================================================================

    fn require_operator(&self, caller: Address) -> Result<()> {
        if caller == self.config.operator {
            Ok(())
        } else {
            Err(VenueError::Unauthorized {
                reason: format!("{caller} is not the venue operator"),
            })
        }
    }

    fn require_open(&self) -> Result<()> {
        if self.sessions.is_active() {
            Ok(())
        } else {
            Err(VenueError::MarketClosed)
        }
    }
}

/// Private quantities get an owner-only ACL; public ones are decryptable
/// by any party without per-record consent.
fn wrap_handle(
    handle_id: voltmatch_types::HandleId,
    owner: Address,
    is_private: bool,
) -> CipherHandle {
    if is_private {
        CipherHandle::new(handle_id, owner)
    } else {
        CipherHandle::public(handle_id, owner)
    }
}

fn require_positive(what: &str, value: u32) -> Result<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(VenueError::InvalidArgument {
            reason: format!("{what} must be positive"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voltmatch_matching::MockOracle;

    fn addr(b: u8) -> Address {
        Address([b; 20])
    }

    const OPERATOR: u8 = 0xee;

    fn venue() -> Venue<MockOracle> {
        let oracle = MockOracle::new();
        let config = VenueConfig::new(addr(OPERATOR), oracle.verifying_key_bytes());
        Venue::new(config, oracle)
    }

    fn open_venue() -> Venue<MockOracle> {
        let mut v = venue();
        v.start_session(addr(OPERATOR)).unwrap();
        v
    }

    #[test]
    fn start_session_operator_only() {
        let mut v = venue();
        let err = v.start_session(addr(1)).unwrap_err();
        assert!(matches!(err, VenueError::Unauthorized { .. }));
        assert!(!v.is_session_open());

        v.start_session(addr(OPERATOR)).unwrap();
        assert!(v.is_session_open());
    }

    #[test]
    fn start_session_while_active_rejected() {
        let mut v = open_venue();
        let err = v.start_session(addr(OPERATOR)).unwrap_err();
        assert!(matches!(err, VenueError::SessionStillActive(_)));
    }

    #[test]
    fn set_duration_operator_only() {
        let mut v = open_venue();
        let err = v
            .set_session_duration(addr(1), std::time::Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, VenueError::Unauthorized { .. }));
        v.set_session_duration(addr(OPERATOR), std::time::Duration::from_secs(7200))
            .unwrap();
        assert_eq!(v.session().duration.as_secs(), 7200);
    }

    #[test]
    fn writes_require_open_session() {
        let mut v = venue();
        let err = v
            .create_offer(addr(1), 100, 10, EnergyType::Solar, false)
            .unwrap_err();
        assert!(matches!(err, VenueError::MarketClosed));
        let err = v.create_demand(addr(1), 100, 10, false).unwrap_err();
        assert!(matches!(err, VenueError::MarketClosed));
        assert_eq!(v.offer_count(), 0);
        assert_eq!(v.demand_count(), 0);
    }

    #[test]
    fn zero_quantities_rejected() {
        let mut v = open_venue();
        let err = v
            .create_offer(addr(1), 0, 10, EnergyType::Wind, false)
            .unwrap_err();
        assert!(matches!(err, VenueError::InvalidArgument { .. }));
        let err = v.create_demand(addr(1), 100, 0, false).unwrap_err();
        assert!(matches!(err, VenueError::InvalidArgument { .. }));
        // Failed validation never advances a counter.
        assert_eq!(v.offer_count(), 0);
        assert_eq!(v.demand_count(), 0);
    }

    #[test]
    fn private_offer_handles_are_restricted() {
        let mut v = open_venue();
        let id = v
            .create_offer(addr(1), 100, 10, EnergyType::Hydro, true)
            .unwrap();
        let offer = v.offer(id).unwrap();
        assert!(offer.is_private);
        assert!(!offer.energy_amount.is_public);
        assert!(!offer.is_accessible_to(addr(9)));
    }

    #[test]
    fn match_with_cancelled_offer_rejected_without_side_effects() {
        let mut v = open_venue();
        let offer_id = v
            .create_offer(addr(1), 100, 10, EnergyType::Solar, false)
            .unwrap();
        let demand_id = v.create_demand(addr(2), 100, 20, false).unwrap();
        v.cancel_offer(addr(1), offer_id).unwrap();

        let err = v.match_trade(addr(2), offer_id, demand_id).unwrap_err();
        assert!(matches!(err, VenueError::InvalidState { .. }));
        assert_eq!(v.trade_count(), 0);
        assert_eq!(v.outstanding_decryptions(), 0);
        // The demand is untouched.
        assert!(v.demand(demand_id).unwrap().is_active());
    }

    #[test]
    fn match_with_never_issued_id_rejected() {
        let mut v = open_venue();
        let demand_id = v.create_demand(addr(2), 100, 20, false).unwrap();
        let err = v.match_trade(addr(2), OfferId(5), demand_id).unwrap_err();
        assert!(matches!(err, VenueError::InvalidArgument { .. }));
        assert_eq!(v.trade_count(), 0);
    }

    #[test]
    fn match_creates_trade_and_request_atomically() {
        let mut v = open_venue();
        let offer_id = v
            .create_offer(addr(1), 100, 10, EnergyType::Solar, false)
            .unwrap();
        let demand_id = v.create_demand(addr(2), 100, 20, false).unwrap();

        let trade_id = v.match_trade(addr(2), offer_id, demand_id).unwrap();
        assert_eq!(trade_id, TradeId(1));
        assert_eq!(
            v.offer(offer_id).unwrap().status,
            voltmatch_types::OrderStatus::Matched
        );
        assert_eq!(
            v.demand(demand_id).unwrap().status,
            voltmatch_types::OrderStatus::Matched
        );
        assert_eq!(v.outstanding_decryptions(), 1);
        let trade = v.trade(trade_id).unwrap();
        assert!(trade.is_pending());
        assert_eq!(trade.energy_amount, 0);
    }

    #[test]
    fn abandon_requires_operator_and_pending_trade() {
        let mut v = open_venue();
        let offer_id = v
            .create_offer(addr(1), 100, 10, EnergyType::Solar, false)
            .unwrap();
        let demand_id = v.create_demand(addr(2), 100, 20, false).unwrap();
        let trade_id = v.match_trade(addr(2), offer_id, demand_id).unwrap();

        let err = v.abandon_trade(addr(1), trade_id).unwrap_err();
        assert!(matches!(err, VenueError::Unauthorized { .. }));

        v.abandon_trade(addr(OPERATOR), trade_id).unwrap();
        assert!(v.trade(trade_id).unwrap().abandoned);
        assert_eq!(
            v.offer(offer_id).unwrap().status,
            voltmatch_types::OrderStatus::Cancelled
        );
        assert_eq!(v.outstanding_decryptions(), 0);

        let err = v.abandon_trade(addr(OPERATOR), trade_id).unwrap_err();
        assert!(matches!(err, VenueError::InvalidState { .. }));
    }

    #[test]
    fn take_events_drains_log() {
        let mut v = open_venue();
        v.add_credits(addr(1), 100);
        let events = v.take_events();
        assert_eq!(events.len(), 2); // SessionStarted + CreditsAdded
        assert_eq!(events[0].kind(), "SESSION_STARTED");
        assert_eq!(events[1].kind(), "CREDITS_ADDED");
        assert!(v.events().is_empty());
    }
}
