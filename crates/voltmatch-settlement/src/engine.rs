//! Settlement engine — consumes verified oracle callbacks.
//!
//! Runs after proof verification and correlation resolution. Validates
//! the revealed values against the trade's preconditions, computes the
//! clearing amount and price, executes the ledger transfer, and fills
//! the trade exactly once.
//!
//! Business-rule failures (price mismatch, insufficient credits) are
//! terminal for the attempt but not for the trade: nothing is mutated,
//! the trade stays pending, and the operator either waits for a
//! redelivery (after a top-up) or abandons the trade.

use voltmatch_types::{Address, Result, RevealedValues, Trade, TradeId, VenueError};

use crate::ledger::CreditsLedger;

/// The outcome of a successful settlement, for event emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub trade_id: TradeId,
    pub seller: Address,
    pub buyer: Address,
    pub energy_amount: u32,
    pub trade_price: u32,
    pub total_payment: u128,
}

/// Settle a pending trade against the revealed plaintexts.
///
/// Clearing rules:
/// - `energy_amount = min(offer_amount, demand_amount)`
/// - `trade_price = offer_price` (the seller's quote clears, not a midpoint)
/// - `total_payment = energy_amount * trade_price`, debited from the
///   buyer and credited to the seller in one balance-preserving move
///
/// # Errors
/// - [`VenueError::InvalidState`] if the trade is not pending
/// - [`VenueError::PriceMismatch`] if the offer price exceeds the demand cap
/// - [`VenueError::InsufficientCredits`] if the buyer cannot fund the payment
///
/// On any error no state changes: the ledger is untouched and the trade
/// keeps its zeroed settlement fields.
pub fn settle_trade(
    trade: &mut Trade,
    revealed: RevealedValues,
    ledger: &mut CreditsLedger,
) -> Result<Settlement> {
    if !trade.is_pending() {
        return Err(VenueError::InvalidState {
            reason: format!("{} is no longer pending", trade.id),
        });
    }

    if !revealed.prices_cross() {
        tracing::warn!(
            trade = %trade.id,
            offer_price = revealed.offer_price,
            max_price = revealed.demand_max_price,
            "Settlement rejected: revealed prices do not cross"
        );
        return Err(VenueError::PriceMismatch {
            offer_price: revealed.offer_price,
            max_price: revealed.demand_max_price,
        });
    }

    let energy_amount = revealed.clearing_amount();
    let trade_price = revealed.offer_price;
    let total_payment = u128::from(energy_amount) * u128::from(trade_price);

    // Ledger transfer first: it is the only fallible step left, and it
    // mutates nothing on failure. The trade is filled only afterwards.
    ledger.transfer(trade.buyer, trade.seller, total_payment)?;

    trade.energy_amount = energy_amount;
    trade.trade_price = trade_price;
    trade.completed = true;

    tracing::info!(
        trade = %trade.id,
        seller = %trade.seller,
        buyer = %trade.buyer,
        amount = energy_amount,
        price = trade_price,
        payment = total_payment,
        "Trade settled"
    );

    Ok(Settlement {
        trade_id: trade.id,
        seller: trade.seller,
        buyer: trade.buyer,
        energy_amount,
        trade_price,
        total_payment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use voltmatch_types::{DemandId, EnergyType, OfferId};

    fn addr(b: u8) -> Address {
        Address([b; 20])
    }

    fn pending_trade() -> Trade {
        Trade {
            id: TradeId(1),
            offer_id: OfferId(1),
            demand_id: DemandId(1),
            seller: addr(1),
            buyer: addr(2),
            energy_amount: 0,
            trade_price: 0,
            energy_type: EnergyType::Solar,
            created_at: Utc::now(),
            completed: false,
            abandoned: false,
        }
    }

    fn revealed(oa: u32, op: u32, da: u32, dp: u32) -> RevealedValues {
        RevealedValues {
            offer_amount: oa,
            offer_price: op,
            demand_amount: da,
            demand_max_price: dp,
        }
    }

    #[test]
    fn reference_scenario_settles() {
        // offer(1000 @ 50), demand(800, cap 60) => 800 @ 50 = 40_000.
        let mut trade = pending_trade();
        let mut ledger = CreditsLedger::new();
        ledger.top_up(addr(2), 50_000);

        let s = settle_trade(&mut trade, revealed(1000, 50, 800, 60), &mut ledger).unwrap();
        assert_eq!(s.energy_amount, 800);
        assert_eq!(s.trade_price, 50);
        assert_eq!(s.total_payment, 40_000);

        assert!(trade.completed);
        assert_eq!(trade.energy_amount, 800);
        assert_eq!(trade.trade_price, 50);
        assert_eq!(ledger.balance(addr(2)), 10_000);
        assert_eq!(ledger.balance(addr(1)), 40_000);
        ledger.verify_conservation().unwrap();
    }

    #[test]
    fn price_mismatch_leaves_trade_pending() {
        let mut trade = pending_trade();
        let mut ledger = CreditsLedger::new();
        ledger.top_up(addr(2), 1_000_000);

        let err = settle_trade(&mut trade, revealed(100, 70, 100, 60), &mut ledger).unwrap_err();
        assert!(matches!(
            err,
            VenueError::PriceMismatch {
                offer_price: 70,
                max_price: 60
            }
        ));
        assert!(trade.is_pending());
        assert_eq!(trade.energy_amount, 0);
        assert_eq!(ledger.balance(addr(2)), 1_000_000);
    }

    #[test]
    fn equal_prices_cross() {
        let mut trade = pending_trade();
        let mut ledger = CreditsLedger::new();
        ledger.top_up(addr(2), 6_000);
        let s = settle_trade(&mut trade, revealed(100, 60, 100, 60), &mut ledger).unwrap();
        assert_eq!(s.total_payment, 6_000);
    }

    #[test]
    fn insufficient_credits_leaves_trade_pending() {
        let mut trade = pending_trade();
        let mut ledger = CreditsLedger::new();
        ledger.top_up(addr(2), 100);

        let err = settle_trade(&mut trade, revealed(1000, 50, 800, 60), &mut ledger).unwrap_err();
        assert!(matches!(err, VenueError::InsufficientCredits { .. }));
        assert!(trade.is_pending());
        assert_eq!(ledger.balance(addr(2)), 100);
        assert_eq!(ledger.balance(addr(1)), 0);
    }

    #[test]
    fn retry_after_top_up_succeeds() {
        let mut trade = pending_trade();
        let mut ledger = CreditsLedger::new();
        ledger.top_up(addr(2), 100);
        let values = revealed(1000, 50, 800, 60);

        assert!(settle_trade(&mut trade, values, &mut ledger).is_err());
        ledger.top_up(addr(2), 40_000);
        settle_trade(&mut trade, values, &mut ledger).unwrap();
        assert!(trade.completed);
    }

    #[test]
    fn settled_trade_cannot_settle_again() {
        let mut trade = pending_trade();
        let mut ledger = CreditsLedger::new();
        ledger.top_up(addr(2), 100_000);
        let values = revealed(10, 5, 10, 5);

        settle_trade(&mut trade, values, &mut ledger).unwrap();
        let err = settle_trade(&mut trade, values, &mut ledger).unwrap_err();
        assert!(matches!(err, VenueError::InvalidState { .. }));
        // Fields stayed at the first settlement's values.
        assert_eq!(trade.energy_amount, 10);
        assert_eq!(ledger.balance(addr(2)), 100_000 - 50);
    }

    #[test]
    fn abandoned_trade_rejected() {
        let mut trade = pending_trade();
        trade.abandoned = true;
        let mut ledger = CreditsLedger::new();
        let err = settle_trade(&mut trade, revealed(1, 1, 1, 1), &mut ledger).unwrap_err();
        assert!(matches!(err, VenueError::InvalidState { .. }));
    }

    #[test]
    fn max_values_do_not_overflow() {
        let mut trade = pending_trade();
        let mut ledger = CreditsLedger::new();
        let payment = u128::from(u32::MAX) * u128::from(u32::MAX);
        ledger.top_up(addr(2), payment);

        let s = settle_trade(
            &mut trade,
            revealed(u32::MAX, u32::MAX, u32::MAX, u32::MAX),
            &mut ledger,
        )
        .unwrap();
        assert_eq!(s.total_payment, payment);
        assert_eq!(ledger.balance(addr(1)), payment);
    }
}
