//! Credits ledger — per-address balances funding settlement.
//!
//! Balances change through exactly two paths: unconditional top-up and
//! the settlement transfer (debit buyer, credit seller, same amount).
//! The ledger tracks cumulative top-ups so the conservation invariant
//! is checkable at any time:
//!
//! ```text
//! Σ(balances) == Σ(top-ups)
//! ```
//!
//! Settlement is balance-preserving; if the invariant ever breaks,
//! something has gone catastrophically wrong.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use voltmatch_types::{Address, Result, VenueError};

/// Per-address credit balances plus the conservation counter.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreditsLedger {
    balances: BTreeMap<Address, u128>,
    total_top_ups: u128,
}

impl CreditsLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional top-up. The reference design treats this as a
    /// trust-me deposit not backed by an external value transfer — a
    /// documented simplification, kept as-is.
    pub fn top_up(&mut self, account: Address, amount: u128) {
        *self.balances.entry(account).or_insert(0) += amount;
        self.total_top_ups += amount;
    }

    /// Atomic settlement transfer: debit `from`, credit `to`.
    ///
    /// # Errors
    /// Returns [`VenueError::InsufficientCredits`] without mutating
    /// anything if `from` cannot cover `amount`.
    pub fn transfer(&mut self, from: Address, to: Address, amount: u128) -> Result<()> {
        let available = self.balance(from);
        if available < amount {
            return Err(VenueError::InsufficientCredits {
                needed: amount,
                available,
            });
        }
        *self.balances.entry(from).or_insert(0) -= amount;
        *self.balances.entry(to).or_insert(0) += amount;
        Ok(())
    }

    /// Current balance of `account` (zero if never seen).
    #[must_use]
    pub fn balance(&self, account: Address) -> u128 {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    /// Sum of all balances.
    #[must_use]
    pub fn total_supply(&self) -> u128 {
        self.balances.values().sum()
    }

    /// Cumulative top-ups since genesis.
    #[must_use]
    pub fn total_top_ups(&self) -> u128 {
        self.total_top_ups
    }

    /// Verify the conservation invariant.
    ///
    /// # Errors
    /// Returns [`VenueError::ConservationViolation`] if the sum of
    /// balances has diverged from the sum of top-ups.
    pub fn verify_conservation(&self) -> Result<()> {
        let supply = self.total_supply();
        if supply != self.total_top_ups {
            return Err(VenueError::ConservationViolation {
                reason: format!(
                    "total supply {supply} != cumulative top-ups {}",
                    self.total_top_ups
                ),
            });
        }
        Ok(())
    }
}
