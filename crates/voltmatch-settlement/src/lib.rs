//! # voltmatch-settlement
//!
//! Settlement execution and the credits ledger.
//!
//! ## Architecture
//!
//! The settlement path receives an already-verified, already-correlated
//! oracle callback and:
//! 1. Validates the revealed prices cross (`offer_price <= demand_max`)
//! 2. Computes the clearing amount (`min` of the two sides) and price
//!    (the seller's quote)
//! 3. Executes the balance-preserving ledger transfer
//! 4. Fills the trade's settlement fields exactly once
//!
//! Conservation invariant: `Σ(balances) == Σ(top-ups)` at all times.

pub mod engine;
pub mod ledger;

pub use engine::{Settlement, settle_trade};
pub use ledger::CreditsLedger;
