//! # voltmatch-matching
//!
//! Pairing validation, trade creation, and the decryption-oracle boundary.
//!
//! ## Architecture
//!
//! A `match_trade` call flows through:
//! 1. [`engine::validate_pairing`] — status, self-trade, and privacy checks
//! 2. [`TradeStore::create`] — the zeroed trade record
//! 3. [`DecryptionOracle::request_decryption`] — one request per match
//! 4. [`CorrelationRegistry::register`] — the `correlation id → trade id`
//!    mapping that routes the eventual callback
//!
//! The registry is the correctness-preserving state: callbacks are routed
//! through it explicitly, never by "most recent trade" recency, so any
//! number of matches can be outstanding at once and settle out of order.

pub mod correlation;
pub mod engine;
pub mod oracle;
pub mod trades;

pub use correlation::CorrelationRegistry;
pub use engine::validate_pairing;
#[cfg(any(test, feature = "test-helpers"))]
pub use oracle::MockOracle;
pub use oracle::{DecryptionOracle, DecryptionResult, OracleProof};
pub use trades::TradeStore;
