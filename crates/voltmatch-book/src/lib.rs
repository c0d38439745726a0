//! # voltmatch-book
//!
//! Session gating and the confidential order book.
//!
//! ## Architecture
//!
//! - [`SessionManager`]: owns the single current trading session; the
//!   venue accepts order-book writes and match calls only while it is
//!   active.
//! - [`OrderBook`]: offer/demand stores keyed by monotonic ids, one-way
//!   status transitions, per-poster append-only indices, and ACL grants
//!   on the encrypted quantities.
//!
//! All records hold [`voltmatch_types::CipherHandle`]s — this crate never
//! touches a plaintext quantity.

pub mod book;
pub mod session;

pub use book::OrderBook;
pub use session::SessionManager;
