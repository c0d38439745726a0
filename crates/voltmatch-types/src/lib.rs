//! # voltmatch-types
//!
//! Shared types, errors, and configuration for the **Voltmatch**
//! confidential energy trading venue.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OfferId`], [`DemandId`], [`TradeId`], [`SessionId`],
//!   [`CorrelationId`], [`HandleId`], [`Address`]
//! - **Encrypted values**: [`CipherHandle`] with its owner-capability ACL
//! - **Order model**: [`Offer`], [`Demand`], [`EnergyType`], [`OrderStatus`]
//! - **Trade model**: [`Trade`], [`RevealedValues`]
//! - **Session model**: [`Session`], [`SessionConfig`]
//! - **Events**: [`VenueEvent`]
//! - **Configuration**: [`VenueConfig`]
//! - **Errors**: [`VenueError`] with `VM_ERR_` prefix codes and
//!   [`ErrorClass`] retry classification

pub mod cipher;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod order;
pub mod session;
pub mod trade;

// Re-export all primary types at crate root for ergonomic imports:
//   use voltmatch_types::{Offer, Demand, Trade, VenueError, ...};

pub use cipher::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use order::*;
pub use session::*;
pub use trade::*;

// Constants are accessed via `voltmatch_types::constants::FOO`
// (not re-exported to avoid name collisions).
