//! # voltmatch-venue
//!
//! The serialized entry-point facade of the Voltmatch venue.
//!
//! ## Architecture
//!
//! [`Venue`] composes the four planes behind one surface:
//!
//! ```text
//! Order Book → Matching Engine → Decryption Oracle → (async) → Settlement → Credits Ledger
//! ```
//!
//! Every public method executes as one indivisible, serialized step with
//! no partial writes on failure. The session manager gates order-book
//! writes and matching; the only asynchronous boundary is the decryption
//! request/callback pair, routed by the explicit correlation registry.
//!
//! [`VenueSnapshot`] captures the system-of-record state for durability
//! across restarts.

pub mod snapshot;
pub mod venue;

pub use snapshot::VenueSnapshot;
pub use venue::Venue;
