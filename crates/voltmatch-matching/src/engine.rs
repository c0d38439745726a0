//! Pairing validation for `match_trade`.
//!
//! Pure checks over an already-resolved offer/demand pair: statuses,
//! self-trade prevention, and the privacy ACL. Session gating and id
//! resolution happen at the venue facade before these run; the trade
//! record and decryption request are created only after they all pass.

use voltmatch_types::{Address, Demand, Offer, OrderStatus, Result, VenueError};

/// Validate that `caller` may match `offer` against `demand`.
///
/// # Errors
/// - [`VenueError::InvalidState`] if either record is not ACTIVE
/// - [`VenueError::InvalidArgument`] if the pairing is a self-trade
/// - [`VenueError::Unauthorized`] if a private record's ACL excludes the caller
pub fn validate_pairing(caller: Address, offer: &Offer, demand: &Demand) -> Result<()> {
    if offer.status != OrderStatus::Active {
        return Err(VenueError::InvalidState {
            reason: format!("offer {} is {}, expected ACTIVE", offer.id, offer.status),
        });
    }
    if demand.status != OrderStatus::Active {
        return Err(VenueError::InvalidState {
            reason: format!("demand {} is {}, expected ACTIVE", demand.id, demand.status),
        });
    }

    if offer.seller == demand.buyer {
        tracing::warn!(
            party = %offer.seller,
            offer = %offer.id,
            demand = %demand.id,
            "Self-trade blocked: same party on both sides"
        );
        return Err(VenueError::InvalidArgument {
            reason: format!("self-trade: {} posted both {} and {}", offer.seller, offer.id, demand.id),
        });
    }

    // Private records may only be matched by an involved party or an
    // explicit grantee. The counterparty of the pairing always counts
    // as involved.
    if offer.is_private && caller != demand.buyer && !offer.is_accessible_to(caller) {
        return Err(VenueError::Unauthorized {
            reason: format!("{caller} has no access to private {}", offer.id),
        });
    }
    if demand.is_private && caller != offer.seller && !demand.is_accessible_to(caller) {
        return Err(VenueError::Unauthorized {
            reason: format!("{caller} has no access to private {}", demand.id),
        });
    }

    Ok(())
}
