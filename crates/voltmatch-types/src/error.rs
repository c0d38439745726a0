//! Error types for the Voltmatch venue.
//!
//! All errors use the `VM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Session / authorization errors
//! - 2xx: Order book errors
//! - 4xx: Oracle callback errors
//! - 5xx: Settlement / credits errors
//! - 9xx: General / internal errors
//!
//! Every failure maps to exactly one variant so callers can distinguish
//! "retry later" (market closed) from "never retry" (authorization, bad
//! argument) from "escalate to operator" (oracle and settlement failures).

use thiserror::Error;

use crate::{CorrelationId, SessionId};

/// Central error enum for all Voltmatch operations.
#[derive(Debug, Error)]
pub enum VenueError {
    // =================================================================
    // Session / Authorization Errors (1xx)
    // =================================================================
    /// The caller is not allowed to perform this operation.
    #[error("VM_ERR_100: unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// A new session cannot start while the current one is active.
    #[error("VM_ERR_101: session {0} is still active")]
    SessionStillActive(SessionId),

    /// No trading session is currently open.
    #[error("VM_ERR_102: market closed: no active trading session")]
    MarketClosed,

    // =================================================================
    // Order Book Errors (2xx)
    // =================================================================
    /// A structurally invalid input: never-issued id, non-positive
    /// quantity, or a self-trade pairing.
    #[error("VM_ERR_200: invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// A status precondition was violated (e.g. cancelling a record that
    /// is not ACTIVE).
    #[error("VM_ERR_201: invalid state: {reason}")]
    InvalidState { reason: String },

    // =================================================================
    // Oracle Callback Errors (4xx)
    // =================================================================
    /// The callback's authenticity proof failed verification.
    #[error("VM_ERR_400: oracle proof verification failed: {reason}")]
    OracleAuthenticity { reason: String },

    /// No pending trade matches this correlation id (already settled,
    /// abandoned, or never issued).
    #[error("VM_ERR_401: no pending trade for correlation id {0}")]
    UnknownCorrelation(CorrelationId),

    // =================================================================
    // Settlement / Credits Errors (5xx)
    // =================================================================
    /// Revealed offer price exceeds the revealed demand cap; the trade
    /// cannot clear.
    #[error("VM_ERR_500: price mismatch: offer price {offer_price} exceeds demand max {max_price}")]
    PriceMismatch { offer_price: u32, max_price: u32 },

    /// The buyer's credit balance cannot cover the settlement payment.
    #[error("VM_ERR_501: insufficient credits: need {needed}, have {available}")]
    InsufficientCredits { needed: u128, available: u128 },

    /// Credits conservation invariant violated — critical safety alert.
    #[error("VM_ERR_502: credits conservation violation: {reason}")]
    ConservationViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("VM_ERR_900: internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error (snapshots).
    #[error("VM_ERR_901: serialization error: {0}")]
    Serialization(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, VenueError>;

/// How a caller should react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Transient: the same call may succeed later (e.g. next session).
    RetryLater,
    /// Deterministic rejection: retrying the identical call cannot succeed.
    NeverRetry,
    /// Requires operator attention (oracle or settlement failure).
    Escalate,
}

impl VenueError {
    /// Classify this error for the caller's retry policy.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MarketClosed | Self::SessionStillActive(_) => ErrorClass::RetryLater,
            Self::Unauthorized { .. }
            | Self::InvalidArgument { .. }
            | Self::InvalidState { .. }
            | Self::UnknownCorrelation(_) => ErrorClass::NeverRetry,
            Self::OracleAuthenticity { .. }
            | Self::PriceMismatch { .. }
            | Self::InsufficientCredits { .. }
            | Self::ConservationViolation { .. }
            | Self::Internal(_)
            | Self::Serialization(_) => ErrorClass::Escalate,
        }
    }
}

impl From<serde_json::Error> for VenueError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_in_display() {
        let err = VenueError::MarketClosed;
        assert!(err.to_string().contains("VM_ERR_102"));

        let err = VenueError::PriceMismatch {
            offer_price: 70,
            max_price: 60,
        };
        let s = err.to_string();
        assert!(s.contains("VM_ERR_500"));
        assert!(s.contains("70"));
        assert!(s.contains("60"));
    }

    #[test]
    fn retry_classification() {
        assert_eq!(VenueError::MarketClosed.class(), ErrorClass::RetryLater);
        assert_eq!(
            VenueError::Unauthorized {
                reason: "not the operator".into()
            }
            .class(),
            ErrorClass::NeverRetry,
        );
        assert_eq!(
            VenueError::InsufficientCredits {
                needed: 10,
                available: 0
            }
            .class(),
            ErrorClass::Escalate,
        );
    }

    #[test]
    fn serde_error_converts() {
        let bad: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: VenueError = bad.unwrap_err().into();
        assert!(matches!(err, VenueError::Serialization(_)));
    }
}
