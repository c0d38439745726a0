//! Session manager — tracks the single current trading session.
//!
//! Operator authorization is enforced at the venue facade; this module
//! only owns the session record and its legal transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use voltmatch_types::{Result, Session, SessionConfig, SessionId, VenueError};

/// Owns the current [`Session`] and gates its lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionManager {
    session: Session,
}

impl SessionManager {
    /// Start at the genesis placeholder (session 0, already expired).
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            session: Session::genesis(config.duration),
        }
    }

    /// Rebuild from a snapshotted session record.
    #[must_use]
    pub fn from_session(session: Session) -> Self {
        Self { session }
    }

    /// The current session record.
    #[must_use]
    pub fn current(&self) -> &Session {
        &self.session
    }

    /// Whether the venue is open for order-book writes and matching.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    /// Pure activity check against an explicit clock reading.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.session.is_active_at(now)
    }

    /// Start a new session at `now`.
    ///
    /// # Errors
    /// Returns [`VenueError::SessionStillActive`] if the current session
    /// has not yet expired.
    pub fn start_new(&mut self, now: DateTime<Utc>) -> Result<SessionId> {
        if self.session.is_active_at(now) {
            return Err(VenueError::SessionStillActive(self.session.id));
        }
        self.session = Session {
            id: self.session.id.next(),
            started_at: now,
            duration: self.session.duration,
        };
        tracing::info!(session = %self.session.id, "Trading session started");
        Ok(self.session.id)
    }

    /// Change the session duration. Takes effect immediately, including
    /// for the currently running session's expiry.
    pub fn set_duration(&mut self, duration: std::time::Duration) {
        self.session.duration = duration;
    }
}
