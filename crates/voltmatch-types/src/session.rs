//! Trading session types.
//!
//! The venue accepts order-book writes and match calls only while a
//! session is open. A session is *active* iff `now - started_at` is
//! within its duration; exactly one session exists at any time, and
//! starting a new one is legal only once the current one has expired.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{SessionId, constants};

/// A bounded trading window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// Monotonically increasing session number.
    pub id: SessionId,
    /// When this session opened.
    pub started_at: DateTime<Utc>,
    /// How long the session stays open. Duration changes take effect
    /// immediately, including for the running session.
    pub duration: Duration,
}

impl Session {
    /// The genesis placeholder: session 0, started at the UNIX epoch,
    /// always expired. The operator must start session 1 before the
    /// venue accepts any orders.
    #[must_use]
    pub fn genesis(duration: Duration) -> Self {
        Self {
            id: SessionId(0),
            started_at: DateTime::UNIX_EPOCH,
            duration,
        }
    }

    /// Pure activity check against an explicit clock reading.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match (now - self.started_at).to_std() {
            Ok(elapsed) => elapsed <= self.duration,
            // `now` before `started_at` only happens under clock skew;
            // the session has trivially not expired yet.
            Err(_) => true,
        }
    }

    /// Activity check against the wall clock.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }
}

/// Session timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    /// Duration each session stays open.
    pub duration: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(constants::DEFAULT_SESSION_DURATION_SECS),
        }
    }
}
