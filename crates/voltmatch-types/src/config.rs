//! Venue configuration.

use serde::{Deserialize, Serialize};

use crate::{Address, SessionConfig};

/// Static configuration of a Voltmatch venue instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VenueConfig {
    /// The venue operator: the only party allowed to start sessions,
    /// change session timing, and abandon stuck trades.
    pub operator: Address,
    /// Ed25519 verifying key of the decryption oracle. Every settlement
    /// callback must carry a signature that verifies under this key.
    pub oracle_key: [u8; 32],
    /// Session timing.
    pub session: SessionConfig,
}

impl VenueConfig {
    #[must_use]
    pub fn new(operator: Address, oracle_key: [u8; 32]) -> Self {
        Self {
            operator,
            oracle_key,
            session: SessionConfig::default(),
        }
    }
}
