//! Decryption oracle interface.
//!
//! The oracle is an external coprocessor: the venue submits encrypted
//! handles and receives, at some arbitrarily later point, a signed
//! callback carrying the plaintexts. This module defines:
//!
//! - [`DecryptionOracle`]: the request-side boundary (encrypt, request)
//! - [`DecryptionResult`]: the callback payload with its ed25519 proof
//! - [`MockOracle`]: a deterministic in-memory oracle for tests, behind
//!   the `test-helpers` feature
//!
//! The venue must tolerate unbounded delay between request and callback,
//! including "never" — nothing here blocks.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use voltmatch_types::{CorrelationId, HandleId, Result, RevealedValues, VenueError, constants};

/// Request-side boundary of the external decryption coprocessor.
///
/// `request_decryption` returns immediately with a unique correlation id;
/// the revealed plaintexts arrive later via `on_decryption_result` on the
/// venue, carrying that id.
pub trait DecryptionOracle {
    /// Encrypt a plaintext under the coprocessor's key, returning the
    /// opaque handle id. ACL management stays on the venue side.
    fn encrypt(&mut self, plaintext: u32) -> HandleId;

    /// Submit the four handles of a matched pair for decryption, in
    /// canonical order: offer amount, offer price, demand amount,
    /// demand price cap.
    fn request_decryption(
        &mut self,
        handles: [HandleId; constants::HANDLES_PER_REQUEST],
    ) -> CorrelationId;
}

/// Authenticity proof attached to every oracle callback: an ed25519
/// signature over the callback's canonical payload digest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OracleProof {
    pub signature: Vec<u8>,
}

/// The oracle's asynchronous callback payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecryptionResult {
    /// Links this callback to the request that produced it.
    pub correlation_id: CorrelationId,
    /// The revealed plaintext quartet.
    pub values: RevealedValues,
    /// Signature binding the correlation id and plaintexts together.
    pub proof: OracleProof,
}

impl DecryptionResult {
    /// Canonical signed bytes:
    /// `context || correlation_id(16) || 4 × u32 LE plaintexts`.
    #[must_use]
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(64);
        payload.extend_from_slice(constants::ORACLE_SIGNING_CONTEXT);
        payload.extend_from_slice(self.correlation_id.0.as_bytes());
        payload.extend_from_slice(&self.values.offer_amount.to_le_bytes());
        payload.extend_from_slice(&self.values.offer_price.to_le_bytes());
        payload.extend_from_slice(&self.values.demand_amount.to_le_bytes());
        payload.extend_from_slice(&self.values.demand_max_price.to_le_bytes());
        payload
    }

    /// SHA-256 digest of the canonical payload — the bytes that are signed.
    #[must_use]
    pub fn payload_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.signing_payload());
        hasher.finalize().into()
    }

    /// Verify the proof against the venue's configured oracle key.
    ///
    /// Must run before any state mutation: a callback that fails here is
    /// discarded without touching the correlation registry.
    ///
    /// # Errors
    /// Returns [`VenueError::OracleAuthenticity`] on any parse or
    /// verification failure.
    pub fn verify(&self, oracle_key: &[u8; 32]) -> Result<()> {
        let key = VerifyingKey::from_bytes(oracle_key).map_err(|e| {
            VenueError::OracleAuthenticity {
                reason: format!("bad oracle key: {e}"),
            }
        })?;
        let signature = Signature::from_slice(&self.proof.signature).map_err(|e| {
            VenueError::OracleAuthenticity {
                reason: format!("malformed signature: {e}"),
            }
        })?;
        key.verify(&self.payload_digest(), &signature)
            .map_err(|e| VenueError::OracleAuthenticity {
                reason: format!("signature verification failed: {e}"),
            })
    }
}

// ---------------------------------------------------------------------------
// MockOracle — test collaborator
// ---------------------------------------------------------------------------

/// In-memory oracle for tests. **Never use in production** — it keeps
/// plaintexts locally, which defeats the entire confidentiality model.
///
/// Delivery is explicit: tests call [`MockOracle::deliver`] in whatever
/// order they want, so out-of-order and never-delivered callbacks are
/// trivial to exercise.
#[cfg(any(test, feature = "test-helpers"))]
pub struct MockOracle {
    signing_key: ed25519_dalek::SigningKey,
    plaintexts: std::collections::HashMap<HandleId, u32>,
    requests: std::collections::HashMap<CorrelationId, [HandleId; constants::HANDLES_PER_REQUEST]>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl MockOracle {
    /// Create a mock oracle with a fresh random signing key.
    #[must_use]
    pub fn new() -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng),
            plaintexts: std::collections::HashMap::new(),
            requests: std::collections::HashMap::new(),
        }
    }

    /// The verifying key to place into [`voltmatch_types::VenueConfig`].
    #[must_use]
    pub fn verifying_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Number of requests that have not been delivered yet.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    /// Correlation ids of all undelivered requests, in arbitrary order.
    #[must_use]
    pub fn pending_ids(&self) -> Vec<CorrelationId> {
        self.requests.keys().copied().collect()
    }

    /// Produce the signed callback for an outstanding request, consuming
    /// it. Returns `None` for unknown correlation ids.
    pub fn deliver(&mut self, correlation_id: CorrelationId) -> Option<DecryptionResult> {
        let handles = self.requests.remove(&correlation_id)?;
        let plain = |h: HandleId| self.plaintexts.get(&h).copied().unwrap_or(0);
        let values = RevealedValues {
            offer_amount: plain(handles[0]),
            offer_price: plain(handles[1]),
            demand_amount: plain(handles[2]),
            demand_max_price: plain(handles[3]),
        };
        Some(self.sign_result(correlation_id, values))
    }

    /// Like [`Self::deliver`] but keeps the request outstanding, so the
    /// same callback can be redelivered (e.g. after a settlement-time
    /// business failure).
    pub fn redeliverable(&mut self, correlation_id: CorrelationId) -> Option<DecryptionResult> {
        let handles = *self.requests.get(&correlation_id)?;
        let plain = |h: HandleId| self.plaintexts.get(&h).copied().unwrap_or(0);
        let values = RevealedValues {
            offer_amount: plain(handles[0]),
            offer_price: plain(handles[1]),
            demand_amount: plain(handles[2]),
            demand_max_price: plain(handles[3]),
        };
        Some(self.sign_result(correlation_id, values))
    }

    /// Sign arbitrary revealed values under an arbitrary correlation id.
    /// Lets tests forge structurally valid callbacks for orphan and
    /// replay scenarios.
    #[must_use]
    pub fn sign_result(
        &self,
        correlation_id: CorrelationId,
        values: RevealedValues,
    ) -> DecryptionResult {
        use ed25519_dalek::Signer;
        let mut result = DecryptionResult {
            correlation_id,
            values,
            proof: OracleProof { signature: vec![] },
        };
        let signature = self.signing_key.sign(&result.payload_digest());
        result.proof.signature = signature.to_bytes().to_vec();
        result
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl DecryptionOracle for MockOracle {
    fn encrypt(&mut self, plaintext: u32) -> HandleId {
        let id = HandleId::new();
        self.plaintexts.insert(id, plaintext);
        id
    }

    fn request_decryption(
        &mut self,
        handles: [HandleId; constants::HANDLES_PER_REQUEST],
    ) -> CorrelationId {
        let correlation_id = CorrelationId::new();
        self.requests.insert(correlation_id, handles);
        correlation_id
    }
}
