//! Opaque encrypted-value handles.
//!
//! A [`CipherHandle`] references a ciphertext held by the external
//! coprocessor. The venue never sees plaintext or raw ciphertext bytes —
//! it only tracks *who may request decryption* via the handle's
//! owner-capability set. Plaintexts surface exclusively through the
//! decryption oracle's signed callback.

use serde::{Deserialize, Serialize};

use crate::{Address, HandleId};

/// Opaque reference to an encrypted quantity plus its decryption ACL.
///
/// The capability set is additive: the owner always has access, explicit
/// grantees can be appended, and a handle minted with public scope is
/// decryptable by any party without per-handle consent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CipherHandle {
    /// Coprocessor-issued handle id.
    pub id: HandleId,
    /// The party that encrypted the value.
    pub owner: Address,
    /// Additional parties granted decryption access.
    pub grantees: Vec<Address>,
    /// Public scope: any party may request decryption.
    pub is_public: bool,
}

impl CipherHandle {
    /// Wrap a coprocessor handle with an owner-only ACL.
    #[must_use]
    pub fn new(id: HandleId, owner: Address) -> Self {
        Self {
            id,
            owner,
            grantees: Vec::new(),
            is_public: false,
        }
    }

    /// Wrap a coprocessor handle with public decryption scope.
    #[must_use]
    pub fn public(id: HandleId, owner: Address) -> Self {
        Self {
            id,
            owner,
            grantees: Vec::new(),
            is_public: true,
        }
    }

    /// Append a grantee. Idempotent.
    pub fn grant(&mut self, grantee: Address) {
        if !self.grantees.contains(&grantee) {
            self.grantees.push(grantee);
        }
    }

    /// Whether `who` may submit this handle for decryption.
    #[must_use]
    pub fn may_decrypt(&self, who: Address) -> bool {
        self.is_public || self.owner == who || self.grantees.contains(&who)
    }
}
