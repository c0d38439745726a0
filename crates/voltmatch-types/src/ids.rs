//! Identifiers used throughout Voltmatch.
//!
//! Offer, demand, and trade ids come from per-store monotonic counters
//! starting at 1 — ids are never reused, even for cancelled records.
//! Correlation and cipher-handle ids use UUIDv7 for time-ordered sorting.
//! Addresses are 20-byte account identifiers rendered as `0x`-prefixed hex.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A participant account address (20 raw bytes).
///
/// Serialized as a `0x`-prefixed lowercase hex string so it can be used
/// as a JSON map key in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Address(pub [u8; 20]);

impl Address {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Short hex prefix for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let hex_part = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(hex_part).map_err(de::Error::custom)?;
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| de::Error::custom("address must be exactly 20 bytes"))?;
        Ok(Self(arr))
    }
}

// ---------------------------------------------------------------------------
// Counter-backed ids: OfferId / DemandId / TradeId / SessionId
// ---------------------------------------------------------------------------

macro_rules! counter_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl $name {
            #[must_use]
            pub fn next(self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

counter_id!(
    /// Identifier of an energy offer. Offers and demands use independent
    /// counter namespaces.
    OfferId,
    "offer"
);

counter_id!(
    /// Identifier of an energy demand.
    DemandId,
    "demand"
);

counter_id!(
    /// Identifier of a matched trade.
    TradeId,
    "trade"
);

counter_id!(
    /// Identifier of a trading session. Advances every time the operator
    /// starts a new session.
    SessionId,
    "session"
);

// ---------------------------------------------------------------------------
// CorrelationId
// ---------------------------------------------------------------------------

/// Unique token linking a decryption request to its eventual oracle
/// callback. UUIDv7 keeps tokens time-ordered and collision-free across
/// any number of concurrently outstanding matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CorrelationId(pub Uuid);

impl CorrelationId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "corr:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// HandleId
// ---------------------------------------------------------------------------

/// Identifier of an encrypted-value handle issued by the coprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct HandleId(pub Uuid);

impl HandleId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_display_roundtrip() {
        let addr = Address([0xab; 20]);
        let s = addr.to_string();
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 42);
    }

    #[test]
    fn address_serde_roundtrip() {
        let addr = Address([7u8; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert!(json.contains("0x"));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }

    #[test]
    fn address_rejects_wrong_length() {
        let err = serde_json::from_str::<Address>("\"0xabcd\"");
        assert!(err.is_err());
    }

    #[test]
    fn address_usable_as_json_map_key() {
        use std::collections::BTreeMap;
        let mut map = BTreeMap::new();
        map.insert(Address([1u8; 20]), 42u64);
        let json = serde_json::to_string(&map).unwrap();
        let back: BTreeMap<Address, u64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(&Address([1u8; 20])), Some(&42));
    }

    #[test]
    fn counter_ids_advance() {
        assert_eq!(OfferId(1).next(), OfferId(2));
        assert_eq!(DemandId(9).next(), DemandId(10));
        assert_eq!(TradeId(0).next(), TradeId(1));
        assert_eq!(SessionId(0).next(), SessionId(1));
    }

    #[test]
    fn counter_id_display() {
        assert_eq!(OfferId(3).to_string(), "offer:3");
        assert_eq!(DemandId(3).to_string(), "demand:3");
        assert_eq!(TradeId(7).to_string(), "trade:7");
    }

    #[test]
    fn correlation_id_uniqueness() {
        let a = CorrelationId::new();
        let b = CorrelationId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn handle_id_serde_roundtrip() {
        let id = HandleId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: HandleId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
