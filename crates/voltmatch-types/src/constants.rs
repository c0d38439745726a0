//! System-wide constants for the Voltmatch venue.

/// Default trading session duration in seconds (one hour).
pub const DEFAULT_SESSION_DURATION_SECS: u64 = 3600;

/// First id issued by every counter-backed store (offers, demands, trades).
pub const FIRST_ID: u64 = 1;

/// Domain-separation context for the oracle's signed callback payload.
pub const ORACLE_SIGNING_CONTEXT: &[u8] = b"voltmatch:oracle:v1:";

/// Number of encrypted handles bundled per decryption request:
/// offer amount, offer price, demand amount, demand price cap.
pub const HANDLES_PER_REQUEST: usize = 4;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Voltmatch";
