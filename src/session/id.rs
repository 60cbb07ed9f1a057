use std::fmt;

use base64::{engine::general_purpose, Engine as _};
use rand::{CryptoRng, RngCore};

/// Number of random bytes behind every session identifier.
pub const SESSION_ID_BYTES: usize = 32;

/// An opaque session identifier: the standard base64 encoding of
/// [`SESSION_ID_BYTES`] random bytes.
///
/// A `SessionId` can only be produced by generating it from a cryptographic
/// RNG or by parsing a value that decodes to exactly 32 bytes, so arbitrary
/// client input never ends up as a storage key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Encodes the given bytes. Deterministic: the same bytes always yield the same id.
    pub fn from_bytes(bytes: &[u8; SESSION_ID_BYTES]) -> Self {
        SessionId(general_purpose::STANDARD.encode(bytes))
    }

    /// Draws a fresh identifier from `rng`.
    pub fn generate_with<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        rng.fill_bytes(&mut bytes);
        Self::from_bytes(&bytes)
    }

    /// Accepts an incoming identifier only if it is canonical base64 of 32 bytes.
    pub fn parse(raw: &str) -> Option<Self> {
        let decoded = general_purpose::STANDARD.decode(raw).ok()?;
        if decoded.len() != SESSION_ID_BYTES {
            return None;
        }
        Some(SessionId(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Identifiers are bearer secrets; keep them out of debug logs.
impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionId(..)")
    }
}

/// Generates a new session identifier from the thread-local CSPRNG.
pub fn create_session_id() -> SessionId {
    SessionId::generate_with(&mut rand::rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_from_bytes_is_base64_of_input() {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = (i * 7) as u8;
        }
        let id = SessionId::from_bytes(&bytes);
        let decoded = general_purpose::STANDARD
            .decode(id.as_str())
            .expect("id should be valid base64");
        assert_eq!(decoded, bytes);
        assert_eq!(id, SessionId::from_bytes(&bytes));
    }

    #[test]
    fn test_zero_bytes_encoding() {
        let id = SessionId::from_bytes(&[0u8; SESSION_ID_BYTES]);
        assert_eq!(id.as_str(), format!("{}=", "A".repeat(43)));
    }

    #[test]
    fn test_generated_ids_are_44_chars_and_distinct() {
        let a = create_session_id();
        let b = create_session_id();
        assert_eq!(a.as_str().len(), 44);
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_with_seeded_rng_is_reproducible() {
        let a = SessionId::generate_with(&mut StdRng::seed_from_u64(7));
        let b = SessionId::generate_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_accepts_generated_id() {
        let id = create_session_id();
        assert_eq!(SessionId::parse(id.as_str()), Some(id));
    }

    #[test]
    fn test_parse_rejects_wrong_length_and_garbage() {
        let short = general_purpose::STANDARD.encode([1u8; 16]);
        assert!(SessionId::parse(&short).is_none());
        assert!(SessionId::parse("not base64 at all!").is_none());
        assert!(SessionId::parse("").is_none());
    }

    #[test]
    fn test_debug_does_not_leak_value() {
        let id = create_session_id();
        assert_eq!(format!("{:?}", id), "SessionId(..)");
        assert_eq!(id.to_string(), id.as_str());
    }
}
