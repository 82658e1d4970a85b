//! Human-enterable verification codes for reward collection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Code alphabet with ambiguous characters removed (no 0/O/1/I) so a code
/// read over a counter survives transcription.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Fixed code length. 32^6 gives ~1.07 billion codes.
pub const CODE_LEN: usize = 6;

/// A 6-character collection code, globally unique across progress records.
///
/// Uniqueness is enforced by the storage layer; this type only guarantees the
/// alphabet and length. Randomness is injected so the domain stays
/// deterministic under test.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Generate a code using the supplied random index source.
    ///
    /// `pick` is called once per character and must return an index; it is
    /// reduced modulo the alphabet size.
    pub fn generate_with(mut pick: impl FnMut() -> usize) -> Self {
        let code: String = (0..CODE_LEN)
            .map(|_| CODE_ALPHABET[pick() % CODE_ALPHABET.len()] as char)
            .collect();
        Self(code)
    }

    /// Parse a user-entered code, normalizing case and surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_uppercase();
        if normalized.len() != CODE_LEN {
            return Err(DomainError::validation(format!(
                "verification code must be {CODE_LEN} characters"
            )));
        }
        if !normalized.bytes().all(|b| CODE_ALPHABET.contains(&b)) {
            return Err(DomainError::validation(
                "verification code contains invalid characters",
            ));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
