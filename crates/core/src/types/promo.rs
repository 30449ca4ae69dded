//! Promotion codes.

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

const GENERATED_LEN: usize = 8;
const GENERATED_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Errors that can occur when parsing a [`PromoCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PromoCodeError {
    /// The code is shorter than the minimum.
    #[error("code must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The code is longer than the maximum.
    #[error("code must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The code contains a character outside `A-Z`, `0-9`, `-` and `_`.
    #[error("code may only contain letters, digits, '-' and '_'")]
    InvalidCharacter,
}

/// A customer-facing promotion code such as `SUMMER24`.
///
/// Codes are stored uppercase. Generated codes are 8 random alphanumeric
/// characters; they are a convenience, not a secret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromoCode(String);

impl PromoCode {
    /// Minimum length of a hand-entered code.
    pub const MIN_LENGTH: usize = 4;
    /// Maximum length of a hand-entered code.
    pub const MAX_LENGTH: usize = 20;

    /// Generate a random 8-character code.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let code = (0..GENERATED_LEN)
            .map(|_| {
                let idx = rng.random_range(0..GENERATED_ALPHABET.len());
                char::from(GENERATED_ALPHABET.get(idx).copied().unwrap_or(b'X'))
            })
            .collect();
        Self(code)
    }

    /// Parse a hand-entered code, normalising it to uppercase.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed code is outside 4-20 characters or
    /// contains anything other than ASCII letters, digits, `-` or `_`.
    pub fn parse(input: &str) -> Result<Self, PromoCodeError> {
        let code = input.trim().to_ascii_uppercase();

        if code.len() < Self::MIN_LENGTH {
            return Err(PromoCodeError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if code.len() > Self::MAX_LENGTH {
            return Err(PromoCodeError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(PromoCodeError::InvalidCharacter);
        }

        Ok(Self(code))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the code and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PromoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
