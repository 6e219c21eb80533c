//! EUI-64 identity normalization.
//!
//! Every index key in the store is an EUI-64 in canonical form: 16
//! lowercase hex characters, no separators. Inputs may carry hyphens,
//! whitespace and mixed case; anything that does not reduce to exactly
//! 16 hex digits is rejected.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The input could not be reduced to a valid EUI-64.
#[derive(Debug, Clone, thiserror::Error)]
#[error("not a valid eui: {0}")]
pub struct InvalidEuiError(pub String);

/// A 64-bit hardware or organisation identifier.
///
/// Equality, ordering and hashing are defined on the canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Eui([u8; 8]);

impl Eui {
    /// Parses an EUI from a string, stripping whitespace and hyphens
    /// and lowercasing before validation.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidEuiError`] if the stripped input is not exactly
    /// 16 hex digits.
    pub fn new(input: &str) -> Result<Self, InvalidEuiError> {
        let stripped: String = input
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect::<String>()
            .to_lowercase();
        if stripped.len() != 16 || !stripped.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidEuiError(stripped));
        }
        let mut bytes = [0u8; 8];
        for (i, byte) in bytes.iter_mut().enumerate() {
            // cannot fail, validated above
            *byte = u8::from_str_radix(&stripped[2 * i..2 * i + 2], 16)
                .map_err(|_| InvalidEuiError(stripped.clone()))?;
        }
        Ok(Self(bytes))
    }

    /// Builds an EUI from its raw 8-byte form.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidEuiError`] unless exactly 8 bytes are given.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InvalidEuiError> {
        let arr: [u8; 8] = bytes
            .try_into()
            .map_err(|_| InvalidEuiError(to_hex(bytes)))?;
        Ok(Self(arr))
    }

    /// The canonical form: 16 lowercase hex characters.
    #[must_use]
    pub fn canonical(&self) -> String {
        to_hex(&self.0)
    }

    /// Hyphen-separated byte pairs (`a1-a2-a3-a4-a5-a6-a7-a8`), the
    /// subject format expected by the remote directory.
    #[must_use]
    pub fn hyphenated(&self) -> String {
        self.0
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Raw big-endian bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

impl fmt::Display for Eui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl FromStr for Eui {
    type Err = InvalidEuiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Eui {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical())
    }
}

impl<'de> Deserialize<'de> for Eui {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(D::Error::custom)
    }
}
