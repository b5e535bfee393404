//! Domain identifier types with proper encapsulation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Number of hex digits after the `0x` prefix of an on-chain address.
const ADDRESS_HEX_LEN: usize = 40;

/// Monitored on-chain account address - newtype for type safety.
///
/// Only constructed through [`Address::parse`], so every value is a
/// `0x`-prefixed 40 hex digit string. Case is preserved as entered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and validate an address.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidAddress`] unless the input is `0x`
    /// followed by exactly 40 hex digits.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if Self::is_valid(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(DomainError::InvalidAddress(raw.to_string()))
        }
    }

    /// Check the address format without allocating.
    #[must_use]
    pub fn is_valid(raw: &str) -> bool {
        raw.strip_prefix("0x").is_some_and(|hex| {
            hex.len() == ADDRESS_HEX_LEN && hex.chars().all(|c| c.is_ascii_hexdigit())
        })
    }

    /// Get the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The only address form ever shown to users.
    #[must_use]
    pub fn short(&self) -> String {
        shorten(&self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// Chat identity that can receive notifications and issue commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecipientId(i64);

impl RecipientId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecipientId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| DomainError::InvalidRecipient(s.to_string()))
    }
}

impl From<i64> for RecipientId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Shorten an identifier to its first 6 and last 4 characters.
///
/// Identifiers of 10 characters or fewer are returned unchanged.
#[must_use]
pub fn shorten(id: &str) -> String {
    let len = id.chars().count();
    if len <= 10 {
        return id.to_string();
    }
    let head: String = id.chars().take(6).collect();
    let tail: String = id.chars().skip(len - 4).collect();
    format!("{head}...{tail}")
}
