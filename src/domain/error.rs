//! Domain validation errors for core domain types.
//!
//! These errors are returned by parsing constructors such as
//! [`Address::parse`](super::id::Address::parse) and surface to users as
//! rejected command input.
//!
//! # Examples
//!
//! ```
//! use perpwatch::domain::error::DomainError;
//! use perpwatch::domain::id::Address;
//!
//! let result = Address::parse("0x1234");
//! assert!(matches!(result, Err(DomainError::InvalidAddress(_))));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Addresses must be `0x` followed by 40 hex digits.
    #[error("invalid address format: {0}")]
    InvalidAddress(String),

    /// Recipient identities must be integer chat IDs.
    #[error("invalid recipient id: {0}")]
    InvalidRecipient(String),
}
