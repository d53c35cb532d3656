//! Envelope address type.

use crate::error::{Error, Result};

/// Email address for the SMTP envelope (`MAIL FROM` / `RCPT TO`).
///
/// Addresses are expected to be validated upstream; construction only strips
/// CR and LF so the address can be interpolated into a command line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Creates a new address from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is left after stripping line breaks and
    /// surrounding whitespace.
    pub fn new(addr: &str) -> Result<Self> {
        let addr: String = addr.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
        let addr = addr.trim();
        if addr.is_empty() {
            return Err(Error::Config("address cannot be empty".into()));
        }
        Ok(Self(addr.to_string()))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
