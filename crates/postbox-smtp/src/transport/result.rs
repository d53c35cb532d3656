//! Delivery outcome handed back to callers.

use crate::error::Result;

/// Outcome of one delivery attempt.
///
/// `error` is empty on success. On failure it holds either the last server
/// reply or a description of the connection failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransportResult {
    /// Whether the server accepted the message.
    pub ok: bool,
    /// Human-readable failure description.
    pub error: String,
}

impl TransportResult {
    /// A successful delivery.
    #[must_use]
    pub const fn success() -> Self {
        Self {
            ok: true,
            error: String::new(),
        }
    }

    /// A failed delivery.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }

    /// Returns true if the message was accepted.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.ok
    }
}

impl From<Result<()>> for TransportResult {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => Self::success(),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}
