//! Error types for SMTP delivery.

use crate::types::{Reply, Step};
use std::io;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
///
/// Every variant is terminal: the delivery stops at the first error and the
/// connection is closed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The socket could not be opened (refused, unreachable, timed out).
    #[error("Connection to {address} failed: {source}")]
    Connect {
        /// `host:port` that was dialed.
        address: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// TLS could not be established, at connect time or after STARTTLS.
    #[error("TLS negotiation failed: {0}")]
    Tls(#[source] io::Error),

    /// Server answered a step with an unexpected reply code.
    #[error("{step} failed: {}", .reply.text())]
    Protocol {
        /// Step that was rejected.
        step: Step,
        /// Server reply, verbatim.
        reply: Reply,
    },

    /// Server sent something that is not an SMTP reply.
    #[error("Invalid reply: {0}")]
    InvalidReply(String),

    /// Connection closed, a bound was exceeded, or I/O failed mid-exchange.
    #[error("Stream error: {0}")]
    Stream(#[from] io::Error),

    /// Configuration or message values were rejected before connecting.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Creates a protocol error for a rejected step.
    #[must_use]
    pub const fn rejected(step: Step, reply: Reply) -> Self {
        Self::Protocol { step, reply }
    }

    /// Creates a stream error of the given kind.
    #[must_use]
    pub fn stream(kind: io::ErrorKind, message: impl Into<String>) -> Self {
        Self::Stream(io::Error::new(kind, message.into()))
    }

    /// Returns the server reply behind a protocol error.
    #[must_use]
    pub const fn reply(&self) -> Option<&Reply> {
        match self {
            Self::Protocol { reply, .. } => Some(reply),
            _ => None,
        }
    }

    /// Returns true if the connection or TLS session could not be established.
    #[must_use]
    pub const fn is_connect(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Tls(_))
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::Protocol { reply, .. } if reply.is_permanent_error())
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Protocol { reply, .. } if reply.is_transient_error())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;
    use crate::types::ReplyCode;

    #[test]
    fn test_protocol_error_carries_reply_verbatim() {
        let reply = Reply::new(
            ReplyCode::MAILBOX_UNAVAILABLE,
            vec!["5.1.1 User unknown".to_string()],
        );
        let err = Error::rejected(Step::RcptTo, reply);
        assert_eq!(err.to_string(), "RCPT TO failed: 550 5.1.1 User unknown");
        assert!(err.is_permanent());
        assert!(!err.is_transient());
        assert!(!err.is_connect());
        assert_eq!(err.reply().unwrap().code, ReplyCode::MAILBOX_UNAVAILABLE);
    }

    #[test]
    fn test_transient_classification() {
        let reply = Reply::new(ReplyCode::MAILBOX_BUSY, vec!["try later".to_string()]);
        assert!(Error::rejected(Step::MailFrom, reply).is_transient());
    }

    #[test]
    fn test_connect_classification() {
        let err = Error::Connect {
            address: "smtp.example.com:587".into(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        assert!(err.is_connect());
        assert!(err.to_string().starts_with("Connection to smtp.example.com:587 failed"));
        assert!(Error::Tls(io::Error::other("bad certificate")).is_connect());
        assert!(!Error::stream(io::ErrorKind::UnexpectedEof, "closed").is_connect());
    }
}
