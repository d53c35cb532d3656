//! SMTP connection management with type-state pattern.

mod client;
mod framed;
mod stream;

pub use client::{
    Authenticated, Client, Connected, Data, Delivered, MailTransaction, RecipientAdded,
    SmtpConnection,
};
pub use framed::{FramedStream, MAX_LINE_LENGTH, MAX_REPLY_LINES};
pub use stream::{SmtpStream, TlsUpgrade, connect, connect_tls};

use crate::types::Extension;
use std::collections::HashSet;

/// Server capabilities from EHLO response.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from greeting.
    pub hostname: String,
    /// Supported extensions.
    pub extensions: HashSet<Extension>,
}

impl ServerInfo {
    /// Checks if the server supports an extension.
    #[must_use]
    pub fn supports(&self, ext: &Extension) -> bool {
        self.extensions.contains(ext)
    }

    /// Checks if STARTTLS is supported.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.supports(&Extension::StartTls)
    }

    /// Returns the maximum message size, if advertised.
    #[must_use]
    pub fn max_message_size(&self) -> Option<usize> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Size(size) => *size,
            _ => None,
        })
    }

    /// Returns the advertised authentication mechanisms.
    #[must_use]
    pub fn auth_mechanisms(&self) -> &[String] {
        self.extensions
            .iter()
            .find_map(|ext| match ext {
                Extension::Auth(mechanisms) => Some(mechanisms.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }
}
