//! # postbox-smtp
//!
//! A small SMTP client that delivers one HTML message per connection.
//!
//! ## Features
//!
//! - **Type-state connection management**: compile-time enforcement of the
//!   command order, from greeting to QUIT
//! - **TLS support**: implicit TLS (port 465) and STARTTLS, verified against
//!   the webpki root store
//! - **Authentication**: AUTH LOGIN
//! - **Bounded I/O**: connect and per-operation timeouts, capped reply size
//!
//! ## Quick Start
//!
//! ```no_run
//! use postbox_smtp::{ConnectionConfig, HtmlMessage, Security, SmtpTransport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConnectionConfig::builder("smtp.example.com", "noreply@example.com")
//!         .security(Security::StartTls)
//!         .credentials("noreply@example.com", "app-password")
//!         .sender_name("Contact Form")
//!         .build()?;
//!
//!     let message = HtmlMessage::new("owner@example.com", "New enquiry", "<p>Hello</p>")?
//!         .with_reply_to("visitor@example.org");
//!
//!     let result = SmtpTransport::new(config).send(&message).await;
//!     if !result.ok {
//!         eprintln!("delivery failed: {}", result.error);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! ┌──────────────┐
//! │  Connected   │ ─── auth_login() ───→ Authenticated
//! └──────────────┘                             │
//!        │                                     │
//!        └─── mail_from() ───→ MailTransaction ←┘
//!                                    │
//!                rcpt_to() ───→ RecipientAdded ─── data() ───→ Data
//!                                                               │
//!                              Delivered ←─── send_message() ───┘
//! ```
//!
//! ## Modules
//!
//! - [`command`]: SMTP command serialization and DATA encoding
//! - [`connection`]: streams, framing and the type-state client
//! - [`parser`]: reply parser
//! - [`transport`]: one-shot delivery built on the client
//! - [`types`]: addresses, extensions, replies and exchange steps

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod transport;
pub mod types;

pub use connection::{
    Authenticated, Client, Connected, Data, Delivered, MailTransaction, RecipientAdded,
    ServerInfo, SmtpConnection, SmtpStream, TlsUpgrade,
};
pub use error::{Error, Result};
pub use postbox_mime::{HtmlMessage, Mailbox};
pub use transport::{ConnectionConfig, Credentials, Security, SmtpTransport, TransportResult};
pub use types::{Address, Extension, Reply, ReplyCode, Step};
