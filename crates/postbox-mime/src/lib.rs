//! # postbox-mime
//!
//! Builds the RFC 5322 text of a single HTML message.
//!
//! ## Features
//!
//! - **Header safety**: CR and LF are stripped from every caller-supplied value,
//!   so a field can never open a new header line
//! - **RFC 2047 encoding**: non-ASCII subjects and display names become
//!   `=?UTF-8?B?...?=` encoded words
//! - **Fixed layout**: `From`, `To`, `Subject`, `MIME-Version`, `Content-Type`
//!   and an optional `Reply-To`
//!
//! ## Quick Start
//!
//! ```
//! use postbox_mime::{HtmlMessage, Mailbox};
//!
//! let from = Mailbox::with_name("Front Desk", "desk@example.com");
//! let message = HtmlMessage::new("owner@example.com", "New enquiry", "<p>Hi</p>")?
//!     .with_reply_to("visitor@example.org");
//!
//! let text = message.render(&from);
//! assert!(text.starts_with("From: Front Desk <desk@example.com>\r\n"));
//! # Ok::<(), postbox_mime::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod encoding;
mod error;
mod header;
mod message;

pub use error::{Error, Result};
pub use header::Headers;
pub use message::{HtmlMessage, Mailbox};
