//! SMTP command builder.

use crate::types::Address;

/// SMTP command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// EHLO - Extended greeting
    Ehlo {
        /// Client identity
        hostname: String,
    },
    /// STARTTLS - Upgrade to TLS
    StartTls,
    /// AUTH LOGIN - Begin LOGIN authentication
    AuthLogin,
    /// Base64 answer to a 334 challenge
    AuthResponse(String),
    /// MAIL FROM - Start mail transaction
    MailFrom {
        /// Sender address
        from: Address,
    },
    /// RCPT TO - Add recipient
    RcptTo {
        /// Recipient address
        to: Address,
    },
    /// DATA - Begin message data
    Data,
    /// QUIT - Close connection
    Quit,
}

impl Command {
    /// Serializes the command to bytes, CRLF included.
    ///
    /// CR and LF inside interpolated values are dropped, so the result is
    /// always exactly one line.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        match self {
            Self::Ehlo { hostname } => {
                buf.extend_from_slice(b"EHLO ");
                push_value(&mut buf, hostname);
            }
            Self::StartTls => {
                buf.extend_from_slice(b"STARTTLS");
            }
            Self::AuthLogin => {
                buf.extend_from_slice(b"AUTH LOGIN");
            }
            Self::AuthResponse(response) => {
                push_value(&mut buf, response);
            }
            Self::MailFrom { from } => {
                buf.extend_from_slice(b"MAIL FROM:<");
                push_value(&mut buf, from.as_str());
                buf.push(b'>');
            }
            Self::RcptTo { to } => {
                buf.extend_from_slice(b"RCPT TO:<");
                push_value(&mut buf, to.as_str());
                buf.push(b'>');
            }
            Self::Data => {
                buf.extend_from_slice(b"DATA");
            }
            Self::Quit => {
                buf.extend_from_slice(b"QUIT");
            }
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }

    /// Returns the command as it may appear in logs.
    ///
    /// Authentication responses are redacted.
    #[must_use]
    pub fn log_line(&self) -> String {
        match self {
            Self::AuthResponse(_) => "<credentials>".to_string(),
            _ => String::from_utf8_lossy(&self.serialize())
                .trim_end()
                .to_string(),
        }
    }
}

fn push_value(buf: &mut Vec<u8>, value: &str) {
    buf.extend(value.bytes().filter(|b| !matches!(b, b'\r' | b'\n')));
}

/// Prepares a message for the DATA phase.
///
/// Line endings are normalized to CRLF, lines starting with `.` are
/// dot-stuffed (RFC 5321 section 4.5.2) and the terminating `.` line is
/// appended.
#[must_use]
pub fn encode_data(message: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(message.len() + message.len() / 32 + 5);

    let body = message.strip_suffix(b"\n").unwrap_or(message);
    let body = body.strip_suffix(b"\r").unwrap_or(body);

    if !message.is_empty() {
        for line in body.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);

            // Byte-stuff lines starting with '.'
            if line.first() == Some(&b'.') {
                buf.push(b'.');
            }

            buf.extend_from_slice(line);
            buf.extend_from_slice(b"\r\n");
        }
    }

    buf.extend_from_slice(b".\r\n");
    buf
}
