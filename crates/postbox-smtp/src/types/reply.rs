//! SMTP reply types.

/// SMTP reply from server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply code (e.g., 250).
    pub code: ReplyCode,
    /// Reply message lines, without the code prefix.
    pub message: Vec<String>,
    raw: String,
}

impl Reply {
    /// Creates a new reply, synthesizing the raw wire text.
    #[must_use]
    pub fn new(code: ReplyCode, message: Vec<String>) -> Self {
        let last = message.len().saturating_sub(1);
        let raw = if message.is_empty() {
            code.to_string()
        } else {
            message
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    let sep = if i == last { ' ' } else { '-' };
                    format!("{code}{sep}{line}")
                })
                .collect::<Vec<_>>()
                .join("\n")
        };
        Self { code, message, raw }
    }

    /// Creates a reply keeping the lines exactly as received.
    pub(crate) fn from_wire(code: ReplyCode, message: Vec<String>, lines: &[String]) -> Self {
        Self {
            code,
            message,
            raw: lines.join("\n"),
        }
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub const fn is_transient_error(&self) -> bool {
        self.code.is_transient()
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent_error(&self) -> bool {
        self.code.is_permanent()
    }

    /// Returns the reply as received, codes included (`250-Hello\n250 OK`).
    #[must_use]
    pub fn text(&self) -> &str {
        &self.raw
    }
}

/// SMTP reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// Creates a new reply code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns true if this is a success code (2xx).
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub const fn is_transient(self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        self.0 >= 500 && self.0 < 600
    }

    /// Returns true if this is an intermediate reply (3xx).
    #[must_use]
    pub const fn is_intermediate(self) -> bool {
        self.0 >= 300 && self.0 < 400
    }
}

impl std::fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Codes the delivery sequence waits for
impl ReplyCode {
    /// 220 Service ready
    pub const SERVICE_READY: Self = Self(220);
    /// 221 Service closing transmission channel
    pub const CLOSING: Self = Self(221);
    /// 235 Authentication succeeded
    pub const AUTH_SUCCESS: Self = Self(235);
    /// 250 Requested mail action okay, completed
    pub const OK: Self = Self(250);
    /// 334 Continue with authentication
    pub const AUTH_CONTINUE: Self = Self(334);
    /// 354 Start mail input
    pub const START_DATA: Self = Self(354);
    /// 421 Service not available, closing transmission channel
    pub const SERVICE_UNAVAILABLE: Self = Self(421);
    /// 450 Mailbox unavailable (busy)
    pub const MAILBOX_BUSY: Self = Self(450);
    /// 535 Authentication credentials invalid
    pub const AUTH_FAILED: Self = Self(535);
    /// 550 Mailbox unavailable (not found, access denied)
    pub const MAILBOX_UNAVAILABLE: Self = Self(550);
    /// 554 Transaction failed
    pub const TRANSACTION_FAILED: Self = Self(554);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    mod reply_code_tests {
        use super::*;

        #[test]
        fn classes() {
            assert!(ReplyCode::OK.is_success());
            assert!(ReplyCode::SERVICE_READY.is_success());
            assert!(ReplyCode::AUTH_SUCCESS.is_success());
            assert!(ReplyCode::AUTH_CONTINUE.is_intermediate());
            assert!(ReplyCode::START_DATA.is_intermediate());
            assert!(ReplyCode::MAILBOX_BUSY.is_transient());
            assert!(ReplyCode::SERVICE_UNAVAILABLE.is_transient());
            assert!(ReplyCode::MAILBOX_UNAVAILABLE.is_permanent());
            assert!(ReplyCode::AUTH_FAILED.is_permanent());
            assert!(!ReplyCode::OK.is_transient());
            assert!(!ReplyCode::OK.is_permanent());
        }

        #[test]
        fn display() {
            assert_eq!(format!("{}", ReplyCode::OK), "250");
            assert_eq!(ReplyCode::new(354).as_u16(), 354);
        }
    }

    mod reply_tests {
        use super::*;

        #[test]
        fn text_single_line() {
            let reply = Reply::new(ReplyCode::OK, vec!["Message sent".to_string()]);
            assert_eq!(reply.text(), "250 Message sent");
            assert_eq!(reply.message, vec!["Message sent"]);
        }

        #[test]
        fn text_multiple_lines() {
            let reply = Reply::new(
                ReplyCode::OK,
                vec!["smtp.example.com".to_string(), "STARTTLS".to_string()],
            );
            assert_eq!(reply.text(), "250-smtp.example.com\n250 STARTTLS");
        }

        #[test]
        fn text_empty() {
            let reply = Reply::new(ReplyCode::OK, vec![]);
            assert_eq!(reply.text(), "250");
            assert!(reply.message.is_empty());
        }

        #[test]
        fn text_from_wire_is_verbatim() {
            let lines = vec!["550 5.1.1 <nobody@example.com>: User unknown".to_string()];
            let reply = Reply::from_wire(
                ReplyCode::MAILBOX_UNAVAILABLE,
                vec!["5.1.1 <nobody@example.com>: User unknown".to_string()],
                &lines,
            );
            assert_eq!(reply.text(), lines[0]);
            assert!(reply.is_permanent_error());
        }
    }
}
