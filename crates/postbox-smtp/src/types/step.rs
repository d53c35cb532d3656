//! Steps of the delivery sequence.

use super::ReplyCode;
use std::fmt;

/// One step of the fixed command sequence.
///
/// Each step that talks to the server waits for exactly one reply code;
/// anything else ends the delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Server banner after connect.
    Greeting,
    /// `EHLO`, before or after STARTTLS.
    Ehlo,
    /// `STARTTLS`.
    StartTls,
    /// `AUTH LOGIN`.
    AuthLogin,
    /// Base64 username.
    AuthUsername,
    /// Base64 password.
    AuthPassword,
    /// `MAIL FROM`.
    MailFrom,
    /// `RCPT TO`.
    RcptTo,
    /// `DATA`.
    Data,
    /// Message payload terminated by `.`.
    Message,
    /// `QUIT`.
    Quit,
}

impl Step {
    /// Returns the reply code this step requires, if any.
    #[must_use]
    pub const fn expected(self) -> Option<ReplyCode> {
        match self {
            Self::Greeting | Self::StartTls => Some(ReplyCode::SERVICE_READY),
            Self::Ehlo | Self::MailFrom | Self::RcptTo | Self::Message => Some(ReplyCode::OK),
            Self::AuthLogin | Self::AuthUsername => Some(ReplyCode::AUTH_CONTINUE),
            Self::AuthPassword => Some(ReplyCode::AUTH_SUCCESS),
            Self::Data => Some(ReplyCode::START_DATA),
            Self::Quit => None,
        }
    }

    /// Returns a short human-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Ehlo => "EHLO",
            Self::StartTls => "STARTTLS",
            Self::AuthLogin => "AUTH LOGIN",
            Self::AuthUsername => "AUTH username",
            Self::AuthPassword => "AUTH password",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
            Self::Data => "DATA",
            Self::Message => "message data",
            Self::Quit => "QUIT",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_codes() {
        assert_eq!(Step::Greeting.expected(), Some(ReplyCode::new(220)));
        assert_eq!(Step::Ehlo.expected(), Some(ReplyCode::new(250)));
        assert_eq!(Step::StartTls.expected(), Some(ReplyCode::new(220)));
        assert_eq!(Step::AuthLogin.expected(), Some(ReplyCode::new(334)));
        assert_eq!(Step::AuthUsername.expected(), Some(ReplyCode::new(334)));
        assert_eq!(Step::AuthPassword.expected(), Some(ReplyCode::new(235)));
        assert_eq!(Step::MailFrom.expected(), Some(ReplyCode::new(250)));
        assert_eq!(Step::RcptTo.expected(), Some(ReplyCode::new(250)));
        assert_eq!(Step::Data.expected(), Some(ReplyCode::new(354)));
        assert_eq!(Step::Message.expected(), Some(ReplyCode::new(250)));
        assert_eq!(Step::Quit.expected(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Step::RcptTo.to_string(), "RCPT TO");
        assert_eq!(Step::Message.to_string(), "message data");
    }
}
