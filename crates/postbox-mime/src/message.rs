//! The single HTML message delivered by postbox.

use crate::encoding::{encode_display_name, encode_rfc2047, strip_line_breaks};
use crate::error::{Error, Result};
use crate::header::Headers;
use std::fmt;

/// Sender mailbox (optional display name + address).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    name: Option<String>,
    address: String,
}

impl Mailbox {
    /// Creates a mailbox with just an address.
    #[must_use]
    pub fn new(address: &str) -> Self {
        Self {
            name: None,
            address: clean(address),
        }
    }

    /// Creates a mailbox with a display name and address.
    ///
    /// An empty display name is treated as absent.
    #[must_use]
    pub fn with_name(name: &str, address: &str) -> Self {
        let name = clean(name);
        Self {
            name: (!name.is_empty()).then_some(name),
            address: clean(address),
        }
    }

    /// Returns the display name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for Mailbox {
    /// Formats the mailbox as a header value: `Name <address>` or `<address>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", encode_display_name(name), self.address),
            None => write!(f, "<{}>", self.address),
        }
    }
}

/// An HTML email with one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlMessage {
    to: String,
    subject: String,
    html_body: String,
    reply_to: Option<String>,
}

impl HtmlMessage {
    /// Creates a new message.
    ///
    /// CR and LF are stripped from the recipient and subject. The body is
    /// kept verbatim and may be empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipient or subject is empty.
    pub fn new(to: &str, subject: &str, html_body: impl Into<String>) -> Result<Self> {
        let to = clean(to);
        if to.is_empty() {
            return Err(Error::MissingField("recipient"));
        }

        let subject = clean(subject);
        if subject.is_empty() {
            return Err(Error::MissingField("subject"));
        }

        Ok(Self {
            to,
            subject,
            html_body: html_body.into(),
            reply_to: None,
        })
    }

    /// Sets the `Reply-To` address. An empty address leaves it unset.
    #[must_use]
    pub fn with_reply_to(mut self, address: &str) -> Self {
        let address = clean(address);
        self.reply_to = (!address.is_empty()).then_some(address);
        self
    }

    /// Returns the recipient address.
    #[must_use]
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Returns the subject (unencoded).
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the HTML body.
    #[must_use]
    pub fn html_body(&self) -> &str {
        &self.html_body
    }

    /// Returns the `Reply-To` address, if set.
    #[must_use]
    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }

    /// Builds the header block for this message sent by `from`.
    #[must_use]
    pub fn headers(&self, from: &Mailbox) -> Headers {
        let mut headers = Headers::new();
        headers.push("From", &from.to_string());
        headers.push("To", &format!("<{}>", self.to));
        headers.push("Subject", &encode_rfc2047(&self.subject));
        headers.push("MIME-Version", "1.0");
        headers.push("Content-Type", "text/html; charset=UTF-8");
        if let Some(reply_to) = &self.reply_to {
            headers.push("Reply-To", reply_to);
        }
        headers
    }

    /// Renders the full message: headers, a blank line, then the body.
    ///
    /// Line endings inside the body are left as they are; the SMTP layer
    /// normalizes them during DATA.
    #[must_use]
    pub fn render(&self, from: &Mailbox) -> String {
        let mut text = self.headers(from).to_string();
        text.push_str("\r\n");
        text.push_str(&self.html_body);
        text
    }
}

fn clean(value: &str) -> String {
    strip_line_breaks(value).trim().to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sender() -> Mailbox {
        Mailbox::with_name("Front Desk", "desk@example.com")
    }

    fn header_lines(text: &str) -> Vec<&str> {
        let (head, _) = text.split_once("\r\n\r\n").unwrap();
        head.split("\r\n").collect()
    }

    /// Physical lines that start a new field, i.e. not continuation lines.
    fn header_fields<'a>(lines: &[&'a str]) -> Vec<&'a str> {
        lines
            .iter()
            .copied()
            .filter(|l| !l.starts_with([' ', '\t']))
            .collect()
    }

    #[test]
    fn test_mailbox_display() {
        assert_eq!(sender().to_string(), "Front Desk <desk@example.com>");
        assert_eq!(
            Mailbox::new("desk@example.com").to_string(),
            "<desk@example.com>"
        );
        assert_eq!(
            Mailbox::with_name("", "desk@example.com").to_string(),
            "<desk@example.com>"
        );
        assert_eq!(
            Mailbox::with_name("Señor", "desk@example.com").to_string(),
            "=?UTF-8?B?U2XDsW9y?= <desk@example.com>"
        );
    }

    #[test]
    fn test_message_requires_recipient_and_subject() {
        assert!(matches!(
            HtmlMessage::new("", "Hi", ""),
            Err(Error::MissingField("recipient"))
        ));
        assert!(matches!(
            HtmlMessage::new("a@example.com", "\r\n", ""),
            Err(Error::MissingField("subject"))
        ));
        assert!(HtmlMessage::new("a@example.com", "Hi", "").is_ok());
    }

    #[test]
    fn test_render_layout() {
        let message = HtmlMessage::new("owner@example.com", "New enquiry", "<p>Hello</p>").unwrap();
        assert_eq!(
            message.render(&sender()),
            "From: Front Desk <desk@example.com>\r\n\
             To: <owner@example.com>\r\n\
             Subject: New enquiry\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: text/html; charset=UTF-8\r\n\
             \r\n\
             <p>Hello</p>"
        );
    }

    #[test]
    fn test_reply_to_only_when_supplied() {
        let message = HtmlMessage::new("owner@example.com", "Hi", "").unwrap();
        assert!(!message.headers(&sender()).contains("Reply-To"));
        assert!(!message.render(&sender()).contains("Reply-To"));

        let message = message.with_reply_to("visitor@example.org");
        assert_eq!(
            message.headers(&sender()).get("Reply-To"),
            Some("visitor@example.org")
        );

        let message = message.with_reply_to("\r\n");
        assert_eq!(message.reply_to(), None);
    }

    #[test]
    fn test_non_ascii_subject_is_encoded() {
        let message = HtmlMessage::new("owner@example.com", "Información", "").unwrap();
        let headers = message.headers(&sender());
        assert_eq!(headers.get("Subject"), Some("=?UTF-8?B?SW5mb3JtYWNpw7Nu?="));
        assert_eq!(message.subject(), "Información");
    }

    #[test]
    fn test_injection_in_subject_stays_on_one_line() {
        let message = HtmlMessage::new(
            "owner@example.com",
            "Hello\r\nBcc: victim@example.com",
            "",
        )
        .unwrap()
        .with_reply_to("x@example.org\r\nBcc: victim@example.com");
        let text = message.render(&sender());
        let lines = header_lines(&text);

        assert_eq!(header_fields(&lines).len(), 6);
        assert!(!lines.iter().any(|l| l.starts_with("Bcc:")));
    }

    #[test]
    fn test_long_subject_is_folded() {
        let subject = "Solicitud de información ".repeat(30);
        let message = HtmlMessage::new("owner@example.com", &subject, "<p>Hola</p>").unwrap();
        let text = message.render(&sender());
        let lines = header_lines(&text);

        assert!(lines.len() > 5);
        assert_eq!(header_fields(&lines).len(), 5);
        for line in &lines {
            assert!(line.len() <= 998, "line of {} bytes", line.len());
        }
        assert!(text.ends_with("\r\n\r\n<p>Hola</p>"));
    }

    proptest! {
        #[test]
        fn header_field_count_is_fixed(
            subject in "\\PC*[\r\n]*\\PC*",
            name in "[^\r\n]*[\r\n]+[^\r\n]*",
            reply_to in proptest::option::of("[a-z]{1,8}[\r\n]*@[a-z]{1,8}\\.org"),
        ) {
            let subject = format!("s{subject}");
            let from = Mailbox::with_name(&name, "desk@example.com");
            let mut message = HtmlMessage::new("owner@example.com", &subject, "<p>body</p>").unwrap();
            if let Some(reply_to) = &reply_to {
                message = message.with_reply_to(reply_to);
            }

            let text = message.render(&from);
            let expected = if reply_to.is_some() { 6 } else { 5 };
            let lines = header_lines(&text);
            prop_assert_eq!(header_fields(&lines).len(), expected);
            for line in lines {
                prop_assert!(!line.contains('\r') && !line.contains('\n'));
                prop_assert!(line.len() <= 998);
            }
        }
    }
}
