//! SMTP extension types.

/// SMTP extensions discovered from EHLO response.
///
/// Collected for logging; the delivery sequence never changes because of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// STARTTLS - TLS upgrade
    StartTls,
    /// AUTH - Authentication, with the advertised mechanism names
    Auth(Vec<String>),
    /// SIZE - Maximum message size
    Size(Option<usize>),
    /// 8BITMIME - 8-bit MIME transport
    EightBitMime,
    /// PIPELINING - Command pipelining
    Pipelining,
    /// SMTPUTF8 - UTF-8 email addresses
    SmtpUtf8,
    /// Unknown extension
    Unknown(String),
}

impl Extension {
    /// Parses an extension line from EHLO response.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            return Self::Unknown(line.to_string());
        }

        let keyword = parts[0].to_uppercase();
        match keyword.as_str() {
            "STARTTLS" => Self::StartTls,
            "AUTH" => Self::Auth(parts[1..].iter().map(|m| m.to_uppercase()).collect()),
            "SIZE" => {
                let size = parts.get(1).and_then(|s| s.parse().ok());
                Self::Size(size)
            }
            "8BITMIME" => Self::EightBitMime,
            "PIPELINING" => Self::Pipelining,
            "SMTPUTF8" => Self::SmtpUtf8,
            _ => Self::Unknown(line.to_string()),
        }
    }
}
