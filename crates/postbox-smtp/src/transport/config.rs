//! Connection configuration types.

use crate::error::{Error, Result};
use postbox_mime::Mailbox;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 587;

/// Default EHLO identity.
pub const DEFAULT_HELLO_NAME: &str = "localhost";

/// Default connect timeout (TCP connect plus implicit TLS handshake).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(12);

/// Default timeout for each read or write once connected.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection security mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// No encryption. **Not recommended for production.**
    None,
    /// Start with plaintext, upgrade with STARTTLS.
    #[default]
    StartTls,
    /// TLS from the start, usually on port 465.
    Implicit,
}

impl Security {
    /// Returns the canonical name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::StartTls => "starttls",
            Self::Implicit => "implicit-tls",
        }
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Security {
    type Err = Error;

    /// Parses a mode name, case-insensitively.
    ///
    /// `tls` means STARTTLS and `ssl` means implicit TLS, matching the
    /// common `SMTP_SECURE` convention.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "plain" | "off" => Ok(Self::None),
            "starttls" | "tls" => Ok(Self::StartTls),
            "implicit-tls" | "implicit" | "ssl" | "smtps" => Ok(Self::Implicit),
            other => Err(Error::Config(format!("unknown security mode: {other}"))),
        }
    }
}

/// Username and password for AUTH LOGIN.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// SMTP connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Security mode.
    pub security: Security,
    /// Credentials; authentication is skipped when absent.
    pub credentials: Option<Credentials>,
    /// Envelope sender and `From` header.
    pub sender: Mailbox,
    /// Identity announced in EHLO.
    pub hello_name: String,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Read/write timeout.
    pub io_timeout: Duration,
}

impl ConnectionConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(host: impl Into<String>, sender_address: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(host, sender_address)
    }
}

/// Builder for connection configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    host: String,
    port: Option<u16>,
    security: Security,
    credentials: Option<Credentials>,
    sender_address: String,
    sender_name: Option<String>,
    hello_name: Option<String>,
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl ConfigBuilder {
    /// Creates a new builder with STARTTLS on port 587 and default timeouts.
    #[must_use]
    pub fn new(host: impl Into<String>, sender_address: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            security: Security::default(),
            credentials: None,
            sender_address: sender_address.into(),
            sender_name: None,
            hello_name: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }

    /// Sets the port. `0` selects [`DEFAULT_PORT`].
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = if port == 0 { None } else { Some(port) };
        self
    }

    /// Sets the security mode.
    #[must_use]
    pub const fn security(mut self, security: Security) -> Self {
        self.security = security;
        self
    }

    /// Sets the AUTH LOGIN credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Sets the sender display name.
    #[must_use]
    pub fn sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = Some(name.into());
        self
    }

    /// Sets the EHLO identity.
    #[must_use]
    pub fn hello_name(mut self, name: impl Into<String>) -> Self {
        self.hello_name = Some(name.into());
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the I/O timeout.
    #[must_use]
    pub const fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the host or sender address is empty.
    pub fn build(self) -> Result<ConnectionConfig> {
        let host = self.host.trim().to_string();
        if host.is_empty() || host.contains(['\r', '\n']) {
            return Err(Error::Config("host must be a single non-empty line".into()));
        }

        let sender = match &self.sender_name {
            Some(name) => Mailbox::with_name(name, &self.sender_address),
            None => Mailbox::new(&self.sender_address),
        };
        if sender.address().is_empty() {
            return Err(Error::Config("sender address cannot be empty".into()));
        }

        let hello_name = self
            .hello_name
            .as_deref()
            .map(|name| name.replace(['\r', '\n'], "").trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_HELLO_NAME.to_string());

        Ok(ConnectionConfig {
            host,
            port: self.port.unwrap_or(DEFAULT_PORT),
            security: self.security,
            credentials: self.credentials,
            sender,
            hello_name,
            connect_timeout: self.connect_timeout,
            io_timeout: self.io_timeout,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConnectionConfig::builder("smtp.example.com", "noreply@example.com")
            .build()
            .unwrap();
        assert_eq!(config.port, 587);
        assert_eq!(config.security, Security::StartTls);
        assert!(config.credentials.is_none());
        assert_eq!(config.hello_name, "localhost");
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.io_timeout, DEFAULT_IO_TIMEOUT);
        assert_eq!(config.sender.to_string(), "<noreply@example.com>");
    }

    #[test]
    fn test_port_defaults() {
        let config = ConnectionConfig::builder("smtp.example.com", "a@example.com")
            .security(Security::Implicit)
            .build()
            .unwrap();
        assert_eq!(config.port, DEFAULT_PORT);

        let config = ConnectionConfig::builder("smtp.example.com", "a@example.com")
            .security(Security::Implicit)
            .port(465)
            .build()
            .unwrap();
        assert_eq!(config.port, 465);

        let config = ConnectionConfig::builder("smtp.example.com", "a@example.com")
            .port(0)
            .build()
            .unwrap();
        assert_eq!(config.port, 587);
    }

    #[test]
    fn test_full_builder() {
        let config = ConnectionConfig::builder("smtp.example.com", "desk@example.com")
            .port(2525)
            .security(Security::None)
            .credentials("user", "secret")
            .sender_name("Front Desk")
            .hello_name("web01.example.com\r\n")
            .connect_timeout(Duration::from_secs(3))
            .io_timeout(Duration::from_secs(4))
            .build()
            .unwrap();

        assert_eq!(config.port, 2525);
        assert_eq!(config.security, Security::None);
        assert_eq!(config.credentials.as_ref().unwrap().username(), "user");
        assert_eq!(config.credentials.as_ref().unwrap().password(), "secret");
        assert_eq!(config.sender.to_string(), "Front Desk <desk@example.com>");
        assert_eq!(config.hello_name, "web01.example.com");
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.io_timeout, Duration::from_secs(4));
    }

    #[test]
    fn test_rejects_empty_values() {
        assert!(ConnectionConfig::builder("", "a@example.com").build().is_err());
        assert!(ConnectionConfig::builder("smtp.example.com", "\r\n").build().is_err());
    }

    #[test]
    fn test_security_from_str() {
        assert_eq!("none".parse::<Security>().unwrap(), Security::None);
        assert_eq!("STARTTLS".parse::<Security>().unwrap(), Security::StartTls);
        assert_eq!("tls".parse::<Security>().unwrap(), Security::StartTls);
        assert_eq!("ssl".parse::<Security>().unwrap(), Security::Implicit);
        assert_eq!(" implicit-tls ".parse::<Security>().unwrap(), Security::Implicit);
        assert!("quantum".parse::<Security>().is_err());
    }

    #[test]
    fn test_security_display_round_trips() {
        for mode in [Security::None, Security::StartTls, Security::Implicit] {
            assert_eq!(mode.to_string().parse::<Security>().unwrap(), mode);
        }
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("user", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
    }
}
