//! One-shot delivery of a single HTML message.
//!
//! [`SmtpTransport`] drives the whole exchange for one message: connect,
//! greeting, EHLO, optional STARTTLS, optional AUTH LOGIN, the envelope,
//! DATA, and QUIT. Any rejection aborts the exchange and drops the
//! connection.

mod config;
mod result;

pub use config::{
    ConfigBuilder, ConnectionConfig, Credentials, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HELLO_NAME,
    DEFAULT_IO_TIMEOUT, DEFAULT_PORT, Security,
};
pub use result::TransportResult;

use postbox_mime::HtmlMessage;
use tracing::Instrument;

use crate::connection::{Client, TlsUpgrade, connect, connect_tls};
use crate::error::{Error, Result};
use crate::types::Address;

/// Sends messages with a fixed connection configuration.
///
/// Each call opens its own connection; nothing is pooled or reused.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    config: ConnectionConfig,
}

impl SmtpTransport {
    /// Creates a transport.
    #[must_use]
    pub const fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Delivers `message` and reports the outcome.
    ///
    /// Never fails; every error is folded into the returned
    /// [`TransportResult`].
    pub async fn send(&self, message: &HtmlMessage) -> TransportResult {
        self.try_send(message).await.into()
    }

    /// Delivers `message`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connect`] if the server cannot be reached,
    /// [`Error::Protocol`] with the server's reply if any step is rejected,
    /// and [`Error::Stream`] or [`Error::Tls`] for transport failures.
    pub async fn try_send(&self, message: &HtmlMessage) -> Result<()> {
        let config = &self.config;
        let span = tracing::info_span!(
            "smtp_send",
            host = %config.host,
            port = config.port,
            security = %config.security,
        );

        async {
            let (from, to) = self.envelope(message)?;
            tracing::info!(to = %to, "delivering message");

            let stream = match config.security {
                Security::Implicit => {
                    connect_tls(&config.host, config.port, config.connect_timeout).await
                }
                Security::None | Security::StartTls => {
                    connect(&config.host, config.port, config.connect_timeout).await
                }
            }
            .inspect_err(|e| tracing::warn!(error = %e, "connection failed"))?;
            tracing::debug!(tls = stream.is_tls(), "connected");

            let result = self.exchange(stream, &from, &to, message).await;
            match &result {
                Ok(()) => tracing::info!("message accepted"),
                Err(e) => tracing::warn!(
                    error = %e,
                    transient = e.is_transient(),
                    permanent = e.is_permanent(),
                    "delivery failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Runs the exchange over an already-open stream.
    ///
    /// The stream must be positioned before the server greeting. With
    /// [`Security::StartTls`] it is upgraded through [`TlsUpgrade`].
    ///
    /// # Errors
    ///
    /// Same as [`SmtpTransport::try_send`], minus connection errors.
    pub async fn send_over<S: TlsUpgrade>(&self, stream: S, message: &HtmlMessage) -> Result<()> {
        let (from, to) = self.envelope(message)?;
        self.exchange(stream, &from, &to, message).await
    }

    /// Delivers `message`, blocking the calling thread until done.
    ///
    /// Runs on a private current-thread runtime. Called from inside an
    /// asynchronous runtime it fails without connecting; use
    /// [`SmtpTransport::send`] there.
    #[must_use]
    pub fn send_blocking(&self, message: &HtmlMessage) -> TransportResult {
        if tokio::runtime::Handle::try_current().is_ok() {
            return TransportResult::failure(
                Error::Config("send_blocking cannot run inside an async runtime; use send".into())
                    .to_string(),
            );
        }

        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => return TransportResult::failure(Error::Stream(e).to_string()),
        };
        runtime.block_on(self.send(message))
    }

    fn envelope(&self, message: &HtmlMessage) -> Result<(Address, Address)> {
        let from = Address::new(self.config.sender.address())?;
        let to = Address::new(message.to())?;
        Ok((from, to))
    }

    async fn exchange<S: TlsUpgrade>(
        &self,
        stream: S,
        from: &Address,
        to: &Address,
        message: &HtmlMessage,
    ) -> Result<()> {
        let config = &self.config;
        let payload = message.render(&config.sender);

        let client = Client::from_stream(stream, config.io_timeout)
            .await?
            .ehlo(&config.hello_name)
            .await?;

        let client = if config.security == Security::StartTls {
            client.starttls(&config.host, &config.hello_name).await?
        } else {
            client
        };

        let client = match &config.credentials {
            Some(credentials) => {
                client
                    .auth_login(credentials.username(), credentials.password())
                    .await?
                    .mail_from(from)
                    .await?
            }
            None => client.mail_from(from).await?,
        };

        client
            .rcpt_to(to)
            .await?
            .data()
            .await?
            .send_message(payload.as_bytes())
            .await?
            .quit()
            .await;

        Ok(())
    }
}
