//! Type-state SMTP client.

use super::framed::FramedStream;
use super::stream::{SmtpStream, TlsUpgrade};
use super::ServerInfo;
use crate::command::{Command, encode_data};
use crate::error::{Error, Result};
use crate::types::{Address, Extension, Reply, Step};
use base64::Engine;
use std::collections::HashSet;
use std::io;
use std::marker::PhantomData;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};

/// Type-state marker for connected state.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker for authenticated state.
#[derive(Debug)]
pub struct Authenticated;

/// Type-state marker for mail transaction started.
#[derive(Debug)]
pub struct MailTransaction;

/// Type-state marker for recipient added.
#[derive(Debug)]
pub struct RecipientAdded;

/// Type-state marker for data mode.
#[derive(Debug)]
pub struct Data;

/// Type-state marker for a delivered message.
#[derive(Debug)]
pub struct Delivered;

/// SMTP client with type-state pattern.
///
/// Every step consumes the client. When a step fails the client is dropped
/// along with its stream, which closes the connection.
#[derive(Debug)]
pub struct Client<State, S = SmtpStream> {
    stream: FramedStream<S>,
    server_info: ServerInfo,
    _state: PhantomData<State>,
}

/// Connection trait for all states.
pub trait SmtpConnection {
    /// Returns the server information.
    fn server_info(&self) -> &ServerInfo;
}

impl<State, S> SmtpConnection for Client<State, S> {
    fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }
}

impl<S> Client<Connected, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a client from a stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or if it is not `220`.
    pub async fn from_stream(stream: S, io_timeout: Duration) -> Result<Self> {
        let mut stream = FramedStream::new(stream, io_timeout);
        let greeting = stream.read_reply().await?;
        tracing::debug!("<< {}", greeting.text());
        let greeting = expect(Step::Greeting, greeting)?;

        // Extract hostname from greeting (first word after code)
        let hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                extensions: HashSet::new(),
            },
            _state: PhantomData,
        })
    }

    /// Sends EHLO and records the advertised extensions.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO command fails.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        let cmd = Command::Ehlo {
            hostname: client_hostname.to_string(),
        };
        let reply = self.command(Step::Ehlo, cmd).await?;

        // Skip first line which is greeting
        self.server_info.extensions = reply
            .message
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();
        tracing::debug!(extensions = ?self.server_info.extensions, "server capabilities");

        Ok(self)
    }

    /// Authenticates using the LOGIN mechanism.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the three exchanges is rejected.
    pub async fn auth_login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<Authenticated, S>> {
        let engine = base64::engine::general_purpose::STANDARD;

        self.command(Step::AuthLogin, Command::AuthLogin).await?;
        self.command(
            Step::AuthUsername,
            Command::AuthResponse(engine.encode(username.as_bytes())),
        )
        .await?;
        self.command(
            Step::AuthPassword,
            Command::AuthResponse(engine.encode(password.as_bytes())),
        )
        .await?;

        Ok(self.transition())
    }

    /// Starts a mail transaction without authentication.
    ///
    /// # Errors
    ///
    /// Returns an error if the MAIL FROM command fails.
    pub async fn mail_from(mut self, from: &Address) -> Result<Client<MailTransaction, S>> {
        let cmd = Command::MailFrom { from: from.clone() };
        self.command(Step::MailFrom, cmd).await?;
        Ok(self.transition())
    }
}

impl<S> Client<Connected, S>
where
    S: TlsUpgrade,
{
    /// Upgrades the connection to TLS using STARTTLS, then repeats EHLO.
    ///
    /// The upgrade runs regardless of whether STARTTLS was advertised; a
    /// server without it answers the command with an error reply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the server refuses STARTTLS or the second
    /// EHLO, and [`Error::Tls`] if the handshake fails.
    pub async fn starttls(mut self, tls_hostname: &str, client_hostname: &str) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            tracing::debug!("STARTTLS not advertised, trying anyway");
        }

        self.command(Step::StartTls, Command::StartTls).await?;

        // Anything already buffered arrived in plaintext and must not be
        // mistaken for a reply sent over TLS.
        if self.stream.has_buffered_input() {
            return Err(Error::InvalidReply(
                "unexpected data after STARTTLS reply".into(),
            ));
        }

        let io_timeout = self.stream.io_timeout();
        let upgrade = self.stream.into_inner().upgrade_to_tls(tls_hostname);
        let upgraded = tokio::time::timeout(io_timeout, upgrade)
            .await
            .map_err(|_| Error::Tls(io::Error::new(io::ErrorKind::TimedOut, "handshake timed out")))??;
        tracing::debug!("TLS established");

        let client = Self {
            stream: FramedStream::new(upgraded, io_timeout),
            server_info: ServerInfo {
                hostname: self.server_info.hostname,
                extensions: HashSet::new(),
            },
            _state: PhantomData,
        };
        client.ehlo(client_hostname).await
    }
}

impl<S> Client<Authenticated, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Starts a mail transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the MAIL FROM command fails.
    pub async fn mail_from(mut self, from: &Address) -> Result<Client<MailTransaction, S>> {
        let cmd = Command::MailFrom { from: from.clone() };
        self.command(Step::MailFrom, cmd).await?;
        Ok(self.transition())
    }
}

impl<S> Client<MailTransaction, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Adds the recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: &Address) -> Result<Client<RecipientAdded, S>> {
        let cmd = Command::RcptTo { to: to.clone() };
        self.command(Step::RcptTo, cmd).await?;
        Ok(self.transition())
    }
}

impl<S> Client<RecipientAdded, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Begins sending message data.
    ///
    /// # Errors
    ///
    /// Returns an error if the DATA command fails.
    pub async fn data(mut self) -> Result<Client<Data, S>> {
        self.command(Step::Data, Command::Data).await?;
        Ok(self.transition())
    }
}

impl<S> Client<Data, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Sends the message content and completes the transaction.
    ///
    /// Line endings are normalized to CRLF, leading dots are stuffed and the
    /// terminating `.` line is added automatically. The whole payload goes
    /// out in a single write.
    ///
    /// # Errors
    ///
    /// Returns an error if sending the message fails or server rejects it.
    pub async fn send_message(mut self, message: &[u8]) -> Result<Client<Delivered, S>> {
        let payload = encode_data(message);
        tracing::debug!(bytes = payload.len(), ">> <message data>");
        self.stream.write_all(&payload).await?;

        let reply = self.stream.read_reply().await?;
        tracing::debug!("<< {}", reply.text());
        expect(Step::Message, reply)?;

        Ok(self.transition())
    }
}

impl<S> Client<Delivered, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Sends QUIT and closes the connection.
    ///
    /// The reply is read but not checked; failures are only logged.
    pub async fn quit(mut self) {
        let bytes = Command::Quit.serialize();
        tracing::debug!(">> QUIT");
        match self.stream.write_all(&bytes).await {
            Ok(()) => match self.stream.read_reply().await {
                Ok(reply) => tracing::debug!("<< {}", reply.text()),
                Err(e) => tracing::debug!(error = %e, "no reply to QUIT"),
            },
            Err(e) => tracing::debug!(error = %e, "QUIT not sent"),
        }
        self.stream.shutdown().await;
    }
}

// Common implementation for all states
impl<State, S> Client<State, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Writes one command, reads its reply and checks the code for `step`.
    async fn command(&mut self, step: Step, cmd: Command) -> Result<Reply> {
        tracing::debug!(">> {}", cmd.log_line());
        self.stream.write_all(&cmd.serialize()).await?;

        let reply = self.stream.read_reply().await?;
        tracing::debug!("<< {}", reply.text());
        expect(step, reply)
    }

    fn transition<Next>(self) -> Client<Next, S> {
        Client {
            stream: self.stream,
            server_info: self.server_info,
            _state: PhantomData,
        }
    }
}

/// Accepts `reply` if its code is the one `step` waits for.
fn expect(step: Step, reply: Reply) -> Result<Reply> {
    match step.expected() {
        Some(code) if reply.code != code => Err(Error::rejected(step, reply)),
        _ => Ok(reply),
    }
}
