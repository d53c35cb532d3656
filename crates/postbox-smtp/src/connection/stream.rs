//! Low-level SMTP stream handling.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};

use crate::error::{Error, Result};

/// A byte stream that can be upgraded to TLS in place (STARTTLS).
///
/// Implemented by [`SmtpStream`]; tests and embedders can provide their own.
pub trait TlsUpgrade: AsyncRead + AsyncWrite + Unpin + Send + Sized {
    /// Performs the TLS handshake over this stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tls`] if the handshake fails, or [`Error::Config`] if
    /// `hostname` is not a valid TLS server name.
    fn upgrade_to_tls(self, hostname: &str) -> impl Future<Output = Result<Self>> + Send;
}

/// SMTP stream (TCP or TLS).
#[derive(Debug)]
pub enum SmtpStream {
    /// Plain TCP connection.
    Tcp(TcpStream),
    /// TLS-encrypted connection (boxed to reduce enum size).
    Tls(Box<TlsStream<TcpStream>>),
}

impl SmtpStream {
    /// Returns true if the stream is TLS-encrypted.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }
}

impl TlsUpgrade for SmtpStream {
    async fn upgrade_to_tls(self, hostname: &str) -> Result<Self> {
        let tcp_stream = match self {
            Self::Tcp(tcp) => tcp,
            Self::Tls(_) => return Err(Error::Config("stream is already using TLS".into())),
        };

        let tls_stream = handshake(hostname, tcp_stream).await?;
        Ok(Self::Tls(Box::new(tls_stream)))
    }
}

impl AsyncRead for SmtpStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(stream) => Pin::new(stream).poll_read(cx, buf),
            Self::Tls(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for SmtpStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Tcp(stream) => Pin::new(stream).poll_write(cx, buf),
            Self::Tls(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(stream) => Pin::new(stream).poll_flush(cx),
            Self::Tls(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(stream) => Pin::new(stream).poll_shutdown(cx),
            Self::Tls(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}

/// Connects to an SMTP server over plain TCP.
///
/// # Errors
///
/// Returns [`Error::Connect`] if the connection fails or does not complete
/// within `timeout`.
pub async fn connect(hostname: &str, port: u16, timeout: Duration) -> Result<SmtpStream> {
    let stream = open_tcp(hostname, port, timeout).await?;
    Ok(SmtpStream::Tcp(stream))
}

/// Connects to an SMTP server over TLS (implicit TLS, usually port 465).
///
/// The TLS handshake shares the `timeout` budget with the TCP connect.
///
/// # Errors
///
/// Returns an error if the connection or TLS handshake fails.
pub async fn connect_tls(hostname: &str, port: u16, timeout: Duration) -> Result<SmtpStream> {
    let started = tokio::time::Instant::now();
    let tcp_stream = open_tcp(hostname, port, timeout).await?;

    let remaining = timeout.saturating_sub(started.elapsed());
    let tls_stream = tokio::time::timeout(remaining, handshake(hostname, tcp_stream))
        .await
        .map_err(|_| Error::Tls(io::Error::new(io::ErrorKind::TimedOut, "handshake timed out")))??;

    Ok(SmtpStream::Tls(Box::new(tls_stream)))
}

async fn open_tcp(hostname: &str, port: u16, timeout: Duration) -> Result<TcpStream> {
    let address = format!("{hostname}:{port}");
    tracing::debug!(%address, "connecting");

    match tokio::time::timeout(timeout, TcpStream::connect(&address)).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(source)) => Err(Error::Connect { address, source }),
        Err(_) => Err(Error::Connect {
            address,
            source: io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no connection within {}s", timeout.as_secs_f32()),
            ),
        }),
    }
}

async fn handshake(hostname: &str, tcp_stream: TcpStream) -> Result<TlsStream<TcpStream>> {
    let server_name = ServerName::try_from(hostname.to_string())
        .map_err(|_| Error::Config(format!("invalid TLS server name: {hostname}")))?;

    let connector = create_tls_connector();
    connector
        .connect(server_name, tcp_stream)
        .await
        .map_err(Error::Tls)
}

/// Creates a TLS connector with the webpki root certificates.
fn create_tls_connector() -> TlsConnector {
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}
