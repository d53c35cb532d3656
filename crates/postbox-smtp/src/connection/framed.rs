//! Framed I/O for the SMTP reply protocol.
//!
//! Replies are CRLF-terminated lines, possibly continued with `code-`. This
//! module reads one logical reply at a time under a line-length ceiling and
//! an I/O timeout, and writes commands in a single flushed write.

use std::io;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply, reply_code};
use crate::types::Reply;

/// Default buffer size for reading.
const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Maximum length of one reply line, terminator included.
pub const MAX_LINE_LENGTH: usize = 514;

/// Maximum number of lines in one reply.
pub const MAX_REPLY_LINES: usize = 128;

/// Framed connection for the SMTP reply protocol.
#[derive(Debug)]
pub struct FramedStream<S> {
    reader: BufReader<S>,
    write_buffer: BytesMut,
    io_timeout: Duration,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new framed stream whose reads and writes are bounded by `io_timeout`.
    pub fn new(stream: S, io_timeout: Duration) -> Self {
        Self {
            reader: BufReader::with_capacity(DEFAULT_BUFFER_SIZE, stream),
            write_buffer: BytesMut::with_capacity(DEFAULT_BUFFER_SIZE),
            io_timeout,
        }
    }

    /// Reads one complete reply, consuming every continuation line.
    ///
    /// Blank lines between replies are skipped but still count toward
    /// [`MAX_REPLY_LINES`].
    ///
    /// # Errors
    ///
    /// Returns an error if the peer closes first, a bound is exceeded, the
    /// read times out, or the lines do not form a valid reply.
    pub async fn read_reply(&mut self) -> Result<Reply> {
        let mut lines = Vec::new();
        let mut received = 0;
        loop {
            let line = self.read_line().await?;
            received += 1;

            if !line.is_empty() {
                reply_code(&line)?;
                let is_last = is_last_reply_line(&line);
                lines.push(line);
                if is_last {
                    break;
                }
            }
            if received >= MAX_REPLY_LINES {
                return Err(Error::stream(
                    io::ErrorKind::InvalidData,
                    format!("reply exceeds {MAX_REPLY_LINES} lines"),
                ));
            }
        }

        parse_reply(&lines)
    }

    /// Reads a single line with its terminator removed.
    async fn read_line(&mut self) -> Result<String> {
        let limit = self.io_timeout;
        tokio::time::timeout(limit, self.read_line_unbounded())
            .await
            .map_err(|_| {
                Error::stream(
                    io::ErrorKind::TimedOut,
                    format!("no reply within {}s", limit.as_secs_f32()),
                )
            })?
    }

    async fn read_line_unbounded(&mut self) -> Result<String> {
        let mut line = Vec::new();

        loop {
            let buf = self.reader.fill_buf().await?;
            if buf.is_empty() {
                return Err(Error::stream(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed before reply was complete",
                ));
            }

            // Look for LF
            let (take, done) = buf
                .iter()
                .position(|&b| b == b'\n')
                .map_or((buf.len(), false), |pos| (pos + 1, true));

            if line.len() + take > MAX_LINE_LENGTH {
                return Err(Error::stream(
                    io::ErrorKind::InvalidData,
                    format!("reply line longer than {MAX_LINE_LENGTH} bytes"),
                ));
            }

            line.extend_from_slice(&buf[..take]);
            self.reader.consume(take);

            if done {
                break;
            }
        }

        while matches!(line.last(), Some(b'\n' | b'\r')) {
            line.pop();
        }

        Ok(String::from_utf8_lossy(&line).into_owned())
    }

    /// Writes a complete command or payload and flushes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or times out.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.write_buffer.clear();
        self.write_buffer.extend_from_slice(data);

        let limit = self.io_timeout;
        let buffer = &self.write_buffer;
        let stream = self.reader.get_mut();
        let write = async move {
            stream.write_all(buffer).await?;
            stream.flush().await
        };

        tokio::time::timeout(limit, write)
            .await
            .map_err(|_| {
                Error::stream(
                    io::ErrorKind::TimedOut,
                    format!("write not accepted within {}s", limit.as_secs_f32()),
                )
            })?
            .map_err(Error::from)
    }

    /// Returns true if bytes have been received but not yet consumed.
    #[must_use]
    pub fn has_buffered_input(&self) -> bool {
        !self.reader.buffer().is_empty()
    }

    /// Returns the I/O timeout.
    #[must_use]
    pub const fn io_timeout(&self) -> Duration {
        self.io_timeout
    }

    /// Shuts down the write side of the stream. Errors are ignored.
    pub async fn shutdown(&mut self) {
        let limit = self.io_timeout;
        let _ = tokio::time::timeout(limit, self.reader.get_mut().shutdown()).await;
    }

    /// Consumes the framed stream, returning the underlying stream.
    ///
    /// Any buffered input is discarded.
    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }
}
