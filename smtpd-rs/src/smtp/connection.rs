//! Line-oriented SMTP transport
//!
//! Frames a byte stream into command lines and dot-terminated bodies, and
//! writes replies. Every write is flushed so the peer sees the reply before
//! the next read.

use crate::error::{Result, SmtpError};
use crate::smtp::reply::Reply;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

/// Maximum line length including CRLF (RFC 5321 4.5.3.1.6)
pub const MAX_LINE_LENGTH: usize = 1000;

pub struct Connection<S> {
    stream: BufReader<S>,
    line: Vec<u8>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
            line: Vec::with_capacity(128),
        }
    }

    /// Read the next command line and split it into verb and arguments.
    ///
    /// The line is split on the first whitespace character; `rest` is empty
    /// when there is none. An over-long line is consumed and reported as
    /// [`SmtpError::LineTooLong`], leaving the stream at the next line.
    pub async fn read(&mut self) -> Result<(String, String)> {
        let line = self.read_line().await?;
        debug!("Received: {}", line);

        if let Some((verb, rest)) = line.split_once(char::is_whitespace) {
            return Ok((verb.to_string(), rest.to_string()));
        }
        Ok((line, String::new()))
    }

    /// Read a dot-terminated body.
    ///
    /// The terminating `.` line is not included and one leading dot is
    /// removed from every other line that starts with `.`. Each body line
    /// is followed by `\n`.
    ///
    /// A body containing an over-long line is still read up to its
    /// terminator, then rejected with [`SmtpError::LineTooLong`].
    pub async fn read_all(&mut self) -> Result<String> {
        let mut body = String::new();
        let mut too_long = false;

        loop {
            let line = match self.read_line().await {
                Ok(line) => line,
                Err(SmtpError::LineTooLong) => {
                    too_long = true;
                    continue;
                }
                Err(SmtpError::EndOfStream) => {
                    return Err(SmtpError::Protocol(
                        "Connection closed during DATA".to_string(),
                    ));
                }
                Err(e) => return Err(e),
            };

            if line == "." {
                break;
            }

            let line = line.strip_prefix('.').unwrap_or(&line);
            body.push_str(line);
            body.push('\n');
        }

        if too_long {
            return Err(SmtpError::LineTooLong);
        }

        debug!("Received body of {} bytes", body.len());
        Ok(body)
    }

    pub async fn write(&mut self, reply: &Reply) -> Result<()> {
        let formatted = reply.to_string();
        debug!("Sending: {}", formatted.trim_end());
        self.write_raw(formatted.as_bytes()).await
    }

    /// Write a single line, appending CRLF.
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        debug!("Sending: {}", line);
        self.write_raw(format!("{}\r\n", line).as_bytes()).await
    }

    async fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        let stream = self.stream.get_mut();
        stream.write_all(bytes).await?;
        stream.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String> {
        self.line.clear();

        let n = (&mut self.stream)
            .take(MAX_LINE_LENGTH as u64 + 1)
            .read_until(b'\n', &mut self.line)
            .await?;

        if n == 0 {
            return Err(SmtpError::EndOfStream);
        }

        if self.line.last() != Some(&b'\n') {
            if self.line.len() > MAX_LINE_LENGTH {
                self.discard_line().await?;
                return Err(SmtpError::LineTooLong);
            }
            return Err(SmtpError::Protocol("Unterminated line".to_string()));
        }

        self.line.pop();
        if self.line.last() == Some(&b'\r') {
            self.line.pop();
        }

        Ok(String::from_utf8_lossy(&self.line).into_owned())
    }

    /// Skip the rest of the current line, one bounded chunk at a time.
    async fn discard_line(&mut self) -> Result<()> {
        loop {
            self.line.clear();
            let n = (&mut self.stream)
                .take(MAX_LINE_LENGTH as u64 + 1)
                .read_until(b'\n', &mut self.line)
                .await?;

            if n == 0 {
                return Err(SmtpError::EndOfStream);
            }
            if self.line.last() == Some(&b'\n') {
                return Ok(());
            }
        }
    }

    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }
}
