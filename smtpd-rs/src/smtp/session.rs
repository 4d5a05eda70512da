use crate::error::{Result, SmtpError};
use crate::smtp::commands::SmtpCommand;
use crate::smtp::connection::Connection;
use crate::smtp::dispatcher::Publisher;
use crate::smtp::reply::Reply;
use crate::smtp::server::Registry;
use crate::smtp::transaction::Transaction;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

/// Result of processing a single command
enum SessionResult {
    Continue,
    Quit,
}

/// Per-connection SMTP protocol engine
///
/// Commands are handled strictly one at a time. The session owns its
/// [`Transaction`] and replaces it on every accepted command; a rejected
/// command leaves it untouched.
///
/// The session ends on QUIT, on clean close by the peer, or on the first
/// transport or framing error. A transaction still in progress at that point
/// is dropped without producing a message.
pub struct SmtpSession<S> {
    conn: Connection<S>,
    hostname: String,
    registry: Arc<Registry>,
    publisher: Publisher,
    transaction: Transaction,
}

impl<S> SmtpSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, hostname: String, registry: Arc<Registry>, publisher: Publisher) -> Self {
        Self {
            conn: Connection::new(stream),
            hostname,
            registry,
            publisher,
            transaction: Transaction::new(),
        }
    }

    /// Drive the session until QUIT or end of stream.
    ///
    /// Returns `Ok(())` on QUIT and on clean close by the peer.
    pub async fn run(mut self) -> Result<()> {
        let result = self.serve().await;

        if let Some(sender) = self.transaction.sender_addr() {
            warn!(
                "Abandoned transaction from <{}> with {} recipient(s)",
                sender,
                self.transaction.recipients().len()
            );
        }

        match result {
            Err(SmtpError::EndOfStream) => {
                debug!("Client disconnected");
                Ok(())
            }
            other => other,
        }
    }

    async fn serve(&mut self) -> Result<()> {
        self.conn.write(&Reply::greeting(&self.hostname)).await?;

        loop {
            let (verb, args) = match self.conn.read().await {
                Ok(line) => line,
                Err(SmtpError::LineTooLong) => {
                    warn!("Command line too long");
                    self.conn.write(&Reply::line_too_long()).await?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let command = match SmtpCommand::parse(&verb, &args) {
                Ok(command) => command,
                Err(SmtpError::Syntax(reason)) => {
                    debug!("Rejected {}: {}", verb, reason);
                    self.conn.write(&Reply::syntax_error()).await?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            match self.handle_command(command).await? {
                SessionResult::Continue => continue,
                SessionResult::Quit => return Ok(()),
            }
        }
    }

    async fn handle_command(&mut self, command: SmtpCommand) -> Result<SessionResult> {
        match command {
            SmtpCommand::Ehlo(domain) => {
                info!("EHLO from {}", domain);
                self.transaction = self.transaction.reset();
                self.conn.write(&Reply::ehlo(&self.hostname)).await?;
            }
            SmtpCommand::Helo(domain) => {
                info!("HELO from {}", domain);
                self.transaction = self.transaction.reset();
                self.conn.write(&Reply::helo(&self.hostname)).await?;
            }
            SmtpCommand::Mail(sender) => {
                info!("MAIL FROM: <{}>", sender);
                self.transaction = self.transaction.sender(&sender);
                self.conn.write(&Reply::ok()).await?;
            }
            SmtpCommand::Rcpt(recipient) => match self.transaction.recipient(&recipient) {
                Ok(transaction) => {
                    info!("RCPT TO: <{}>", recipient);
                    self.transaction = transaction;
                    self.conn.write(&Reply::ok()).await?;
                }
                Err(SmtpError::OutOfSequence) => {
                    warn!("RCPT TO: <{}> before MAIL", recipient);
                    self.conn.write(&Reply::out_of_sequence()).await?;
                }
                Err(e) => return Err(e),
            },
            SmtpCommand::Data => self.handle_data().await?,
            SmtpCommand::Rset => {
                self.transaction = self.transaction.reset();
                self.conn.write(&Reply::ok()).await?;
            }
            SmtpCommand::Vrfy(arg) => {
                let verifier = self.registry.verifier().await;
                let mailbox = verifier(&arg);

                let reply = if mailbox.is_unknown() {
                    Reply::cannot_verify()
                } else {
                    Reply::mailbox(&mailbox)
                };
                self.conn.write(&reply).await?;
            }
            SmtpCommand::Expn(arg) => {
                let expander = self.registry.expander().await;
                let mailboxes = expander(&arg);

                let reply = if mailboxes.is_empty() {
                    Reply::access_denied()
                } else {
                    Reply::mailboxes(&mailboxes)
                };
                self.conn.write(&reply).await?;
            }
            SmtpCommand::Noop => {
                self.conn.write(&Reply::ok()).await?;
            }
            SmtpCommand::Help => {
                self.conn.write(&Reply::not_implemented()).await?;
            }
            SmtpCommand::Quit => {
                self.conn.write(&Reply::bye()).await?;
                return Ok(SessionResult::Quit);
            }
            SmtpCommand::Unknown(verb) => {
                debug!("Unknown command: {}", verb);
                self.conn.write(&Reply::unrecognized()).await?;
            }
        }

        Ok(SessionResult::Continue)
    }

    async fn handle_data(&mut self) -> Result<()> {
        let envelope = match self.transaction.data() {
            Ok(envelope) => envelope,
            Err(SmtpError::OutOfSequence) => {
                warn!("DATA without recipients");
                self.conn.write(&Reply::out_of_sequence()).await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        self.conn.write(&Reply::start_data()).await?;
        let body = match self.conn.read_all().await {
            Ok(body) => body,
            Err(SmtpError::LineTooLong) => {
                warn!(
                    "Rejected message from <{}>: body line too long",
                    self.transaction.sender_addr().unwrap_or_default()
                );
                self.transaction = self.transaction.reset();
                self.conn.write(&Reply::line_too_long()).await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let message = envelope.complete(body);
        self.conn.write(&Reply::ok()).await?;

        info!(
            "Message from <{}> to {} recipient(s), {} bytes",
            message.sender,
            message.recipients.len(),
            message.data.len()
        );

        self.transaction = self.transaction.reset();
        self.publisher.publish(message).await
    }
}
