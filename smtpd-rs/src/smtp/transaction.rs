//! Mail transaction state machine
//!
//! A [`Transaction`] is an immutable value: every transition returns a new
//! value, so a rejected command leaves the previous state untouched.
//!
//! ```text
//! Empty --sender--> HasSender --recipient--> HasRecipients --data--> Envelope
//!   ^                   |  ^                     |   |
//!   |                   |  +------sender---------+   +--recipient--+
//!   +------reset--------+----------reset-------------+<------------+
//! ```
//!
//! `sender` succeeds from every state and drops any recipients collected so
//! far. This differs from strict RFC 5321 sequencing, which expects RSET
//! before a second MAIL.

use crate::error::{Result, SmtpError};
use crate::smtp::message::Message;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Transaction {
    #[default]
    Empty,
    HasSender {
        sender: String,
    },
    HasRecipients {
        sender: String,
        recipients: Vec<String>,
    },
}

impl Transaction {
    pub fn new() -> Self {
        Self::Empty
    }

    /// Start a transaction with `addr` as the reverse-path.
    pub fn sender(&self, addr: &str) -> Transaction {
        Transaction::HasSender {
            sender: addr.to_string(),
        }
    }

    /// Add a forward-path. Fails with [`SmtpError::OutOfSequence`] when no
    /// sender has been given.
    pub fn recipient(&self, addr: &str) -> Result<Transaction> {
        match self {
            Transaction::Empty => Err(SmtpError::OutOfSequence),
            Transaction::HasSender { sender } => Ok(Transaction::HasRecipients {
                sender: sender.clone(),
                recipients: vec![addr.to_string()],
            }),
            Transaction::HasRecipients { sender, recipients } => {
                let mut recipients = recipients.clone();
                recipients.push(addr.to_string());
                Ok(Transaction::HasRecipients {
                    sender: sender.clone(),
                    recipients,
                })
            }
        }
    }

    /// Check that the transaction can accept a body and capture its envelope.
    ///
    /// Only `HasRecipients` succeeds. The caller reads the body and then
    /// calls [`Envelope::complete`]; afterwards the transaction must be
    /// replaced by [`Transaction::reset`].
    pub fn data(&self) -> Result<Envelope> {
        match self {
            Transaction::HasRecipients { sender, recipients } => Ok(Envelope {
                sender: sender.clone(),
                recipients: recipients.clone(),
            }),
            Transaction::Empty | Transaction::HasSender { .. } => Err(SmtpError::OutOfSequence),
        }
    }

    pub fn reset(&self) -> Transaction {
        Transaction::Empty
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Transaction::Empty)
    }

    pub fn sender_addr(&self) -> Option<&str> {
        match self {
            Transaction::Empty => None,
            Transaction::HasSender { sender } | Transaction::HasRecipients { sender, .. } => {
                Some(sender)
            }
        }
    }

    pub fn recipients(&self) -> &[String] {
        match self {
            Transaction::HasRecipients { recipients, .. } => recipients,
            _ => &[],
        }
    }
}

/// Sender and recipients of a transaction that passed the DATA check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    sender: String,
    recipients: Vec<String>,
}

impl Envelope {
    pub fn complete(self, body: String) -> Message {
        Message {
            sender: self.sender,
            recipients: self.recipients,
            data: body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_requires_sender() {
        let tx = Transaction::new();
        assert!(matches!(tx.recipient("a@b"), Err(SmtpError::OutOfSequence)));
        assert!(tx.is_empty());
    }

    #[test]
    fn test_data_requires_recipient() {
        assert!(Transaction::new().data().is_err());
        let tx = Transaction::new().sender("x@y");
        assert!(matches!(tx.data(), Err(SmtpError::OutOfSequence)));
        assert_eq!(tx.sender_addr(), Some("x@y"));
    }

    #[test]
    fn test_full_transaction() {
        let tx = Transaction::new()
            .sender("x@y")
            .recipient("a@b")
            .unwrap()
            .recipient("c@d")
            .unwrap();

        let message = tx.data().unwrap().complete("hi\n".to_string());
        assert_eq!(message.sender, "x@y");
        assert_eq!(message.recipients, vec!["a@b", "c@d"]);
        assert_eq!(message.data, "hi\n");
    }

    #[test]
    fn test_sender_drops_recipients() {
        let tx = Transaction::new().sender("x@y").recipient("a@b").unwrap();
        let tx = tx.sender("other@y");

        assert_eq!(tx.sender_addr(), Some("other@y"));
        assert!(tx.recipients().is_empty());
        assert!(tx.data().is_err());
    }

    #[test]
    fn test_empty_sender_allowed() {
        let tx = Transaction::new().sender("");
        assert_eq!(tx.sender_addr(), Some(""));
        assert!(tx.recipient("postmaster@example.com").is_ok());
    }

    #[test]
    fn test_transitions_leave_previous_state_intact() {
        let tx = Transaction::new().sender("x@y").recipient("a@b").unwrap();
        let _ = tx.recipient("c@d").unwrap();
        let _ = tx.sender("z@y");
        let _ = tx.reset();

        assert_eq!(tx.sender_addr(), Some("x@y"));
        assert_eq!(tx.recipients(), ["a@b".to_string()]);
    }

    #[test]
    fn test_reset() {
        let tx = Transaction::new().sender("x@y").recipient("a@b").unwrap();
        assert_eq!(tx.reset(), Transaction::Empty);
    }
}
