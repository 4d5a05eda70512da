use crate::smtp::message::Mailbox;
use std::fmt;

/// An SMTP reply: a 3-digit code and one or more text lines.
///
/// Multi-line replies use `code-text` for every line but the last, which
/// uses `code text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    code: u16,
    lines: Vec<String>,
}

impl Reply {
    pub fn new(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            lines: vec![text.into()],
        }
    }

    pub fn multiline<I, T>(code: u16, lines: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        if lines.is_empty() {
            return Self::new(code, "");
        }
        Self { code, lines }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn greeting(hostname: &str) -> Self {
        Self::new(220, hostname)
    }

    pub fn ehlo(hostname: &str) -> Self {
        Self::multiline(250, [format!("{} at your service", hostname), "8BITMIME".to_string()])
    }

    pub fn helo(hostname: &str) -> Self {
        Self::new(250, format!("{} at your service", hostname))
    }

    pub fn ok() -> Self {
        Self::new(250, "Ok")
    }

    pub fn bye() -> Self {
        Self::new(221, "Bye")
    }

    pub fn start_data() -> Self {
        Self::new(354, "End data with <CRLF>.<CRLF>")
    }

    pub fn unrecognized() -> Self {
        Self::new(500, "Command unrecognized")
    }

    pub fn line_too_long() -> Self {
        Self::new(500, "Line too long")
    }

    pub fn syntax_error() -> Self {
        Self::new(501, "Syntax error")
    }

    pub fn not_implemented() -> Self {
        Self::new(502, "Command not implemented")
    }

    pub fn out_of_sequence() -> Self {
        Self::new(503, "Command out of sequence")
    }

    pub fn cannot_verify() -> Self {
        Self::new(252, "Cannot VRFY user, but will attempt delivery")
    }

    pub fn access_denied() -> Self {
        Self::new(550, "Access denied")
    }

    pub fn mailbox(mailbox: &Mailbox) -> Self {
        Self::new(250, format_mailbox(mailbox))
    }

    pub fn mailboxes(mailboxes: &[Mailbox]) -> Self {
        Self::multiline(250, mailboxes.iter().map(format_mailbox))
    }
}

fn format_mailbox(mailbox: &Mailbox) -> String {
    format!("{} <{}>", mailbox.name, mailbox.addr)
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.lines.len() - 1;
        for (i, line) in self.lines.iter().enumerate() {
            let sep = if i == last { ' ' } else { '-' };
            write!(f, "{}{}{}\r\n", self.code, sep, line)?;
        }
        Ok(())
    }
}
