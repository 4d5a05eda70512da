use crate::error::{Result, SmtpError};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Lazy capture: stops at the first `>`, so trailing ESMTP parameters
    /// are ignored.
    static ref MAIL_FROM: Regex = Regex::new(r"(?i:FROM):<(.*?)>").unwrap();
    /// Greedy capture: runs to the last `>` on the line. Parameters that
    /// contain `>` (e.g. `NOTIFY=<x>`) end up inside the forward-path, which
    /// is passed to handlers unvalidated.
    static ref RCPT_TO: Regex = Regex::new(r"(?i:TO):<(.+)>").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub enum SmtpCommand {
    Helo(String),
    Ehlo(String),
    /// Reverse-path, possibly empty for `<>`
    Mail(String),
    Rcpt(String),
    Data,
    Rset,
    Vrfy(String),
    Expn(String),
    Noop,
    Help,
    Quit,
    Unknown(String),
}

impl SmtpCommand {
    /// Build a command from a verb and its arguments.
    ///
    /// The verb is matched case-insensitively. A MAIL or RCPT argument that
    /// does not carry a bracketed address is a [`SmtpError::Syntax`] error.
    pub fn parse(verb: &str, args: &str) -> Result<Self> {
        let command = verb.to_uppercase();

        match command.as_str() {
            "HELO" => Ok(SmtpCommand::Helo(args.to_string())),
            "EHLO" => Ok(SmtpCommand::Ehlo(args.to_string())),
            "MAIL" => Self::parse_mail_from(args).map(SmtpCommand::Mail),
            "RCPT" => Self::parse_rcpt_to(args).map(SmtpCommand::Rcpt),
            "DATA" => Ok(SmtpCommand::Data),
            "RSET" => Ok(SmtpCommand::Rset),
            "VRFY" => Ok(SmtpCommand::Vrfy(args.to_string())),
            "EXPN" => Ok(SmtpCommand::Expn(args.to_string())),
            "NOOP" => Ok(SmtpCommand::Noop),
            "HELP" => Ok(SmtpCommand::Help),
            "QUIT" => Ok(SmtpCommand::Quit),
            _ => Ok(SmtpCommand::Unknown(command)),
        }
    }

    /// Parse a whole command line such as `MAIL FROM:<a@b>`.
    pub fn parse_line(line: &str) -> Result<Self> {
        match line.split_once(char::is_whitespace) {
            Some((verb, args)) => Self::parse(verb, args),
            None => Self::parse(line, ""),
        }
    }

    fn parse_mail_from(args: &str) -> Result<String> {
        MAIL_FROM
            .captures(args)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| SmtpError::Syntax("MAIL: no address".to_string()))
    }

    fn parse_rcpt_to(args: &str) -> Result<String> {
        RCPT_TO
            .captures(args)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| SmtpError::Syntax("RCPT: no address".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_helo() {
        let cmd = SmtpCommand::parse("HELO", "example.com").unwrap();
        assert_eq!(cmd, SmtpCommand::Helo("example.com".to_string()));
    }

    #[test]
    fn test_parse_ehlo_lowercase() {
        let cmd = SmtpCommand::parse("ehlo", "example.com").unwrap();
        assert_eq!(cmd, SmtpCommand::Ehlo("example.com".to_string()));
    }

    #[test]
    fn test_parse_mail_from() {
        let cmd = SmtpCommand::parse("MAIL", "FROM:<sender@example.com>").unwrap();
        assert_eq!(cmd, SmtpCommand::Mail("sender@example.com".to_string()));
    }

    #[test]
    fn test_parse_mail_from_null_sender() {
        let cmd = SmtpCommand::parse("MAIL", "FROM:<>").unwrap();
        assert_eq!(cmd, SmtpCommand::Mail(String::new()));
    }

    #[test]
    fn test_parse_mail_from_with_parameters() {
        let cmd = SmtpCommand::parse("MAIL", "FROM:<a@b> BODY=8BITMIME").unwrap();
        assert_eq!(cmd, SmtpCommand::Mail("a@b".to_string()));
    }

    #[test]
    fn test_parse_mail_without_brackets() {
        let result = SmtpCommand::parse("MAIL", "FROM:sender@example.com");
        assert!(matches!(result, Err(SmtpError::Syntax(_))));
    }

    #[test]
    fn test_parse_rcpt_to() {
        let cmd = SmtpCommand::parse("RCPT", "TO:<recipient@example.com>").unwrap();
        assert_eq!(cmd, SmtpCommand::Rcpt("recipient@example.com".to_string()));
    }

    #[test]
    fn test_parse_rcpt_requires_address() {
        assert!(matches!(
            SmtpCommand::parse("RCPT", "TO:<>"),
            Err(SmtpError::Syntax(_))
        ));
        assert!(matches!(
            SmtpCommand::parse("RCPT", ""),
            Err(SmtpError::Syntax(_))
        ));
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(SmtpCommand::parse_line("DATA").unwrap(), SmtpCommand::Data);
        assert_eq!(
            SmtpCommand::parse_line("VRFY john").unwrap(),
            SmtpCommand::Vrfy("john".to_string())
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        let cmd = SmtpCommand::parse("starttls", "").unwrap();
        assert_eq!(cmd, SmtpCommand::Unknown("STARTTLS".to_string()));
    }
}
