use smtpd_rs::smtp::SmtpCommand;
use smtpd_rs::SmtpError;

#[test]
fn test_parse_helo() {
    let cmd = SmtpCommand::parse_line("HELO example.com").unwrap();
    assert_eq!(cmd, SmtpCommand::Helo("example.com".to_string()));
}

#[test]
fn test_parse_ehlo() {
    let cmd = SmtpCommand::parse_line("EHLO example.com").unwrap();
    assert_eq!(cmd, SmtpCommand::Ehlo("example.com".to_string()));
}

#[test]
fn test_parse_helo_case_insensitive() {
    let cmd = SmtpCommand::parse_line("helo example.com").unwrap();
    assert_eq!(cmd, SmtpCommand::Helo("example.com".to_string()));
}

#[test]
fn test_parse_mail_from() {
    let cmd = SmtpCommand::parse_line("MAIL FROM:<sender@example.com>").unwrap();
    assert_eq!(cmd, SmtpCommand::Mail("sender@example.com".to_string()));
}

#[test]
fn test_parse_mail_from_lowercase_keyword() {
    let cmd = SmtpCommand::parse_line("mail from:<sender@example.com>").unwrap();
    assert_eq!(cmd, SmtpCommand::Mail("sender@example.com".to_string()));
}

#[test]
fn test_parse_mail_from_null_sender() {
    let cmd = SmtpCommand::parse_line("MAIL FROM:<>").unwrap();
    assert_eq!(cmd, SmtpCommand::Mail(String::new()));
}

#[test]
fn test_parse_mail_from_with_parameters() {
    let cmd = SmtpCommand::parse_line("MAIL FROM:<sender@example.com> BODY=8BITMIME").unwrap();
    assert_eq!(cmd, SmtpCommand::Mail("sender@example.com".to_string()));
}

#[test]
fn test_parse_mail_from_no_brackets() {
    let result = SmtpCommand::parse_line("MAIL FROM:sender@example.com");
    assert!(matches!(result, Err(SmtpError::Syntax(_))));
}

#[test]
fn test_parse_rcpt_to() {
    let cmd = SmtpCommand::parse_line("RCPT TO:<recipient@example.com>").unwrap();
    assert_eq!(cmd, SmtpCommand::Rcpt("recipient@example.com".to_string()));
}

#[test]
fn test_parse_rcpt_to_empty_address() {
    let result = SmtpCommand::parse_line("RCPT TO:<>");
    assert!(matches!(result, Err(SmtpError::Syntax(_))));
}

#[test]
fn test_parse_rcpt_without_argument() {
    let result = SmtpCommand::parse_line("RCPT");
    assert!(matches!(result, Err(SmtpError::Syntax(_))));
}

#[test]
fn test_parse_simple_verbs() {
    assert_eq!(SmtpCommand::parse_line("DATA").unwrap(), SmtpCommand::Data);
    assert_eq!(SmtpCommand::parse_line("rset").unwrap(), SmtpCommand::Rset);
    assert_eq!(SmtpCommand::parse_line("NOOP").unwrap(), SmtpCommand::Noop);
    assert_eq!(SmtpCommand::parse_line("Help").unwrap(), SmtpCommand::Help);
    assert_eq!(SmtpCommand::parse_line("QUIT").unwrap(), SmtpCommand::Quit);
}

#[test]
fn test_parse_vrfy_and_expn() {
    assert_eq!(
        SmtpCommand::parse_line("VRFY john.doe@example.com").unwrap(),
        SmtpCommand::Vrfy("john.doe@example.com".to_string())
    );
    assert_eq!(
        SmtpCommand::parse_line("EXPN staff").unwrap(),
        SmtpCommand::Expn("staff".to_string())
    );
}

#[test]
fn test_parse_unknown() {
    let cmd = SmtpCommand::parse_line("STARTTLS").unwrap();
    assert_eq!(cmd, SmtpCommand::Unknown("STARTTLS".to_string()));
}

#[test]
fn test_parse_split_verb_and_args() {
    let cmd = SmtpCommand::parse("rcpt", "TO:<a@b>").unwrap();
    assert_eq!(cmd, SmtpCommand::Rcpt("a@b".to_string()));
}

#[test]
fn test_parse_rcpt_to_captures_up_to_last_bracket() {
    let cmd = SmtpCommand::parse_line("RCPT TO:<a@b> NOTIFY=<x>").unwrap();
    assert_eq!(cmd, SmtpCommand::Rcpt("a@b> NOTIFY=<x".to_string()));

    let cmd = SmtpCommand::parse_line("RCPT TO:<a@b> NOTIFY=NEVER").unwrap();
    assert_eq!(cmd, SmtpCommand::Rcpt("a@b".to_string()));
}
