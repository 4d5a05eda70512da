use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmtpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed by peer")]
    EndOfStream,

    #[error("SMTP protocol error: {0}")]
    Protocol(String),

    #[error("Line too long")]
    LineTooLong,

    #[error("Command out of sequence")]
    OutOfSequence,

    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Message dispatcher has stopped")]
    Closed,
}

pub type Result<T> = std::result::Result<T, SmtpError>;
