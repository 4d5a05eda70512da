//! SMTP server implementation (RFC 5321 subset)
//!
//! - [`server`]: listener, accept loop and handler registration
//! - [`session`]: per-connection protocol engine
//! - [`connection`]: line framing and reply writing
//! - [`commands`]: command parsing
//! - [`transaction`]: mail transaction state machine
//! - [`dispatcher`]: ordered delivery of messages to handlers

pub mod commands;
pub mod connection;
pub mod dispatcher;
pub mod message;
pub mod reply;
pub mod server;
pub mod session;
pub mod transaction;

pub use commands::SmtpCommand;
pub use connection::Connection;
pub use message::{Mailbox, Message};
pub use reply::Reply;
pub use server::{Expander, Handler, Registry, SmtpServer, Verifier};
pub use session::SmtpSession;
pub use transaction::{Envelope, Transaction};
