//! smtpd-rs: embeddable receiving-side SMTP server
//!
//! Accepts inbound SMTP connections, drives each one through the command
//! protocol and hands every completed message to the handlers registered by
//! the embedding application.
//!
//! # Features
//!
//! - **Sessions**: one tokio task per connection, commands handled in order
//! - **Transactions**: MAIL before RCPT before DATA, enforced by an immutable
//!   state machine
//! - **Delivery**: a single dispatcher runs every handler, in registration
//!   order, for each message
//! - **Lookups**: pluggable VRFY and EXPN policies
//!
//! Delivery, storage, TLS and authentication policy belong to the embedder.
//! [`security::CramMd5Authenticator`] is provided for applications that wire
//! up their own AUTH command.
//!
//! # Example
//!
//! ```no_run
//! use smtpd_rs::{Mailbox, SmtpServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = SmtpServer::listen("127.0.0.1:2525", "mx.test.local").await?;
//!
//!     server
//!         .handle(|message| {
//!             println!("{} -> {:?}", message.sender, message.recipients);
//!         })
//!         .await;
//!
//!     server
//!         .verify(|arg| {
//!             if arg == "postmaster" {
//!                 Mailbox::new("Postmaster", "postmaster@test.local")
//!             } else {
//!                 Mailbox::default()
//!             }
//!         })
//!         .await;
//!
//!     tokio::signal::ctrl_c().await?;
//!     server.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling
//! - [`smtp`]: SMTP protocol implementation
//! - [`security`]: Challenge-response authentication

pub mod config;
pub mod error;
pub mod security;
pub mod smtp;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, SmtpError};
pub use smtp::{Mailbox, Message, SmtpServer};
