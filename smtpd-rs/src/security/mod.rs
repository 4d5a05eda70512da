//! Security module
//!
//! - [`auth`]: challenge-response authentication (CRAM-MD5) for a
//!   higher-level SMTP AUTH handler

pub mod auth;

pub use auth::{decode_response, Authenticator, CramMd5Authenticator};
