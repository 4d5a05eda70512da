//! SMTP AUTH challenge-response support
//!
//! This module is not used by the session loop itself. A higher-level AUTH
//! command handler issues the challenge from [`Authenticator::start`] as a
//! `334` continuation and checks the client's answer with
//! [`Authenticator::auth`].
//!
//! # Supported mechanisms
//! - CRAM-MD5 (RFC 2195)
//!
//! # Usage
//! ```
//! use smtpd_rs::security::{Authenticator, CramMd5Authenticator};
//!
//! let mut auth = CramMd5Authenticator::new(|user: &str| {
//!     (user == "tim").then(|| "tanstaaftanstaaf".to_string())
//! });
//!
//! let challenge = auth.start().unwrap();
//! assert!(!challenge.is_empty());
//! assert!(!auth.auth("tim", "not-the-digest"));
//! ```

use crate::error::{Result, SmtpError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use hmac::{Hmac, Mac};
use md5::Md5;
use rand::RngCore;
use tracing::{debug, warn};

type HmacMd5 = Hmac<Md5>;

/// Length of the random challenge, before encoding
pub const CHALLENGE_LENGTH: usize = 52;

/// A challenge-response credential check.
pub trait Authenticator {
    /// Issue a fresh challenge to send to the client.
    fn start(&mut self) -> Result<String>;

    /// Check the client's response to the last issued challenge.
    fn auth(&self, identity: &str, response: &str) -> bool;
}

/// CRAM-MD5 authenticator backed by a secret lookup.
pub struct CramMd5Authenticator<F>
where
    F: Fn(&str) -> Option<String>,
{
    lookup: F,
    challenge: Option<Vec<u8>>,
}

impl<F> CramMd5Authenticator<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// `lookup` returns the shared secret of an identity, or `None` when the
    /// identity is unknown.
    pub fn new(lookup: F) -> Self {
        Self {
            lookup,
            challenge: None,
        }
    }

    fn digest(secret: &str, challenge: &[u8]) -> Result<HmacMd5> {
        let mut mac = HmacMd5::new_from_slice(secret.as_bytes())
            .map_err(|e| SmtpError::Auth(format!("Invalid key: {}", e)))?;
        mac.update(challenge);
        Ok(mac)
    }

    /// Compute the hex digest a client would send for `secret`.
    pub fn expected_response(&self, secret: &str) -> Option<String> {
        let challenge = self.challenge.as_ref()?;
        let mac = Self::digest(secret, challenge).ok()?;
        Some(HEXLOWER.encode(&mac.finalize().into_bytes()))
    }
}

impl<F> Authenticator for CramMd5Authenticator<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn start(&mut self) -> Result<String> {
        let mut challenge = vec![0u8; CHALLENGE_LENGTH];
        rand::thread_rng()
            .try_fill_bytes(&mut challenge)
            .map_err(|e| SmtpError::Auth(format!("Cannot generate challenge: {}", e)))?;

        let encoded = BASE64.encode(&challenge);
        self.challenge = Some(challenge);
        Ok(encoded)
    }

    fn auth(&self, identity: &str, response: &str) -> bool {
        let Some(challenge) = self.challenge.as_ref() else {
            warn!("CRAM-MD5 response for {} without a challenge", identity);
            return false;
        };

        let Some(secret) = (self.lookup)(identity) else {
            debug!("CRAM-MD5: unknown identity {}", identity);
            return false;
        };

        let Ok(expected) = HEXLOWER_PERMISSIVE.decode(response.as_bytes()) else {
            debug!("CRAM-MD5: malformed digest from {}", identity);
            return false;
        };

        match Self::digest(&secret, challenge) {
            Ok(mac) => mac.verify_slice(&expected).is_ok(),
            Err(e) => {
                warn!("CRAM-MD5: {}", e);
                false
            }
        }
    }
}

/// Decode a client's base64 `"<identity> <hexdigest>"` answer.
pub fn decode_response(encoded: &str) -> Result<(String, String)> {
    let decoded = BASE64
        .decode(encoded.trim())
        .map_err(|e| SmtpError::Auth(format!("Invalid base64: {}", e)))?;

    let text = String::from_utf8(decoded)
        .map_err(|e| SmtpError::Auth(format!("Invalid UTF-8: {}", e)))?;

    match text.rsplit_once(' ') {
        Some((identity, digest)) if !identity.is_empty() && !digest.is_empty() => {
            Ok((identity.to_string(), digest.to_string()))
        }
        _ => Err(SmtpError::Auth("Invalid CRAM-MD5 response format".to_string())),
    }
}
