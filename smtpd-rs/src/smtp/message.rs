use serde::{Deserialize, Serialize};

/// A completed mail transaction, produced once per successful DATA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: String,
    /// Recipients in RCPT order
    pub recipients: Vec<String>,
    /// Body with dot-unstuffing applied, lines terminated by `\n`
    pub data: String,
}

/// A named address returned by VRFY and EXPN lookups.
///
/// The all-empty mailbox (`Mailbox::default()`) means "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    pub name: String,
    pub addr: String,
}

impl Mailbox {
    pub fn new(name: impl Into<String>, addr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            addr: addr.into(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.name.is_empty() && self.addr.is_empty()
    }
}
