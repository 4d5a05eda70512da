use crate::error::{Result, SmtpError};
use crate::smtp::message::Mailbox;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Accounts answered by VRFY
    #[serde(default)]
    pub users: Vec<UserConfig>,
    /// Mailing lists answered by EXPN
    #[serde(default)]
    pub lists: Vec<ListConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Name announced in the greeting and HELO/EHLO replies
    pub hostname: String,
    pub listen_addr: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    pub name: String,
    pub addr: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListConfig {
    pub name: String,
    pub members: Vec<UserConfig>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                hostname: "mx.localhost".to_string(),
                listen_addr: "127.0.0.1:2525".to_string(),
            },
            logging: LoggingConfig::default(),
            users: Vec::new(),
            lists: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SmtpError::Config(e.to_string()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SmtpError::Config(e.to_string()))
    }

    /// Look up a user by display name or address.
    pub fn find_user(&self, arg: &str) -> Mailbox {
        self.users
            .iter()
            .find(|user| user.name == arg || user.addr == arg)
            .map(UserConfig::to_mailbox)
            .unwrap_or_default()
    }

    /// Members of the list named `arg`, empty when there is no such list.
    pub fn list_members(&self, arg: &str) -> Vec<Mailbox> {
        self.lists
            .iter()
            .find(|list| list.name == arg)
            .map(|list| list.members.iter().map(UserConfig::to_mailbox).collect())
            .unwrap_or_default()
    }
}

impl UserConfig {
    fn to_mailbox(&self) -> Mailbox {
        Mailbox::new(&self.name, &self.addr)
    }
}
