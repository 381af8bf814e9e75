//! Configuration module for roster-sync.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::net::SocketAddr;

/// Shared secret expected in the `secret` header when none is configured.
pub const DEFAULT_SERVICE_SECRET: &str = "geaux-cajuns";

const DEFAULT_GROUPS: &str = "coaches=S05E07Y6F6Z,hitters=S05ESTCTXDE,pitchers=S05DWGMM2B0";
const DEFAULT_YEAR_FIELD: &str = "Xf05DNLNQQ0P";
const DEFAULT_BIRTHDAY_FIELD: &str = "Xf05FH4RDALB";

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no directory token configured (set ROSTER_SLACK_TOKEN or TOKEN)")]
    MissingToken,
    #[error("invalid ROSTER_BIND_ADDR {0:?}")]
    InvalidBindAddr(String),
    #[error("invalid group table entry {0:?}, expected name=id")]
    InvalidGroupEntry(String),
}

/// Directory-side identifiers the reconciler works against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    /// Lowercased group name to external group id
    pub groups: BTreeMap<String, String>,
    /// Profile field key holding the player's year
    pub year_field: String,
    /// Profile field key holding the player's birthday
    pub birthday_field: String,
}

impl DirectoryConfig {
    /// Resolve a roster group name to its directory group id.
    ///
    /// Lookup ignores case and surrounding whitespace; unknown names yield `None`.
    pub fn group_id(&self, name: &str) -> Option<&str> {
        self.groups
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            groups: parse_group_table(DEFAULT_GROUPS).unwrap_or_default(),
            year_field: DEFAULT_YEAR_FIELD.to_string(),
            birthday_field: DEFAULT_BIRTHDAY_FIELD.to_string(),
        }
    }
}

/// Parse a `name=id,name=id` group table.
pub fn parse_group_table(raw: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut groups = BTreeMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, id) = entry
            .split_once('=')
            .map(|(n, i)| (n.trim(), i.trim()))
            .filter(|(n, i)| !n.is_empty() && !i.is_empty())
            .ok_or_else(|| ConfigError::InvalidGroupEntry(entry.to_string()))?;
        groups.insert(name.to_lowercase(), id.to_string());
    }
    Ok(groups)
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Bearer token for the Slack SCIM and Web APIs
    pub token: String,
    /// Shared secret checked against the `secret` request header
    pub service_secret: String,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Base URL of the SCIM API
    pub scim_url: String,
    /// Base URL of the Slack Web API
    pub api_url: String,
    /// Group table and profile field keys
    pub directory: DirectoryConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"[REDACTED]")
            .field("service_secret", &"[REDACTED]")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("scim_url", &self.scim_url)
            .field("api_url", &self.api_url)
            .field("directory", &self.directory)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let token = env::var("ROSTER_SLACK_TOKEN")
            .or_else(|_| env::var("TOKEN"))
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let service_secret = env::var("ROSTER_SERVICE_SECRET")
            .unwrap_or_else(|_| DEFAULT_SERVICE_SECRET.to_string());

        let raw_addr =
            env::var("ROSTER_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = raw_addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(raw_addr.clone()))?;

        let log_level = env::var("ROSTER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let scim_url = env::var("ROSTER_SCIM_URL")
            .unwrap_or_else(|_| "https://api.slack.com/scim/v2".to_string());
        let api_url =
            env::var("ROSTER_API_URL").unwrap_or_else(|_| "https://slack.com/api".to_string());

        let groups = parse_group_table(
            &env::var("ROSTER_GROUPS").unwrap_or_else(|_| DEFAULT_GROUPS.to_string()),
        )?;

        let directory = DirectoryConfig {
            groups,
            year_field: env::var("ROSTER_YEAR_FIELD")
                .unwrap_or_else(|_| DEFAULT_YEAR_FIELD.to_string()),
            birthday_field: env::var("ROSTER_BIRTHDAY_FIELD")
                .unwrap_or_else(|_| DEFAULT_BIRTHDAY_FIELD.to_string()),
        };

        Ok(Self {
            token,
            service_secret,
            bind_addr,
            log_level,
            scim_url,
            api_url,
            directory,
        })
    }
}
