//! Configuration management for bitbucket-mcp.
//!
//! Settings are resolved once at process start from three layers, highest
//! precedence first:
//!
//! 1. Environment variables (`BITBUCKET_URL`, `BITBUCKET_TOKEN`, `MCP_PORT`, ...)
//! 2. The optional TOML config file
//! 3. Built-in defaults
//!
//! The config file lives in a platform-specific location:
//!
//! - **macOS/Linux**: `~/.config/bitbucket-mcp/config.toml`
//! - **Windows**: `%APPDATA%\bitbucket-mcp\config.toml`
//!
//! Secrets (token, app password) are only ever read from the environment.
//!
//! # Example
//!
//! ```ignore
//! use bitbucket_core::config::Config;
//!
//! let settings = Config::load()?.resolve()?;
//! println!("Serving {} via {}", settings.bitbucket.base_url, settings.server.transport);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config directory name.
const CONFIG_DIR_NAME: &str = "bitbucket-mcp";

/// Default Bitbucket Cloud API URL.
pub const DEFAULT_BITBUCKET_URL: &str = "https://api.bitbucket.org/2.0";

/// Default bind host for the SSE transport.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port for the SSE transport.
pub const DEFAULT_PORT: u16 = 9000;

pub const ENV_URL: &str = "BITBUCKET_URL";
pub const ENV_TOKEN: &str = "BITBUCKET_TOKEN";
pub const ENV_USERNAME: &str = "BITBUCKET_USERNAME";
pub const ENV_PASSWORD: &str = "BITBUCKET_PASSWORD";
pub const ENV_WORKSPACE: &str = "BITBUCKET_WORKSPACE";
pub const ENV_TRANSPORT: &str = "MCP_TRANSPORT";
pub const ENV_HOST: &str = "MCP_HOST";
pub const ENV_PORT: &str = "MCP_PORT";

// =============================================================================
// Resolved settings
// =============================================================================

/// Authentication mode for outbound Bitbucket requests.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Username + app password (HTTP basic auth)
    Basic { username: String, password: String },
    /// OAuth / access token (bearer auth)
    Bearer { token: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

/// Bitbucket connection settings shared (read-only) by every tool call.
#[derive(Debug, Clone)]
pub struct BitbucketConfig {
    /// API base URL without trailing slash
    pub base_url: String,
    pub credentials: Credentials,
    /// Account nickname, also used to find PRs awaiting this user's review
    pub username: Option<String>,
    /// Workspace used when a tool call omits one
    pub default_workspace: Option<String>,
}

impl BitbucketConfig {
    /// Create a config for the given base URL and credentials.
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        let username = match &credentials {
            Credentials::Basic { username, .. } => Some(username.clone()),
            Credentials::Bearer { .. } => None,
        };

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            username,
            default_workspace: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_default_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.default_workspace = Some(workspace.into());
        self
    }

    pub fn has_token(&self) -> bool {
        matches!(self.credentials, Credentials::Bearer { .. })
    }

    pub fn has_user(&self) -> bool {
        self.username.is_some()
    }

    /// Pick the explicit workspace, falling back to the configured default.
    pub fn resolve_workspace(&self, workspace: Option<&str>) -> Option<String> {
        workspace
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_workspace.clone())
    }
}

/// Transport used to talk to the MCP client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Newline-delimited JSON-RPC over stdin/stdout
    #[default]
    Stdio,
    /// HTTP server with Server-Sent Events
    Sse,
}

impl FromStr for TransportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(TransportKind::Stdio),
            "sse" | "http" => Ok(TransportKind::Sse),
            other => Err(Error::Config(format!(
                "Unknown transport '{}'. Expected 'stdio' or 'sse'",
                other
            ))),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Stdio => write!(f, "stdio"),
            TransportKind::Sse => write!(f, "sse"),
        }
    }
}

/// Transport settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub transport: TransportKind,
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            transport: TransportKind::default(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Fully resolved process settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bitbucket: BitbucketConfig,
    pub server: ServerSettings,
}

// =============================================================================
// Config file structures
// =============================================================================

/// Contents of the TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitbucket: Option<BitbucketFileConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerFileConfig>,
}

/// `[bitbucket]` section. Secrets are deliberately absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BitbucketFileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
}

/// `[server]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerFileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

// =============================================================================
// Config implementation
// =============================================================================

impl Config {
    /// Get the configuration directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location.
    ///
    /// Returns a default (empty) config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// Returns a default (empty) config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        debug!(path = ?path, "Loading config");

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        info!(path = ?path, "Config loaded successfully");
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        debug!(path = ?path, "Saving config");

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        info!(path = ?path, "Config saved successfully");
        Ok(())
    }

    /// Resolve settings against the process environment.
    pub fn resolve(&self) -> Result<Settings> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve settings using `lookup` as the environment.
    ///
    /// Empty environment values are treated as unset.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let file_bb = self.bitbucket.clone().unwrap_or_default();
        let file_server = self.server.clone().unwrap_or_default();

        let base_url = env(ENV_URL)
            .or(file_bb.url)
            .unwrap_or_else(|| DEFAULT_BITBUCKET_URL.to_string());
        let username = env(ENV_USERNAME).or(file_bb.username);
        let workspace = env(ENV_WORKSPACE).or(file_bb.workspace);

        let credentials = match (env(ENV_TOKEN), &username, env(ENV_PASSWORD)) {
            (Some(token), _, _) => Credentials::Bearer { token },
            (None, Some(user), Some(password)) => Credentials::Basic {
                username: user.clone(),
                password,
            },
            _ => return Err(Error::AuthenticationMissing),
        };

        let mut bitbucket = BitbucketConfig::new(base_url, credentials);
        if let Some(user) = username {
            bitbucket = bitbucket.with_username(user);
        }
        if let Some(ws) = workspace {
            bitbucket = bitbucket.with_default_workspace(ws);
        }

        let transport = match env(ENV_TRANSPORT) {
            Some(value) => value.parse()?,
            None => file_server.transport.unwrap_or_default(),
        };
        let host = env(ENV_HOST)
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match env(ENV_PORT) {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("Invalid {}: {}", ENV_PORT, value)))?,
            None => file_server.port.unwrap_or(DEFAULT_PORT),
        };

        Ok(Settings {
            bitbucket,
            server: ServerSettings {
                transport,
                host,
                port,
            },
        })
    }

    /// Set a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `bitbucket.workspace`, `server.port`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (section, field) = split_key(key)?;

        match section {
            "bitbucket" => {
                let config = self.bitbucket.get_or_insert_with(Default::default);
                match field {
                    "url" | "base_url" => config.url = Some(value.to_string()),
                    "username" | "user" => config.username = Some(value.to_string()),
                    "workspace" => config.workspace = Some(value.to_string()),
                    "token" | "password" => {
                        return Err(Error::Config(format!(
                            "'{}' is a secret; set it via the environment instead",
                            key
                        )))
                    }
                    _ => {
                        return Err(Error::Config(format!(
                            "Unknown bitbucket config field: {}",
                            field
                        )))
                    }
                }
            }
            "server" => {
                let config = self.server.get_or_insert_with(Default::default);
                match field {
                    "transport" => config.transport = Some(value.parse()?),
                    "host" => config.host = Some(value.to_string()),
                    "port" => {
                        config.port = Some(value.parse().map_err(|_| {
                            Error::Config(format!("Invalid port: {}", value))
                        })?)
                    }
                    _ => {
                        return Err(Error::Config(format!(
                            "Unknown server config field: {}",
                            field
                        )))
                    }
                }
            }
            _ => {
                return Err(Error::Config(format!("Unknown config section: {}", section)));
            }
        }

        Ok(())
    }

    /// Get a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `bitbucket.workspace`, `server.port`)
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let (section, field) = split_key(key)?;

        match section {
            "bitbucket" => {
                let Some(config) = &self.bitbucket else {
                    return Ok(None);
                };
                match field {
                    "url" | "base_url" => Ok(config.url.clone()),
                    "username" | "user" => Ok(config.username.clone()),
                    "workspace" => Ok(config.workspace.clone()),
                    _ => Err(Error::Config(format!(
                        "Unknown bitbucket config field: {}",
                        field
                    ))),
                }
            }
            "server" => {
                let Some(config) = &self.server else {
                    return Ok(None);
                };
                match field {
                    "transport" => Ok(config.transport.map(|t| t.to_string())),
                    "host" => Ok(config.host.clone()),
                    "port" => Ok(config.port.map(|p| p.to_string())),
                    _ => Err(Error::Config(format!(
                        "Unknown server config field: {}",
                        field
                    ))),
                }
            }
            _ => Err(Error::Config(format!("Unknown config section: {}", section))),
        }
    }
}

fn split_key(key: &str) -> Result<(&str, &str)> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.len() != 2 {
        return Err(Error::Config(format!(
            "Invalid config key '{}'. Expected format: section.field",
            key
        )));
    }
    Ok((parts[0], parts[1]))
}

// =============================================================================
// Tests
// =============================================================================
