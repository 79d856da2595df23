//! Configuration management for the DevChallenges feed
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (DEVCHALLENGES_*)
//! 3. Config file (~/.config/devchallenges/config.toml)
//! 4. Default values

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Default number of discussions returned by the list route
pub const DEFAULT_DISCUSSION_LIMIT: u32 = 6;

/// GitHub repository and endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Repository owner
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// Base URL of the REST API
    pub api_url: String,

    /// GraphQL endpoint
    pub graphql_url: String,

    /// User-Agent sent with GraphQL requests
    pub user_agent: String,

    /// Name of the environment variable holding the access token
    pub token_env: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            owner: "yoanbernabeu".to_string(),
            repo: "DevChallenges".to_string(),
            api_url: "https://api.github.com".to_string(),
            graphql_url: "https://api.github.com/graphql".to_string(),
            user_agent: "DevChallenges-App".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server listens on
    pub bind: String,

    /// Discussions returned when the request has no usable `limit`
    pub default_discussion_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:4321".to_string(),
            default_discussion_limit: DEFAULT_DISCUSSION_LIMIT,
        }
    }
}

/// Response cache settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long an entry stays valid
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,

    /// Prefix prepended to every cache key
    pub prefix: String,

    /// Maximum number of entries the store accepts (unbounded when unset)
    pub max_entries: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            prefix: "gh_cache_".to_string(),
            max_entries: Some(512),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// GitHub configuration
    pub github: GitHubConfig,

    /// Server configuration
    pub server: ServerConfig,

    /// Cache configuration
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/devchallenges/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("devchallenges").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - DEVCHALLENGES_OWNER / DEVCHALLENGES_REPO: target repository
    /// - DEVCHALLENGES_API_URL / DEVCHALLENGES_GRAPHQL_URL: API endpoints
    /// - DEVCHALLENGES_BIND: server listen address
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using an arbitrary variable lookup
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let apply = |key: &str, target: &mut String| {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *target = value;
            }
        };

        apply("DEVCHALLENGES_OWNER", &mut self.github.owner);
        apply("DEVCHALLENGES_REPO", &mut self.github.repo);
        apply("DEVCHALLENGES_API_URL", &mut self.github.api_url);
        apply("DEVCHALLENGES_GRAPHQL_URL", &mut self.github.graphql_url);
        apply("DEVCHALLENGES_BIND", &mut self.server.bind);

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        owner: Option<String>,
        repo: Option<String>,
        bind: Option<String>,
    ) -> Self {
        if let Some(owner) = owner {
            self.github.owner = owner;
        }
        if let Some(repo) = repo {
            self.github.repo = repo;
        }
        if let Some(bind) = bind {
            self.server.bind = bind;
        }
        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        owner: Option<String>,
        repo: Option<String>,
        bind: Option<String>,
    ) -> Result<Self> {
        let config = Self::load()?
            .with_env_overrides()
            .with_cli_overrides(owner, repo, bind);
        config.validate()?;
        Ok(config)
    }

    /// Check that the endpoints and listen address are well formed
    pub fn validate(&self) -> Result<()> {
        if self.github.owner.trim().is_empty() || self.github.repo.trim().is_empty() {
            return Err(Error::Config(
                "github.owner and github.repo must not be empty".to_string(),
            ));
        }

        for (name, value) in [
            ("github.api_url", &self.github.api_url),
            ("github.graphql_url", &self.github.graphql_url),
        ] {
            Url::parse(value)
                .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", name, value, e)))?;
        }

        self.bind_addr()?;
        Ok(())
    }

    /// Parsed server listen address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server.bind.parse().map_err(|e| {
            Error::Config(format!(
                "Invalid server.bind '{}': {}",
                self.server.bind, e
            ))
        })
    }
}
