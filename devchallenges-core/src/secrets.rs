//! GitHub credential resolution
//!
//! The access token normally comes from an environment variable (GITHUB_TOKEN by
//! default). A secrets file at `~/.config/devchallenges/secrets.toml` is used as a
//! fallback and must be readable by its owner only (0600 on Unix).
//!
//! A missing token is not an error: callers treat it as "GitHub features disabled".

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// A GitHub access token
///
/// The value is never printed by `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct GitHubToken(String);

impl GitHubToken {
    /// Wrap a raw token, returning `None` if it is blank
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The raw token value, for building an Authorization header
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for GitHubToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GitHubToken(***)")
    }
}

/// Secrets file contents
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// GitHub section
    pub github: GitHubSecrets,
}

/// GitHub-related secrets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSecrets {
    /// GitHub personal access token
    pub token: Option<String>,
}

impl Secrets {
    /// Load secrets from the default location, or empty secrets if there is no file
    pub fn load() -> Result<Self> {
        match Self::default_secrets_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load secrets from a specific file, refusing files readable by others
    pub fn load_from_file(path: &Path) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mode = std::fs::metadata(path)?.permissions().mode();
            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}; run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }
        }

        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))
    }

    /// `~/.config/devchallenges/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("devchallenges").join("secrets.toml"))
    }

    /// Resolve the token, reading the default secrets file only when the
    /// environment variable is unset or blank
    pub fn discover_token(env_var: &str) -> Result<Option<GitHubToken>> {
        Self::discover_token_with(env_var, |key| std::env::var(key).ok(), Self::load)
    }

    /// [`Secrets::discover_token`] with an injectable lookup and file loader
    pub fn discover_token_with(
        env_var: &str,
        lookup: impl Fn(&str) -> Option<String>,
        load: impl FnOnce() -> Result<Self>,
    ) -> Result<Option<GitHubToken>> {
        if let Some(token) = lookup(env_var).and_then(GitHubToken::new) {
            debug!(env_var, "Using GitHub token from environment");
            return Ok(Some(token));
        }
        Ok(load()?.resolve_token_with(env_var, |_| None))
    }

    /// Resolve the token from the process environment, then this file
    pub fn resolve_token(&self, env_var: &str) -> Option<GitHubToken> {
        self.resolve_token_with(env_var, |key| std::env::var(key).ok())
    }

    /// Resolve the token using an arbitrary variable lookup
    ///
    /// Blank values are treated as absent at every level.
    pub fn resolve_token_with(
        &self,
        env_var: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<GitHubToken> {
        if let Some(token) = lookup(env_var).and_then(GitHubToken::new) {
            debug!(env_var, "Using GitHub token from environment");
            return Some(token);
        }

        let token = self.github.token.as_deref().and_then(GitHubToken::new);
        if token.is_some() {
            debug!("Using GitHub token from secrets file");
        }
        token
    }
}
