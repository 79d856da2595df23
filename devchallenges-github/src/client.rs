//! GitHub API client using octocrab for REST and reqwest for GraphQL

use crate::{Error, Result};
use devchallenges_core::{GitHubConfig, GitHubToken, Secrets};
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

/// GitHub API client bound to a single repository
pub struct GitHubClient {
    client: Octocrab,
    http: reqwest::Client,
    graphql_url: Url,
    token: Option<GitHubToken>,
    owner: String,
    repo: String,
}

impl GitHubClient {
    /// Create a client for the configured repository
    ///
    /// Without a token the client still serves the public REST endpoints;
    /// GraphQL calls report [`Error::MissingToken`]. Requests are never retried.
    pub fn new(config: &GitHubConfig, token: Option<GitHubToken>) -> Result<Self> {
        let graphql_url = Url::parse(&config.graphql_url).map_err(|e| {
            Error::Config(format!("invalid GraphQL URL '{}': {}", config.graphql_url, e))
        })?;

        let mut builder = Octocrab::builder()
            .add_retry_config(RetryConfig::None)
            .base_uri(config.api_url.as_str())
            .map_err(|e| Error::Config(format!("invalid API URL '{}': {}", config.api_url, e)))?;
        if let Some(token) = &token {
            builder = builder.personal_token(token.expose().to_string());
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create GitHub client: {}", e)))?;

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;

        info!(
            owner = %config.owner,
            repo = %config.repo,
            authenticated = token.is_some(),
            "Created GitHub client"
        );

        Ok(Self {
            client,
            http,
            graphql_url,
            token,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
        })
    }

    /// Create a client, resolving the token from the environment or secrets file
    pub fn from_config(config: &GitHubConfig) -> Result<Self> {
        let token =
            Secrets::discover_token(&config.token_env).map_err(|e| Error::Config(e.to_string()))?;
        if token.is_none() {
            warn!(
                env_var = %config.token_env,
                "No GitHub token found; discussions are disabled"
            );
        }
        Self::new(config, token)
    }

    /// Get the repository owner
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Whether an access token is configured
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Get the underlying octocrab client
    pub fn client(&self) -> &Octocrab {
        &self.client
    }

    /// GET a REST route (path and query) and decode the JSON body
    ///
    /// Any non-success status becomes [`Error::Status`], whatever the body.
    pub(crate) async fn rest_get<T: DeserializeOwned>(&self, route: &str) -> Result<T> {
        let response = self.client._get(route).await?;
        let status = response.status();
        let body = self.client.body_to_string(response).await?;

        if !status.is_success() {
            debug!(route, status = status.as_u16(), "GitHub REST call failed");
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Parse(e.to_string()))
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn graphql_url(&self) -> &Url {
        &self.graphql_url
    }

    pub(crate) fn token(&self) -> Option<&GitHubToken> {
        self.token.as_ref()
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("graphql_url", &self.graphql_url.as_str())
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}
