use std::sync::Arc;

use devchallenges_core::{Config, TtlCache};
use devchallenges_github::{ChallengeFeed, GitHubClient};

use crate::Result;

/// Shared state handed to every route
#[derive(Debug)]
pub struct AppState {
    pub feed: ChallengeFeed,
    pub default_discussion_limit: u32,
}

impl AppState {
    pub fn new(client: GitHubClient, cache: TtlCache, default_discussion_limit: u32) -> Arc<Self> {
        Arc::new(Self {
            feed: ChallengeFeed::new(Arc::new(client), cache),
            default_discussion_limit,
        })
    }

    /// Build the client and cache described by `config`
    pub fn from_config(config: &Config) -> Result<Arc<Self>> {
        let client = GitHubClient::from_config(&config.github)?;
        let cache = TtlCache::from_config(&config.cache);
        Ok(Self::new(
            client,
            cache,
            config.server.default_discussion_limit,
        ))
    }

    /// Uncached client, used by the discussion routes
    pub fn github(&self) -> &GitHubClient {
        self.feed.client()
    }
}
