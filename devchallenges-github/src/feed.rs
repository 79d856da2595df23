//! Cached access to the website's GitHub data
//!
//! Cache keys: `participants_{tag}`, `comments_{issue}` and `discussions_{limit}`.
//! Only successful fetches are stored.

use std::future::Future;
use std::sync::Arc;

use devchallenges_core::TtlCache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::{Discussion, GitHubClient, IssueComment, Participant, Result};

/// GitHub client fronted by the TTL cache
#[derive(Debug, Clone)]
pub struct ChallengeFeed {
    client: Arc<GitHubClient>,
    cache: TtlCache,
}

impl ChallengeFeed {
    pub fn new(client: Arc<GitHubClient>, cache: TtlCache) -> Self {
        Self { client, cache }
    }

    pub fn client(&self) -> &GitHubClient {
        &self.client
    }

    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    /// Participants for a weekly tag
    pub async fn participants(&self, tag: &str) -> Result<Vec<Participant>> {
        self.cached(format!("participants_{}", tag), || {
            self.client.search_participants(tag)
        })
        .await
    }

    /// Comments on an issue
    pub async fn issue_comments(&self, issue_number: u64) -> Result<Vec<IssueComment>> {
        self.cached(format!("comments_{}", issue_number), || {
            self.client.list_issue_comments(issue_number)
        })
        .await
    }

    /// Most recent discussions
    pub async fn discussions(&self, limit: u32) -> Result<Vec<Discussion>> {
        self.cached(format!("discussions_{}", limit), || {
            self.client.list_discussions(limit)
        })
        .await
    }

    async fn cached<T, F, Fut>(&self, key: String, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.cache.get::<T>(&key) {
            debug!(%key, "Cache hit");
            return Ok(hit);
        }

        let value = fetch().await?;
        self.cache.set(&key, &value);
        info!(%key, "Stored in cache");
        Ok(value)
    }
}
