//! Issue comments

use crate::participants::RestUser;
use crate::{GitHubClient, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A comment on a participant's issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueComment {
    pub id: u64,
    pub username: String,
    pub avatar_url: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct RestComment {
    id: u64,
    user: RestUser,
    body: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<RestComment> for IssueComment {
    fn from(comment: RestComment) -> Self {
        IssueComment {
            id: comment.id,
            username: comment.user.login,
            avatar_url: comment.user.avatar_url,
            body: comment.body.unwrap_or_default(),
            created_at: comment.created_at,
        }
    }
}

impl GitHubClient {
    /// Comments on an issue (first page only, GitHub's default page size)
    pub async fn list_issue_comments(&self, issue_number: u64) -> Result<Vec<IssueComment>> {
        debug!(issue_number, "Fetching issue comments");

        let route = format!(
            "/repos/{}/{}/issues/{}/comments",
            self.owner(),
            self.repo(),
            issue_number
        );
        let raw: Vec<RestComment> = self.rest_get(&route).await?;

        let comments: Vec<IssueComment> = raw.into_iter().map(IssueComment::from).collect();
        info!(issue_number, count = comments.len(), "Fetched issue comments");
        Ok(comments)
    }
}
