//! Repository discussions (GraphQL only)

use crate::{GitHubClient, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

/// Largest page GitHub's GraphQL API accepts
pub const MAX_PAGE_SIZE: u32 = 100;

/// Comments fetched alongside a single discussion
pub const DISCUSSION_COMMENT_LIMIT: u32 = 20;

/// Discussion or comment author (`null` for deleted accounts)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub login: String,
    pub avatar_url: String,
}

/// Discussion category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Emoji shortcode, e.g. `:speech_balloon:`
    pub emoji: String,
}

/// Comment counter of a listed discussion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentCount {
    pub total_count: u32,
}

/// A discussion as shown in the recent discussions list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    pub id: String,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub author: Option<Actor>,
    pub category: Category,
    pub comments: CommentCount,
    pub upvote_count: u32,
}

/// A single discussion with its first comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionDetail {
    pub id: String,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub body: String,
    #[serde(rename = "bodyHTML")]
    pub body_html: String,
    pub author: Option<Actor>,
    pub category: Category,
    pub upvote_count: u32,
    pub comments: DiscussionComments,
}

/// Comment page of a discussion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionComments {
    pub total_count: u32,
    #[serde(default)]
    pub nodes: Vec<DiscussionComment>,
}

/// A top-level discussion comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionComment {
    pub id: String,
    pub body: String,
    #[serde(rename = "bodyHTML")]
    pub body_html: String,
    pub created_at: DateTime<Utc>,
    pub author: Option<Actor>,
    pub upvote_count: u32,
}

const LIST_DISCUSSIONS_QUERY: &str = r#"
    query($owner: String!, $name: String!, $first: Int!) {
        repository(owner: $owner, name: $name) {
            discussions(first: $first, orderBy: {field: CREATED_AT, direction: DESC}) {
                nodes {
                    id
                    title
                    url
                    createdAt
                    author {
                        login
                        avatarUrl
                    }
                    category {
                        name
                        emoji
                    }
                    comments {
                        totalCount
                    }
                    upvoteCount
                }
            }
        }
    }
"#;

const DISCUSSION_QUERY: &str = r#"
    query($id: ID!, $comments: Int!) {
        node(id: $id) {
            __typename
            ... on Discussion {
                id
                title
                url
                createdAt
                body
                bodyHTML
                author {
                    login
                    avatarUrl
                }
                category {
                    name
                    emoji
                }
                upvoteCount
                comments(first: $comments) {
                    totalCount
                    nodes {
                        id
                        body
                        bodyHTML
                        createdAt
                        author {
                            login
                            avatarUrl
                        }
                        upvoteCount
                    }
                }
            }
        }
    }
"#;

#[derive(Debug, Deserialize)]
struct RepositoryDiscussions {
    repository: Option<RepositoryData>,
}

#[derive(Debug, Deserialize)]
struct RepositoryData {
    discussions: Option<DiscussionConnection>,
}

#[derive(Debug, Deserialize)]
struct DiscussionConnection {
    #[serde(default)]
    nodes: Vec<Option<Discussion>>,
}

#[derive(Debug, Deserialize)]
struct NodeLookup {
    node: Option<Node>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum Node {
    Discussion(DiscussionDetail),
    #[serde(other)]
    Other,
}

impl GitHubClient {
    /// Most recent discussions of the repository, newest first
    ///
    /// `limit` is clamped to `1..=100`.
    pub async fn list_discussions(&self, limit: u32) -> Result<Vec<Discussion>> {
        let first = limit.clamp(1, MAX_PAGE_SIZE);
        debug!(limit = first, "Fetching discussions");

        let variables = json!({
            "owner": self.owner(),
            "name": self.repo(),
            "first": first,
        });

        let discussions: Vec<Discussion> = self
            .graphql_query::<RepositoryDiscussions>(LIST_DISCUSSIONS_QUERY, &variables)
            .await?
            .and_then(|r| r.repository)
            .and_then(|r| r.discussions)
            .map(|c| c.nodes.into_iter().flatten().collect())
            .unwrap_or_default();

        info!(count = discussions.len(), "Fetched discussions");
        Ok(discussions)
    }

    /// A single discussion by node ID, with up to 20 comments
    ///
    /// Returns `Ok(None)` when the ID does not resolve to a discussion.
    pub async fn get_discussion(&self, id: &str) -> Result<Option<DiscussionDetail>> {
        debug!(id, "Fetching discussion");

        let variables = json!({
            "id": id,
            "comments": DISCUSSION_COMMENT_LIMIT,
        });

        let node = self
            .graphql_query::<NodeLookup>(DISCUSSION_QUERY, &variables)
            .await?
            .and_then(|lookup| lookup.node);

        Ok(match node {
            Some(Node::Discussion(discussion)) => Some(discussion),
            Some(Node::Other) => {
                debug!(id, "Node is not a discussion");
                None
            }
            None => None,
        })
    }
}
