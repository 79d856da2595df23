//! DevChallenges GitHub - GitHub data for the DevChallenges website
//!
//! Discussions come from the GraphQL API, participants from the issue search
//! endpoint and issue comments from the REST API. [`ChallengeFeed`] puts the
//! time-boxed cache in front of all three.

mod client;
mod comments;
mod discussions;
mod error;
mod feed;
mod graphql;
mod participants;

pub use client::GitHubClient;
pub use comments::IssueComment;
pub use discussions::{
    Actor, Category, CommentCount, Discussion, DiscussionComment, DiscussionComments,
    DiscussionDetail, DISCUSSION_COMMENT_LIMIT, MAX_PAGE_SIZE,
};
pub use error::{Error, FailureKind, Result};
pub use feed::ChallengeFeed;
pub use participants::{
    participant_query, participants_from_search, IssueSearchResults, Participant, RestUser,
    SearchIssue,
};
