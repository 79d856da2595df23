//! Challenge participants, found by searching issues for a weekly tag

use crate::{GitHubClient, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One challenge submission (one issue)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub username: String,
    pub avatar_url: String,
    /// Issue page
    pub url: String,
    /// Issue body, empty when the issue has none
    pub body: String,
    pub issue_number: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// `GET /search/issues` response (only the fields we read)
#[derive(Debug, Clone, Deserialize)]
pub struct IssueSearchResults {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<SearchIssue>,
}

/// An issue as returned by the search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SearchIssue {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub html_url: String,
    pub user: RestUser,
}

/// REST user object
#[derive(Debug, Clone, Deserialize)]
pub struct RestUser {
    pub login: String,
    pub avatar_url: String,
}

impl From<SearchIssue> for Participant {
    fn from(issue: SearchIssue) -> Self {
        Participant {
            username: issue.user.login,
            avatar_url: issue.user.avatar_url,
            url: issue.html_url,
            body: issue.body.unwrap_or_default(),
            issue_number: issue.number,
            title: issue.title,
            stack: None,
        }
    }
}

/// One participant per search hit, in the order GitHub returned them
pub fn participants_from_search(results: IssueSearchResults) -> Vec<Participant> {
    results.items.into_iter().map(Participant::from).collect()
}

/// Search query matching issues of `owner/repo` that mention `tag`
pub fn participant_query(owner: &str, repo: &str, tag: &str) -> String {
    format!("repo:{}/{} is:issue \"{}\"", owner, repo, tag)
}

impl GitHubClient {
    /// Participants whose issue mentions `tag` (e.g. `#WEEK-042`)
    ///
    /// The tag is passed through as-is; an empty tag simply yields whatever
    /// the search endpoint returns. Only the first result page is read.
    pub async fn search_participants(&self, tag: &str) -> Result<Vec<Participant>> {
        let query = participant_query(self.owner(), self.repo(), tag);
        debug!(%query, "Searching participant issues");

        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("q", &query)
            .finish();
        let results: IssueSearchResults =
            self.rest_get(&format!("/search/issues?{}", encoded)).await?;

        let participants = participants_from_search(results);
        info!(tag, count = participants.len(), "Fetched participants");
        Ok(participants)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::client::test_support::client_for;
    use crate::{Error, FailureKind};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_query_format() {
        assert_eq!(
            participant_query("yoanbernabeu", "DevChallenges", "#WEEK-042"),
            "repo:yoanbernabeu/DevChallenges is:issue \"#WEEK-042\""
        );
    }

    #[test]
    fn test_mapping_copies_fields_verbatim() {
        let results: IssueSearchResults = serde_json::from_value(search_response(vec![
            search_issue(12, "alice", Some("Built with Rust")),
            search_issue(15, "bob", None),
        ]))
        .unwrap();

        let participants = participants_from_search(results);

        assert_eq!(participants.len(), 2);
        assert_eq!(
            participants[0],
            Participant {
                username: "alice".to_string(),
                avatar_url: "https://avatars.githubusercontent.com/alice".to_string(),
                url: "https://github.com/yoanbernabeu/DevChallenges/issues/12".to_string(),
                body: "Built with Rust".to_string(),
                issue_number: 12,
                title: "#WEEK-042 submission by alice".to_string(),
                stack: None,
            }
        );
        assert_eq!(participants[1].issue_number, 15);
        assert_eq!(participants[1].body, "");
    }

    #[test]
    fn test_participant_json_shape() {
        let participant = Participant::from(
            serde_json::from_value::<SearchIssue>(search_issue(3, "carol", None)).unwrap(),
        );
        let json = serde_json::to_value(&participant).unwrap();

        assert_eq!(json["issueNumber"], 3);
        assert_eq!(json["avatarUrl"], "https://avatars.githubusercontent.com/carol");
        assert!(json.get("stack").is_none());
    }

    #[tokio::test]
    async fn test_search_participants() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param(
                "q",
                "repo:yoanbernabeu/DevChallenges is:issue \"#WEEK-042\"",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_response(vec![
                search_issue(41, "alice", Some("Rust + Axum")),
                search_issue(44, "bob", Some("Go")),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let participants = client.search_participants("#WEEK-042").await.unwrap();

        let numbers: Vec<u64> = participants.iter().map(|p| p.issue_number).collect();
        assert_eq!(numbers, vec![41, 44]);
        assert_eq!(participants[0].username, "alice");
    }

    #[tokio::test]
    async fn test_search_with_no_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_response(vec![])))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        assert!(client.search_participants("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "message": "Validation Failed",
                "documentation_url": "https://docs.github.com/v3/search"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client.search_participants("#WEEK-042").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Upstream);
    }

    #[tokio::test]
    async fn test_search_server_error_is_sent_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client.search_participants("#WEEK-042").await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 503, .. }));
    }
}
