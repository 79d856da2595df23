use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use devchallenges_github::{Error as GitHubError, FailureKind};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::AppState;

/// Browser/CDN caching for successful responses
pub const CACHE_CONTROL: &str = "public, max-age=60";

#[derive(Debug, Deserialize)]
pub struct DiscussionsParams {
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ParticipantsParams {
    tag: Option<String>,
}

/// What to answer when a fetch fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnUnexpected {
    InternalError,
    Fallback,
}

pub async fn discussion_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    if id.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Discussion ID required" })),
        )
            .into_response();
    }

    match state.github().get_discussion(&id).await {
        Ok(discussion) => cacheable(json!({ "discussion": discussion })),
        Err(e) => soft_failure(&e, "discussion", Value::Null, OnUnexpected::InternalError),
    }
}

pub async fn discussions_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DiscussionsParams>,
) -> Response {
    let limit = parse_limit(params.limit.as_deref(), state.default_discussion_limit);

    match state.github().list_discussions(limit).await {
        Ok(discussions) => cacheable(json!({ "discussions": discussions })),
        Err(e) => soft_failure(&e, "discussions", json!([]), OnUnexpected::InternalError),
    }
}

pub async fn participants_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ParticipantsParams>,
) -> Response {
    let tag = params.tag.unwrap_or_default();

    match state.feed.participants(&tag).await {
        Ok(participants) => cacheable(json!({ "participants": participants })),
        Err(e) => soft_failure(&e, "participants", json!([]), OnUnexpected::Fallback),
    }
}

pub async fn comments_handler(
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
) -> Response {
    // A non-numeric issue number is reported like an unknown issue
    let Ok(issue_number) = number.parse::<u64>() else {
        warn!(issue = %number, "Issue number is not numeric");
        return (
            StatusCode::OK,
            Json(json!({
                "comments": [],
                "error": FailureKind::Upstream.public_message(),
            })),
        )
            .into_response();
    };

    match state.feed.issue_comments(issue_number).await {
        Ok(comments) => cacheable(json!({ "comments": comments })),
        Err(e) => soft_failure(&e, "comments", json!([]), OnUnexpected::Fallback),
    }
}

/// `limit` query value, falling back to `default` when absent, zero or not a number
pub fn parse_limit(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|&limit| limit > 0)
        .unwrap_or(default)
}

fn cacheable(body: Value) -> Response {
    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, CACHE_CONTROL)],
        Json(body),
    )
        .into_response()
}

fn soft_failure(err: &GitHubError, field: &str, empty: Value, policy: OnUnexpected) -> Response {
    let kind = err.kind();
    let mut payload = serde_json::Map::new();
    payload.insert(field.to_string(), empty);
    payload.insert("error".to_string(), json!(kind.public_message()));
    let body = Value::Object(payload);

    match kind {
        FailureKind::Disabled => {
            info!(route = field, "No GitHub token configured, serving fallback");
            cacheable(body)
        }
        FailureKind::Upstream | FailureKind::GraphQl => {
            warn!(route = field, error = %err, "GitHub request failed");
            (StatusCode::OK, Json(body)).into_response()
        }
        FailureKind::Unexpected => {
            error!(route = field, error = %err, "Unexpected error fetching from GitHub");
            let status = match policy {
                OnUnexpected::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
                OnUnexpected::Fallback => StatusCode::OK,
            };
            (status, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use devchallenges_core::{CacheConfig, GitHubConfig, GitHubToken, TtlCache};
    use devchallenges_github::GitHubClient;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app(server: &MockServer, token: Option<&str>) -> axum::Router {
        let config = GitHubConfig {
            api_url: server.uri(),
            graphql_url: format!("{}/graphql", server.uri()),
            ..GitHubConfig::default()
        };
        let client = GitHubClient::new(&config, token.and_then(GitHubToken::new)).unwrap();
        let cache = TtlCache::from_config(&CacheConfig::default());
        router(AppState::new(client, cache, 6))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Option<String>, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let cache_control = response
            .headers()
            .get(header::CACHE_CONTROL)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, cache_control, serde_json::from_slice(&bytes).unwrap())
    }

    fn discussion_node(id: &str) -> Value {
        json!({
            "id": id,
            "title": "Week 42",
            "url": "https://github.com/yoanbernabeu/DevChallenges/discussions/1",
            "createdAt": "2025-01-06T09:30:00Z",
            "author": { "login": "yoanbernabeu", "avatarUrl": "https://avatars.githubusercontent.com/u/1" },
            "category": { "name": "General", "emoji": ":speech_balloon:" },
            "comments": { "totalCount": 0 },
            "upvoteCount": 1
        })
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None, 6), 6);
        assert_eq!(parse_limit(Some("3"), 6), 3);
        assert_eq!(parse_limit(Some(" 10 "), 6), 10);
        assert_eq!(parse_limit(Some("abc"), 6), 6);
        assert_eq!(parse_limit(Some("0"), 6), 6);
        assert_eq!(parse_limit(Some("-2"), 6), 6);
    }

    #[tokio::test]
    async fn test_discussion_found() {
        let server = MockServer::start().await;
        let mut node = discussion_node("D_kwDOabc");
        node["__typename"] = json!("Discussion");
        node["body"] = json!("Post your entries");
        node["bodyHTML"] = json!("<p>Post your entries</p>");
        node["comments"] = json!({ "totalCount": 0, "nodes": [] });
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "node": node } })),
            )
            .mount(&server)
            .await;

        let (status, cache_control, body) =
            get(app(&server, Some("ghp_test")), "/api/discussion/D_kwDOabc").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_control.as_deref(), Some(CACHE_CONTROL));
        assert_eq!(body["discussion"]["id"], "D_kwDOabc");
        assert_eq!(body["discussion"]["bodyHTML"], "<p>Post your entries</p>");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_discussion_without_token() {
        let server = MockServer::start().await;
        let (status, cache_control, body) =
            get(app(&server, None), "/api/discussion/D_kwDOabc").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_control.as_deref(), Some(CACHE_CONTROL));
        assert_eq!(body, json!({ "discussion": null, "error": "No token configured" }));
    }

    #[tokio::test]
    async fn test_discussion_graphql_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "node": null },
                "errors": [{ "message": "Could not resolve to a node" }]
            })))
            .mount(&server)
            .await;

        let (status, cache_control, body) =
            get(app(&server, Some("ghp_test")), "/api/discussion/bogus").await;

        assert_eq!(status, StatusCode::OK);
        assert!(cache_control.is_none());
        assert_eq!(body, json!({ "discussion": null, "error": "GraphQL error" }));
    }

    #[tokio::test]
    async fn test_discussion_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let (status, _, body) = get(app(&server, Some("ghp_test")), "/api/discussion/D_1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "discussion": null, "error": "GitHub API error" }));
    }

    #[tokio::test]
    async fn test_discussion_unexpected_error_is_500() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let (status, cache_control, body) =
            get(app(&server, Some("ghp_test")), "/api/discussion/D_1").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(cache_control.is_none());
        assert_eq!(body, json!({ "discussion": null, "error": "Server error" }));
    }

    #[tokio::test]
    async fn test_blank_discussion_id() {
        let server = MockServer::start().await;
        let (status, _, body) = get(app(&server, Some("ghp_test")), "/api/discussion/%20").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Discussion ID required" }));
    }

    #[tokio::test]
    async fn test_discussions_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(wiremock::matchers::body_partial_json(json!({
                "variables": { "first": 3 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "repository": { "discussions": { "nodes": [
                    discussion_node("D_3"), discussion_node("D_2"), discussion_node("D_1")
                ] } } }
            })))
            .mount(&server)
            .await;

        let (status, cache_control, body) =
            get(app(&server, Some("ghp_test")), "/api/discussions?limit=3").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_control.as_deref(), Some(CACHE_CONTROL));
        let ids: Vec<&str> = body["discussions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["D_3", "D_2", "D_1"]);
    }

    #[tokio::test]
    async fn test_discussions_default_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(wiremock::matchers::body_partial_json(json!({
                "variables": { "first": 6 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "repository": { "discussions": { "nodes": [] } } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, _, body) = get(app(&server, Some("ghp_test")), "/api/discussions").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "discussions": [] }));
    }

    #[tokio::test]
    async fn test_discussions_without_token() {
        let server = MockServer::start().await;
        let (status, cache_control, body) = get(app(&server, None), "/api/discussions").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_control.as_deref(), Some(CACHE_CONTROL));
        assert_eq!(body, json!({ "discussions": [], "error": "No token configured" }));
    }

    #[tokio::test]
    async fn test_discussions_upstream_404_and_500() {
        for status_code in [404, 500] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/graphql"))
                .respond_with(ResponseTemplate::new(status_code))
                .mount(&server)
                .await;

            let (status, _, body) = get(app(&server, Some("ghp_test")), "/api/discussions").await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({ "discussions": [], "error": "GitHub API error" }));
        }
    }

    #[tokio::test]
    async fn test_participants_route() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(wiremock::matchers::query_param(
                "q",
                "repo:yoanbernabeu/DevChallenges is:issue \"#WEEK-042\"",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 2,
                "incomplete_results": false,
                "items": [
                    {
                        "number": 41, "title": "My entry", "body": null,
                        "html_url": "https://github.com/yoanbernabeu/DevChallenges/issues/41",
                        "user": { "login": "alice", "avatar_url": "https://avatars.githubusercontent.com/alice" }
                    },
                    {
                        "number": 44, "title": "Entry", "body": "Rust",
                        "html_url": "https://github.com/yoanbernabeu/DevChallenges/issues/44",
                        "user": { "login": "bob", "avatar_url": "https://avatars.githubusercontent.com/bob" }
                    }
                ]
            })))
            .mount(&server)
            .await;

        let (status, _, body) =
            get(app(&server, None), "/api/participants?tag=%23WEEK-042").await;

        assert_eq!(status, StatusCode::OK);
        let participants = body["participants"].as_array().unwrap();
        assert_eq!(participants.len(), 2);
        assert_eq!(participants[0]["issueNumber"], 41);
        assert_eq!(participants[0]["username"], "alice");
        assert_eq!(participants[0]["body"], "");
        assert_eq!(participants[1]["issueNumber"], 44);
    }

    #[tokio::test]
    async fn test_participants_upstream_error_is_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "message": "Server Error" })),
            )
            .mount(&server)
            .await;

        let (status, _, body) = get(app(&server, None), "/api/participants?tag=x").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["participants"], json!([]));
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_comments_route() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/yoanbernabeu/DevChallenges/issues/41/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 1001,
                    "body": "Nice!",
                    "user": { "login": "yoanbernabeu", "avatar_url": "https://avatars.githubusercontent.com/u/1" },
                    "created_at": "2025-01-08T14:05:00Z"
                }
            ])))
            .mount(&server)
            .await;

        let (status, cache_control, body) =
            get(app(&server, None), "/api/issues/41/comments").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_control.as_deref(), Some(CACHE_CONTROL));
        assert_eq!(
            body,
            json!({ "comments": [{
                "id": 1001,
                "username": "yoanbernabeu",
                "avatarUrl": "https://avatars.githubusercontent.com/u/1",
                "body": "Nice!",
                "createdAt": "2025-01-08T14:05:00Z"
            }] })
        );
    }

    #[tokio::test]
    async fn test_comments_invalid_number_is_empty_list() {
        let server = MockServer::start().await;
        let (status, cache_control, body) =
            get(app(&server, None), "/api/issues/abc/comments").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_control, None);
        assert_eq!(body, json!({ "comments": [], "error": "GitHub API error" }));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
