//! GitHub GraphQL API support (discussions are only exposed through GraphQL)

use crate::{Error, GitHubClient, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

/// GraphQL query response wrapper
#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    data: Option<serde_json::Value>,
    errors: Option<Vec<GraphQLError>>,
}

/// GraphQL error
#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
}

impl GitHubClient {
    /// Execute a GraphQL query
    ///
    /// Returns `Ok(None)` when the response has no `data`. A non-null `errors`
    /// field fails the whole query, even if it is empty or data came back.
    pub(crate) async fn graphql_query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: &serde_json::Value,
    ) -> Result<Option<T>> {
        let token = self.token().ok_or(Error::MissingToken)?;

        debug!(url = %self.graphql_url(), "Sending GraphQL query");

        let response = self
            .http()
            .post(self.graphql_url().clone())
            .bearer_auth(token.expose())
            .json(&json!({
                "query": query,
                "variables": variables,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response".to_string());
            warn!(status = status.as_u16(), "GraphQL request failed");
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let graphql_response: GraphQLResponse = serde_json::from_slice(&bytes)
            .map_err(|e| Error::Parse(format!("Failed to parse GraphQL response: {}", e)))?;

        if let Some(errors) = graphql_response.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            warn!(errors = ?messages, "GraphQL query returned errors");
            return Err(Error::GraphQl(messages));
        }

        match graphql_response.data {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(data) => serde_json::from_value(data)
                .map(Some)
                .map_err(|e| Error::Parse(format!("Unexpected GraphQL data shape: {}", e))),
        }
    }
}
