//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// No access token is configured
    #[error("No GitHub token configured")]
    MissingToken,

    /// GitHub REST API error
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Transport-level failure talking to the GraphQL endpoint
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from GitHub
    #[error("GitHub returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The GraphQL response carried an `errors` array
    #[error("GraphQL errors: {}", .0.join(", "))]
    GraphQl(Vec<String>),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid client setup
    #[error("Invalid GitHub client configuration: {0}")]
    Config(String),
}

/// How a failure should be presented to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No credential: the feature is switched off
    Disabled,
    /// GitHub answered with a non-success status
    Upstream,
    /// GitHub answered, but the GraphQL query failed
    GraphQl,
    /// Anything else (network, decoding, setup)
    Unexpected,
}

impl FailureKind {
    /// Short message shown to website clients
    pub fn public_message(self) -> &'static str {
        match self {
            FailureKind::Disabled => "No token configured",
            FailureKind::Upstream => "GitHub API error",
            FailureKind::GraphQl => "GraphQL error",
            FailureKind::Unexpected => "Server error",
        }
    }
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::MissingToken => FailureKind::Disabled,
            Error::Status { .. } | Error::Api(octocrab::Error::GitHub { .. }) => {
                FailureKind::Upstream
            }
            Error::GraphQl(_) => FailureKind::GraphQl,
            Error::Api(_) | Error::Http(_) | Error::Parse(_) | Error::Config(_) => {
                FailureKind::Unexpected
            }
        }
    }
}
