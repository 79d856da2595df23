//! Error types for the HTTP server

use std::net::SocketAddr;

use thiserror::Error;

/// Result type for server setup and lifecycle
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors that stop the server from starting or running
///
/// Request-level failures never surface here: routes turn them into JSON
/// responses.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] devchallenges_core::Error),

    #[error(transparent)]
    GitHub(#[from] devchallenges_github::Error),
}
