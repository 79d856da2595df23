//! HTTP API for the DevChallenges website.
//!
//! | Route | Payload |
//! |---|---|
//! | `GET /api/discussion/{id}` | `{discussion}` |
//! | `GET /api/discussions?limit=N` | `{discussions}` |
//! | `GET /api/participants?tag=T` | `{participants}` |
//! | `GET /api/issues/{number}/comments` | `{comments}` |
//!
//! Failures are "soft": the payload is emptied (`null` or `[]`), an `error`
//! string is added and the status stays 200 so the website can show its
//! fallback UI. The only exception is an unexpected failure (network, bad
//! response body) on the two discussion routes, which answers 500.
//!
//! The GitHub token stays on the server and never appears in a response.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub mod error;
pub mod routes;
pub mod state;

pub use error::{Result, ServerError};
pub use state::AppState;

use routes::{comments_handler, discussion_handler, discussions_handler, participants_handler};

/// All API routes
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/discussion/{id}", get(discussion_handler))
        .route("/api/discussions", get(discussions_handler))
        .route("/api/participants", get(participants_handler))
        .route("/api/issues/{number}/comments", get(comments_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until Ctrl+C or SIGTERM
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!("Server running on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
