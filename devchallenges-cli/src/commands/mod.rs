//! CLI command implementations

pub mod comments;
pub mod discussions;
pub mod participants;
pub mod serve;

pub use comments::CommentsArgs;
pub use discussions::{DiscussionArgs, DiscussionsArgs};
pub use participants::ParticipantsArgs;
pub use serve::ServeArgs;

use std::sync::Arc;

use devchallenges_core::{Config, TtlCache};
use devchallenges_github::{ChallengeFeed, FailureKind, GitHubClient};
use serde::Serialize;

/// Cached GitHub access for one-shot commands
pub(crate) fn feed(config: &Config) -> anyhow::Result<ChallengeFeed> {
    let client = GitHubClient::from_config(&config.github)?;
    Ok(ChallengeFeed::new(
        Arc::new(client),
        TtlCache::from_config(&config.cache),
    ))
}

/// Print `value` as pretty JSON
pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Turn a missing token into a notice instead of a failure
pub(crate) fn disabled_or_err(
    err: devchallenges_github::Error,
    config: &Config,
) -> anyhow::Result<()> {
    if err.kind() == FailureKind::Disabled {
        eprintln!(
            "GitHub token not configured: set {} to enable discussions.",
            config.github.token_env
        );
        return Ok(());
    }
    Err(err.into())
}
