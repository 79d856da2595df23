//! Serve command - run the HTTP API

use clap::Args;
use devchallenges_core::Config;
use devchallenges_server::AppState;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Discussions returned when a request has no `limit` (overrides config)
    #[arg(long)]
    pub default_limit: Option<u32>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut config = config.clone();
        if let Some(limit) = self.default_limit {
            config.server.default_discussion_limit = limit.max(1);
        }

        let addr = config.bind_addr()?;
        let state = AppState::from_config(&config)?;

        tracing::info!(
            %addr,
            owner = %config.github.owner,
            repo = %config.github.repo,
            "Starting DevChallenges API"
        );

        devchallenges_server::serve(state, addr).await?;
        Ok(())
    }
}
