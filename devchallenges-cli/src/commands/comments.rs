//! Comments command - show comments on a submission issue

use clap::Args;
use devchallenges_core::Config;

use super::{feed, print_json};

/// Show comments on an issue
#[derive(Args, Debug)]
pub struct CommentsArgs {
    /// Issue number
    #[arg(required = true)]
    pub number: u64,

    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

impl CommentsArgs {
    /// Execute the comments command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let feed = feed(config)?;
        let comments = feed.issue_comments(self.number).await?;

        if self.json {
            return print_json(&comments);
        }

        if comments.is_empty() {
            println!("No comments on #{}.", self.number);
            return Ok(());
        }

        println!("Comments on #{} ({})", self.number, comments.len());

        for comment in comments {
            println!();
            println!(
                "--- {} on {} ---",
                comment.username,
                comment.created_at.format("%Y-%m-%d %H:%M UTC")
            );
            for line in comment.body.lines() {
                println!("  {}", line);
            }
        }

        Ok(())
    }
}
