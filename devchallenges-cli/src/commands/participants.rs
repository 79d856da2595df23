//! Participants command - list submissions for a weekly tag

use clap::Args;
use devchallenges_core::Config;

use super::{feed, print_json};

/// List participants whose issue mentions a tag
#[derive(Args, Debug)]
pub struct ParticipantsArgs {
    /// Challenge tag, e.g. "#WEEK-042"
    #[arg(required = true)]
    pub tag: String,

    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

impl ParticipantsArgs {
    /// Execute the participants command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        let feed = feed(config)?;

        if verbose {
            println!(
                "Searching {}/{} for \"{}\"...",
                config.github.owner, config.github.repo, self.tag
            );
        }

        let participants = feed.participants(&self.tag).await?;

        if self.json {
            return print_json(&participants);
        }

        if participants.is_empty() {
            println!("No participants for {} yet.", self.tag);
            return Ok(());
        }

        println!("Participants for {} ({} found)", self.tag, participants.len());
        println!();

        for p in participants {
            println!("#{}: {} (@{})", p.issue_number, p.title, p.username);
            println!("    {}", p.url);
        }

        Ok(())
    }
}
