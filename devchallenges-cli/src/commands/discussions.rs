//! Discussion commands

use clap::Args;
use devchallenges_core::{config::DEFAULT_DISCUSSION_LIMIT, Config};
use devchallenges_github::{Actor, DiscussionDetail};

use super::{disabled_or_err, feed, print_json};

/// List the most recent discussions
#[derive(Args, Debug)]
pub struct DiscussionsArgs {
    /// Number of discussions to fetch (1-100)
    #[arg(short = 'n', long, default_value_t = DEFAULT_DISCUSSION_LIMIT)]
    pub limit: u32,

    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

/// Show a single discussion with its comments
#[derive(Args, Debug)]
pub struct DiscussionArgs {
    /// Discussion node ID (e.g. D_kwDO...)
    #[arg(required = true)]
    pub id: String,

    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

fn author_name(author: Option<&Actor>) -> &str {
    author.map(|a| a.login.as_str()).unwrap_or("ghost")
}

impl DiscussionsArgs {
    /// Execute the discussions command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        let feed = feed(config)?;

        if verbose {
            println!(
                "Fetching {} discussions from {}/{}...",
                self.limit,
                config.github.owner,
                config.github.repo
            );
        }

        let discussions = match feed.discussions(self.limit).await {
            Ok(discussions) => discussions,
            Err(e) => return disabled_or_err(e, config),
        };

        if self.json {
            return print_json(&discussions);
        }

        if discussions.is_empty() {
            println!("No discussions found.");
            return Ok(());
        }

        println!(
            "Discussions in {}/{} ({} found)",
            config.github.owner,
            config.github.repo,
            discussions.len()
        );
        println!();

        for d in discussions {
            println!("{} {}", d.category.emoji, d.title);
            println!(
                "    by {} on {} | {} comments | {} upvotes",
                author_name(d.author.as_ref()),
                d.created_at.format("%Y-%m-%d"),
                d.comments.total_count,
                d.upvote_count
            );
            println!("    {}", d.url);
        }

        Ok(())
    }
}

impl DiscussionArgs {
    /// Execute the discussion command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let feed = feed(config)?;

        let discussion = match feed.client().get_discussion(&self.id).await {
            Ok(discussion) => discussion,
            Err(e) => return disabled_or_err(e, config),
        };

        if self.json {
            return print_json(&discussion);
        }

        match discussion {
            Some(discussion) => print_discussion(&discussion),
            None => println!("Discussion {} not found.", self.id),
        }

        Ok(())
    }
}

fn print_discussion(d: &DiscussionDetail) {
    let heading = format!("{} {}", d.category.emoji, d.title);
    println!();
    println!("{}", heading);
    println!("{}", "=".repeat(heading.chars().count()));
    println!();
    println!("Author: {}", author_name(d.author.as_ref()));
    println!("Created: {}", d.created_at.format("%Y-%m-%d %H:%M UTC"));
    println!("Category: {}", d.category.name);
    println!("Upvotes: {}", d.upvote_count);
    println!("URL: {}", d.url);

    if !d.body.trim().is_empty() {
        println!();
        for line in d.body.lines() {
            println!("  {}", line);
        }
    }

    println!();
    println!(
        "Comments ({} of {}):",
        d.comments.nodes.len(),
        d.comments.total_count
    );
    for comment in &d.comments.nodes {
        println!();
        println!(
            "--- {} on {} (+{}) ---",
            author_name(comment.author.as_ref()),
            comment.created_at.format("%Y-%m-%d %H:%M"),
            comment.upvote_count
        );
        for line in comment.body.lines().take(20) {
            println!("  {}", line);
        }
        if comment.body.lines().count() > 20 {
            println!("  ...(truncated)");
        }
    }
}
