//! DevChallenges CLI - serve or query the website's GitHub data
//!
//! Discussions, challenge participants and issue comments from the
//! DevChallenges repository.

mod commands;

use clap::{Parser, Subcommand};
use devchallenges_core::{Config, Secrets};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{CommentsArgs, DiscussionArgs, DiscussionsArgs, ParticipantsArgs, ServeArgs};

/// DevChallenges: GitHub discussions, participants and comments for the website
#[derive(Parser, Debug)]
#[command(name = "devchallenges")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Repository owner (overrides config and env)
    #[arg(long, global = true, env = "DEVCHALLENGES_OWNER")]
    owner: Option<String>,

    /// Repository name (overrides config and env)
    #[arg(long, global = true, env = "DEVCHALLENGES_REPO")]
    repo: Option<String>,

    /// Server listen address (overrides config and env)
    #[arg(long, global = true, env = "DEVCHALLENGES_BIND")]
    bind: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Run the HTTP API
    #[command(visible_alias = "s")]
    Serve(ServeArgs),

    /// List recent discussions
    Discussions(DiscussionsArgs),

    /// Show one discussion with its comments
    Discussion(DiscussionArgs),

    /// List participants for a challenge tag
    #[command(visible_alias = "p")]
    Participants(ParticipantsArgs),

    /// Show comments on an issue
    Comments(CommentsArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = Config::load_with_overrides(cli.owner.clone(), cli.repo.clone(), cli.bind.clone())?;

    if cli.verbose {
        tracing::debug!(
            owner = %config.github.owner,
            repo = %config.github.repo,
            bind = %config.server.bind,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("devchallenges {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Discussions(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Discussion(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Participants(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Comments(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config) => print_config(&config)?,
        None => {
            println!("DevChallenges - GitHub data for the DevChallenges website");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config) -> anyhow::Result<()> {
    let token = Secrets::discover_token(&config.github.token_env)?;

    println!("DevChallenges Configuration");
    println!("===========================");
    println!();
    println!("GitHub:");
    println!("  repository: {}/{}", config.github.owner, config.github.repo);
    println!("  api_url: {}", config.github.api_url);
    println!("  graphql_url: {}", config.github.graphql_url);
    println!(
        "  token ({}): {}",
        config.github.token_env,
        if token.is_some() { "present" } else { "absent" }
    );
    println!();
    println!("Server:");
    println!("  bind: {}", config.server.bind);
    println!(
        "  default_discussion_limit: {}",
        config.server.default_discussion_limit
    );
    println!();
    println!("Cache:");
    println!("  ttl: {}s", config.cache.ttl.as_secs());
    println!("  prefix: {}", config.cache.prefix);
    match config.cache.max_entries {
        Some(max) => println!("  max_entries: {}", max),
        None => println!("  max_entries: (unbounded)"),
    }
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }

    Ok(())
}
