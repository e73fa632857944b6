//! Redline CLI - Inline PR review annotation
//!
//! Fetches pull-request context for an external review step, then publishes
//! the resulting report either as browser-placed inline annotations or as a
//! single conversation comment.

mod commands;

use clap::{Parser, Subcommand};
use redline_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{AnnotateArgs, CommentArgs, ContextArgs};

/// Redline: browser-driven inline review annotation for pull requests
#[derive(Parser, Debug)]
#[command(name = "redline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Repository (owner/repo or URL)
    #[arg(long, global = true, env = "REDLINE_REPO")]
    repo: Option<String>,

    /// Path to node executable (overrides config and env)
    #[arg(long, global = true, env = "REDLINE_NODE_PATH")]
    node_path: Option<String>,

    /// Run the browser with a visible window
    #[arg(long, global = true)]
    headful: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Print pull-request context JSON for the review step
    #[command(visible_alias = "ctx")]
    Context(ContextArgs),

    /// Place a review report as inline annotations on the PR diff
    #[command(visible_alias = "a")]
    Annotate(AnnotateArgs),

    /// Post a review as a single conversation comment
    Comment(CommentArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let repo = cli.repo.clone();

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.node_path.clone(), cli.headful)?;

    if cli.verbose {
        tracing::info!(
            node_path = %config.browser.node_path,
            headless = config.browser.headless,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("redline {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Context(args)) => {
            args.execute(require_repo(repo.as_deref())?).await?;
        }
        Some(Commands::Annotate(args)) => {
            args.execute(require_repo(repo.as_deref())?, &config).await?;
        }
        Some(Commands::Comment(args)) => {
            args.execute(require_repo(repo.as_deref())?).await?;
        }
        Some(Commands::Config) => {
            println!("Redline Configuration");
            println!("=====================");
            println!();
            println!("Browser Settings:");
            println!("  node_path: {}", config.browser.node_path);
            println!("  headless: {}", config.browser.headless);
            println!(
                "  profile_dir: {}",
                config
                    .browser
                    .profile_dir
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(none)".to_string())
            );
            println!("  base_url: {}", config.browser.base_url);
            println!();
            println!("Timeouts:");
            println!("  locate: {:?}", config.timeouts.locate);
            println!("  confirm: {:?}", config.timeouts.confirm);
            println!("  finalize: {:?}", config.timeouts.finalize);
            println!("  poll_interval: {:?}", config.timeouts.poll_interval);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("Redline - inline PR review annotation");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn require_repo(repo: Option<&str>) -> anyhow::Result<&str> {
    repo.ok_or_else(|| anyhow::anyhow!("repository not set; pass --repo or set REDLINE_REPO"))
}
