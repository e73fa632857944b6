//! Annotate command - place a review report as inline annotations
//!
//! Drives one review session over the PR's rendered diff: every annotation
//! in the report is placed in order, a per-annotation failure skips that
//! finding and continues, and the session is finalized with the report's
//! verdict and summary. Annotations placed before a fatal failure stay
//! pending on the PR for manual completion.

use clap::Args;
use redline_browser::{GithubDiffSurface, PageBridge};
use redline_core::{Config, ReviewReport, ReviewSession};
use redline_github::GitHubClient;
use tracing::warn;

use super::read_input;

/// Place a review report as inline annotations on the PR diff
#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Pull request number
    pr: u64,

    /// File holding the review report JSON ("-" for stdin)
    #[arg(long, default_value = "-")]
    report: String,
}

impl AnnotateArgs {
    /// Execute the annotate command
    pub async fn execute(&self, repo: &str, config: &Config) -> anyhow::Result<()> {
        let report = ReviewReport::from_json(&read_input(&self.report)?)?;

        let client = GitHubClient::from_url(repo)?;
        let files_url = client.files_url(&config.browser.base_url, self.pr);

        let bridge = PageBridge::launch(&config.browser).await?;
        let mut surface =
            GithubDiffSurface::open(bridge, &files_url, config.timeouts.clone()).await?;
        let mut session = ReviewSession::with_options(config.timeouts.session_options());

        let mut failures: Vec<String> = Vec::new();
        for annotation in &report.annotations {
            if let Err(e) = session.place(&mut surface, annotation).await {
                // Skip this finding; the session and prior placements survive.
                warn!(target = %annotation.target, error = %e, "Annotation not placed");
                failures.push(format!("  {}: {}", annotation.target, e));
            }
        }

        if !session.is_open() {
            surface.close().await.ok();
            anyhow::bail!(
                "none of the {} annotations could be placed:\n{}",
                report.annotations.len(),
                failures.join("\n")
            );
        }

        session.finalize(&mut surface, &report.record).await?;
        surface.close().await?;

        println!(
            "Review submitted: {} ({} of {} annotations placed)",
            report.record.verdict,
            session.placed_count(),
            report.annotations.len()
        );

        if !failures.is_empty() {
            eprintln!("Annotations needing manual placement:");
            for failure in &failures {
                eprintln!("{}", failure);
            }
            anyhow::bail!(
                "{} of {} annotations were not placed",
                failures.len(),
                report.annotations.len()
            );
        }

        Ok(())
    }
}
