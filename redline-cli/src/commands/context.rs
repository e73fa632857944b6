//! Context command - print PR context JSON for the review step

use clap::Args;
use redline_github::GitHubClient;

/// Print pull-request context JSON
#[derive(Args, Debug)]
pub struct ContextArgs {
    /// Pull request number
    pr: u64,
}

impl ContextArgs {
    /// Execute the context command
    pub async fn execute(&self, repo: &str) -> anyhow::Result<()> {
        let client = GitHubClient::from_url(repo)?;
        let context = client.fetch_pr_context(self.pr).await?;

        println!("{}", serde_json::to_string_pretty(&context)?);

        Ok(())
    }
}
