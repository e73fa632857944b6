//! Comment command - post the review as one conversation comment

use clap::Args;
use redline_github::GitHubClient;

use super::read_input;

/// Post a review as a single conversation comment
#[derive(Args, Debug)]
pub struct CommentArgs {
    /// Pull request number
    pr: u64,

    /// File holding the comment body ("-" for stdin)
    #[arg(long, default_value = "-")]
    body_file: String,
}

impl CommentArgs {
    /// Execute the comment command
    pub async fn execute(&self, repo: &str) -> anyhow::Result<()> {
        let body = read_input(&self.body_file)?;

        let client = GitHubClient::from_url(repo)?;
        let url = client.post_comment(self.pr, &body).await?;

        println!("Comment posted: {}", url);

        Ok(())
    }
}
