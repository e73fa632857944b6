//! Pull request context for the review-synthesis step
//!
//! Redline does not analyze code; it hands a [`PrContext`] to whatever
//! produces the review report. The context bundles the PR metadata, the
//! changed file list, and the unified diff text in one JSON-serializable
//! value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, GitHubClient, Result};

/// Everything the review-synthesis step needs to know about a PR
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrContext {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// PR body
    pub body: String,
    /// Author username
    pub author: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// Paths of every changed file
    pub changed_files: Vec<String>,
    /// Unified diff of the whole change set
    pub diff_text: String,
    /// When the PR was last updated
    pub updated_at: Option<DateTime<Utc>>,
}

impl GitHubClient {
    /// Fetch the full context for a pull request
    pub async fn fetch_pr_context(&self, number: u64) -> Result<PrContext> {
        debug!(number, "Fetching pull request context");

        let pr = self
            .client()
            .pulls(self.owner(), self.repo())
            .get(number)
            .await
            .map_err(|e| match &e {
                octocrab::Error::GitHub { source, .. }
                    if source.message.contains("Not Found") =>
                {
                    Error::PrNotFound(number)
                }
                _ => Error::Api(e),
            })?;

        let files = self
            .client()
            .pulls(self.owner(), self.repo())
            .list_files(number)
            .await
            .map_err(Error::Api)?;

        let changed_files: Vec<String> = files.items.into_iter().map(|f| f.filename).collect();

        let diff_text = self.fetch_raw_diff(number).await?;

        let context = PrContext {
            number,
            title: pr.title.unwrap_or_default(),
            body: pr.body.unwrap_or_default(),
            author: pr.user.map(|u| u.login).unwrap_or_default(),
            base_ref: pr.base.ref_field,
            head_ref: pr.head.ref_field,
            changed_files,
            diff_text,
            updated_at: pr.updated_at,
        };

        info!(
            number,
            files = context.changed_files.len(),
            "Fetched pull request context"
        );

        Ok(context)
    }

    /// Fetch the unified diff via the raw media type
    async fn fetch_raw_diff(&self, number: u64) -> Result<String> {
        let url = format!(
            "https://api.github.com/repos/{}/{}/pulls/{}",
            self.owner(),
            self.repo(),
            number
        );

        let response = reqwest::Client::new()
            .get(&url)
            .header("Accept", "application/vnd.github.v3.diff")
            .header("Authorization", format!("Bearer {}", self.token()))
            .header("User-Agent", "redline")
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::PrNotFound(number));
        }

        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_serde_roundtrip() {
        let context = PrContext {
            number: 12,
            title: "Add retry logic".to_string(),
            body: "Retries transient failures".to_string(),
            author: "octocat".to_string(),
            base_ref: "main".to_string(),
            head_ref: "retry-logic".to_string(),
            changed_files: vec!["src/retry.rs".to_string()],
            diff_text: "diff --git a/src/retry.rs b/src/retry.rs\n".to_string(),
            updated_at: None,
        };

        let json = serde_json::to_string(&context).unwrap();
        let parsed: PrContext = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.number, 12);
        assert_eq!(parsed.changed_files, context.changed_files);
        assert_eq!(parsed.diff_text, context.diff_text);
    }
}
