//! Single-comment posting
//!
//! The fallback path when inline placement is not selected: the whole
//! assessment goes up as one conversation comment through the API, no
//! browser involved.

use tracing::info;

use crate::{Error, GitHubClient, Result};

impl GitHubClient {
    /// Post a single comment on a pull request's conversation
    ///
    /// Returns the URL of the created comment.
    pub async fn post_comment(&self, number: u64, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::Other("refusing to post an empty comment".to_string()));
        }

        let comment = self
            .client()
            .issues(self.owner(), self.repo())
            .create_comment(number, text)
            .await
            .map_err(|e| match &e {
                octocrab::Error::GitHub { source, .. }
                    if source.message.contains("Not Found") =>
                {
                    Error::PrNotFound(number)
                }
                _ => Error::Api(e),
            })?;

        info!(number, comment_id = comment.id.0, "Posted PR comment");

        Ok(comment.html_url.to_string())
    }
}
