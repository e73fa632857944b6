//! The GitHub diff surface
//!
//! Composes the locator, activator, editor, and session controls into one
//! [`DiffSurface`] over a loaded pull-request files page. The session
//! engine never sees anything below this type.

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use redline_core::{
    poll, Anchor, DiffSurface, DiffTarget, Error, PlacementMode, Result, SubmissionRecord,
    TimeoutConfig,
};

use crate::bridge::PageBridge;
use crate::locator::status_of;
use crate::{activator, controls, editor, locator, scripts};

/// A pull-request files page driven through the Playwright sidecar
pub struct GithubDiffSurface {
    page: PageBridge,
    timeouts: TimeoutConfig,
    anchor_seq: u64,
}

impl GithubDiffSurface {
    /// Navigate an already-launched page to the PR's files view
    ///
    /// Waits for the diff container to render before returning; an
    /// unauthenticated or missing page surfaces here, not mid-placement.
    pub async fn open(page: PageBridge, files_url: &str, timeouts: TimeoutConfig) -> Result<Self> {
        page.goto(files_url).await?;

        let ready_script = scripts::diff_ready();
        let script = ready_script.as_str();
        let page_ref = &page;
        let ready = poll::until(timeouts.poll_interval, timeouts.locate, move || async move {
            let response = page_ref.eval(script).await?;
            Ok(status_of(&response) == "ok"
                && response.get("ready").and_then(Value::as_bool).unwrap_or(false))
        })
        .await?;

        if !ready {
            return Err(Error::Driver(format!(
                "diff view never rendered at {}; check the URL and login state",
                files_url
            )));
        }

        info!(url = files_url, "Diff view ready");

        Ok(Self {
            page,
            timeouts,
            anchor_seq: 0,
        })
    }

    /// Close the underlying browser
    pub async fn close(self) -> Result<()> {
        self.page.close().await?;
        Ok(())
    }
}

#[async_trait]
impl DiffSurface for GithubDiffSurface {
    async fn locate(&mut self, target: &DiffTarget) -> Result<Anchor> {
        self.anchor_seq += 1;
        let token = format!("redline-{}", self.anchor_seq);
        locator::resolve(
            &self.page,
            target,
            &token,
            self.timeouts.locate,
            self.timeouts.poll_interval,
        )
        .await
    }

    async fn open_comment_form(&mut self, anchor: &Anchor) -> Result<()> {
        activator::open(&self.page, anchor).await
    }

    async fn comment_form_ready(&mut self, anchor: &Anchor) -> Result<bool> {
        activator::form_ready(&self.page, anchor).await
    }

    async fn write_body(&mut self, anchor: &Anchor, body: &str) -> Result<()> {
        editor::write(&self.page, anchor, body).await
    }

    async fn read_body(&mut self, anchor: &Anchor) -> Result<String> {
        editor::read(&self.page, anchor).await
    }

    async fn submit_annotation(&mut self, anchor: &Anchor, mode: PlacementMode) -> Result<()> {
        controls::submit_annotation(&self.page, anchor, mode).await
    }

    async fn annotation_pending(&mut self, anchor: &Anchor) -> Result<bool> {
        controls::annotation_pending(&self.page, anchor).await
    }

    async fn submit_review(&mut self, record: &SubmissionRecord) -> Result<()> {
        controls::submit_review(
            &self.page,
            record,
            self.timeouts.poll_interval,
            self.timeouts.finalize,
        )
        .await
    }

    async fn review_submitted(&mut self) -> Result<bool> {
        controls::review_submitted(&self.page).await
    }
}

impl std::fmt::Debug for GithubDiffSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubDiffSurface")
            .field("anchor_seq", &self.anchor_seq)
            .finish_non_exhaustive()
    }
}
