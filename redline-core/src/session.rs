//! Review session state machine
//!
//! A [`ReviewSession`] accumulates inline annotations into a pending review
//! and submits them as one unit. The session is an explicit owned value, not
//! something inferred from the rendered view, so the state machine is
//! testable without a browser.
//!
//! Lifecycle: sessions start `Closed`; the first successfully placed
//! annotation opens the session (using the start-review control), later
//! placements append to it, and only [`ReviewSession::finalize`] closes it
//! again. Until finalization every placed annotation is a draft visible only
//! to the automation's own account.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::report::SubmissionRecord;
use crate::surface::{Anchor, DiffSurface, PlacementMode};
use crate::target::{Annotation, DiffTarget};
use crate::{Error, Result};

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No pending review exists
    Closed,
    /// A pending review is accumulating annotations
    Open,
}

/// The placement stage at which an operation failed or timed out
///
/// Carried in errors so a failure report names file, line, side, and stage
/// with enough detail for a human to finish that one annotation by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceStage {
    /// Resolving the target to an anchor in the rendered diff
    Locate,
    /// Opening the hidden per-line comment control
    Activate,
    /// Writing the body into the comment form
    Edit,
    /// Pressing the start-review / add-to-review control
    Submit,
    /// Waiting for the annotation to show as pending
    Confirm,
}

impl std::fmt::Display for PlaceStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PlaceStage::Locate => "locate",
            PlaceStage::Activate => "activate",
            PlaceStage::Edit => "edit",
            PlaceStage::Submit => "submit",
            PlaceStage::Confirm => "confirm",
        };
        write!(f, "{}", label)
    }
}

/// Timeouts and poll cadence for readback confirmations
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// How long to wait for each per-annotation confirmation
    pub confirm_timeout: Duration,
    /// How long to wait for the final review submission to confirm
    pub finalize_timeout: Duration,
    /// Interval between readback probes
    pub poll_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            confirm_timeout: Duration::from_secs(15),
            finalize_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// What a confirmation poll is waiting for
#[derive(Debug, Clone, Copy)]
enum Probe<'a> {
    /// An empty, editable comment form is attached to the anchor
    FormReady,
    /// The form content equals the written body
    BodyEquals(&'a str),
    /// The annotation shows as pending on the line
    Pending,
}

/// An in-progress review pass over one pull request
///
/// Owns the only mutable shared state in a pass. A session must not be
/// reused across unrelated pull requests; create a fresh one per review.
/// `place` and `finalize` take the surface by exclusive reference, so
/// concurrent placement is unrepresentable rather than merely forbidden.
#[derive(Debug)]
pub struct ReviewSession {
    state: SessionState,
    placed_count: u32,
    options: SessionOptions,
}

impl ReviewSession {
    /// Create a closed session with default timeouts
    pub fn new() -> Self {
        Self::with_options(SessionOptions::default())
    }

    /// Create a closed session with explicit timeouts
    pub fn with_options(options: SessionOptions) -> Self {
        Self {
            state: SessionState::Closed,
            placed_count: 0,
            options,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a pending review is open
    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Number of annotations placed so far in this session
    pub fn placed_count(&self) -> u32 {
        self.placed_count
    }

    /// Place one annotation into the session
    ///
    /// Runs locate, activate, edit, and submit strictly in order, confirming
    /// each step through a bounded readback poll before moving on. Session
    /// state and the placed count change only after the final confirmation:
    /// a failure at any stage leaves the session exactly as it was and
    /// surfaces an error naming the target.
    ///
    /// A failed `place` is not safely retryable blind; a partial failure may
    /// have left an open form with text in it. Use
    /// [`ReviewSession::editor_is_clear`] before retrying a target.
    pub async fn place<S: DiffSurface>(
        &mut self,
        surface: &mut S,
        annotation: &Annotation,
    ) -> Result<()> {
        let target = &annotation.target;
        let mode = match self.state {
            SessionState::Closed => PlacementMode::StartReview,
            SessionState::Open => PlacementMode::AddToReview,
        };

        debug!(%target, ?mode, "Placing annotation");

        // Locate: unique anchor, expanded and scrolled into view.
        let anchor = surface.locate(target).await?;

        // Activate: open the comment form, then verify it actually opened.
        surface.open_comment_form(&anchor).await?;
        self.confirm(surface, &anchor, Probe::FormReady, PlaceStage::Activate)
            .await?;

        // Edit: write through the framework's own setter, then read back.
        surface.write_body(&anchor, &annotation.body).await?;
        self.confirm(
            surface,
            &anchor,
            Probe::BodyEquals(&annotation.body),
            PlaceStage::Edit,
        )
        .await?;

        // Submit this annotation and wait for it to show as pending.
        surface.submit_annotation(&anchor, mode).await?;
        self.confirm(surface, &anchor, Probe::Pending, PlaceStage::Confirm)
            .await?;

        // Only now does the session change.
        if self.state == SessionState::Closed {
            self.state = SessionState::Open;
            info!(%target, "Review session opened");
        }
        self.placed_count += 1;
        info!(%target, placed = self.placed_count, "Annotation pending");

        Ok(())
    }

    /// Submit the accumulated session as one review unit
    ///
    /// Requires an open session; fails with [`Error::NoOpenSession`] on a
    /// closed one, including on a second finalize. On success the session
    /// transitions to `Closed` and the annotations become visible to the
    /// change's author. A submission failure leaves the session open and the
    /// pending annotations intact for manual completion.
    pub async fn finalize<S: DiffSurface>(
        &mut self,
        surface: &mut S,
        record: &SubmissionRecord,
    ) -> Result<()> {
        if self.state != SessionState::Open {
            return Err(Error::NoOpenSession);
        }

        info!(
            verdict = %record.verdict,
            placed = self.placed_count,
            "Submitting review"
        );

        surface.submit_review(record).await?;

        let deadline = Instant::now() + self.options.finalize_timeout;
        loop {
            if surface.review_submitted().await? {
                break;
            }
            if Instant::now() >= deadline {
                warn!("Review submission did not confirm; pending annotations left in place");
                return Err(Error::SubmissionTimeout);
            }
            sleep(self.options.poll_interval).await;
        }

        self.state = SessionState::Closed;
        info!(placed = self.placed_count, "Review session closed");

        Ok(())
    }

    /// Whether the target has no comment form holding text
    ///
    /// The re-verification required before retrying a failed `place`: a
    /// retry against a form that already holds text risks submitting
    /// duplicate or stale content.
    pub async fn editor_is_clear<S: DiffSurface>(
        &self,
        surface: &mut S,
        target: &DiffTarget,
    ) -> Result<bool> {
        let anchor = surface.locate(target).await?;
        match surface.read_body(&anchor).await {
            Ok(body) => Ok(body.is_empty()),
            Err(Error::EditorNotReady { .. }) => Ok(true),
            Err(e) => Err(e),
        }
    }

    /// Poll one readback until it reports success or the timeout elapses
    async fn confirm<S: DiffSurface>(
        &self,
        surface: &mut S,
        anchor: &Anchor,
        probe: Probe<'_>,
        stage: PlaceStage,
    ) -> Result<()> {
        let deadline = Instant::now() + self.options.confirm_timeout;
        loop {
            let hit = match probe {
                Probe::FormReady => surface.comment_form_ready(anchor).await?,
                Probe::BodyEquals(expected) => surface.read_body(anchor).await? == expected,
                Probe::Pending => surface.annotation_pending(anchor).await?,
            };
            if hit {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::ConfirmationTimeout {
                    target: anchor.target.clone(),
                    stage,
                });
            }
            sleep(self.options.poll_interval).await;
        }
    }
}

impl Default for ReviewSession {
    fn default() -> Self {
        Self::new()
    }
}
