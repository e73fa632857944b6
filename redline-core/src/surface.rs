//! The rendered-diff surface boundary
//!
//! [`DiffSurface`] is the seam between the session engine and whatever
//! renders the diff being annotated. The engine only ever talks in terms of
//! targets, anchors, and readbacks; how an implementation finds hidden
//! comment controls or feeds text through a UI framework's internals stays
//! behind this trait, so the traversal mechanism can change without touching
//! the state machine.

use async_trait::async_trait;

use crate::report::SubmissionRecord;
use crate::target::DiffTarget;
use crate::Result;

/// A resolved handle to one annotatable line in the rendered diff
///
/// Produced by [`DiffSurface::locate`]; the `token` is surface-specific and
/// opaque to the engine (for the browser surface it is the id stamped onto
/// the located row).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// The target this anchor resolves
    pub target: DiffTarget,
    /// Surface-specific addressing token
    pub token: String,
}

impl Anchor {
    /// Create an anchor for a target with the given surface token
    pub fn new(target: DiffTarget, token: impl Into<String>) -> Self {
        Self {
            target,
            token: token.into(),
        }
    }
}

/// Which submission control places an annotation
///
/// The first placement in a session creates the pending review; every later
/// placement appends to it. The two controls are semantically distinct in
/// the diff view and must not be interchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    /// First placement: creates the pending review session
    StartReview,
    /// Subsequent placements: appends to the open session
    AddToReview,
}

/// Operations a rendered diff view must expose for annotation placement
///
/// Implementations drive a single shared mutable document; the engine calls
/// these strictly sequentially and holds exclusive access for the duration
/// of a review pass.
#[async_trait]
pub trait DiffSurface: Send {
    /// Resolve a target to a unique anchor in the rendered diff
    ///
    /// Expands the containing file's diff if it is collapsed behind a load
    /// placeholder, and scrolls the anchor into the visible viewport so the
    /// layout is settled before activation.
    async fn locate(&mut self, target: &DiffTarget) -> Result<Anchor>;

    /// Open the per-line comment form attached to the anchor
    async fn open_comment_form(&mut self, anchor: &Anchor) -> Result<()>;

    /// Whether an empty, editable comment form is attached to the anchor
    async fn comment_form_ready(&mut self, anchor: &Anchor) -> Result<bool>;

    /// Write the body into the open comment form
    ///
    /// The write must go through the host framework's own state-update path;
    /// a plain content assignment that the framework never observes does not
    /// satisfy this contract.
    async fn write_body(&mut self, anchor: &Anchor, body: &str) -> Result<()>;

    /// Read back the current content of the open comment form
    async fn read_body(&mut self, anchor: &Anchor) -> Result<String>;

    /// Press the submission control for this annotation
    async fn submit_annotation(&mut self, anchor: &Anchor, mode: PlacementMode) -> Result<()>;

    /// Whether the annotation shows as pending on the target line
    async fn annotation_pending(&mut self, anchor: &Anchor) -> Result<bool>;

    /// Submit the accumulated review with its verdict and summary
    async fn submit_review(&mut self, record: &SubmissionRecord) -> Result<()>;

    /// Whether the pending session is gone, i.e. the review went out
    async fn review_submitted(&mut self) -> Result<bool>;
}
