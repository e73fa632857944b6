//! Review session controls
//!
//! The per-annotation submission buttons ("start a review" vs "add review
//! comment"), the pending-state readback, and the final review dialog.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use redline_core::{poll, Anchor, Error, PlacementMode, Result, SubmissionRecord, Verdict};

use crate::bridge::Evaluate;
use crate::locator::status_of;
use crate::scripts;

/// The platform review event a verdict submits as
///
/// The platform only distinguishes approve / comment / request-changes;
/// an approval that carries suggestions goes out as a comment review, with
/// the distinction preserved in the summary and the interchange JSON.
pub(crate) fn review_event(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Approve => "approve",
        Verdict::ApproveWithSuggestions => "comment",
        Verdict::RequestChanges => "reject",
    }
}

/// Press the submission control for one annotation
pub(crate) async fn submit_annotation(
    page: &impl Evaluate,
    anchor: &Anchor,
    mode: PlacementMode,
) -> Result<()> {
    let start_review = mode == PlacementMode::StartReview;
    let response = page
        .eval_script(&scripts::submit_annotation(&anchor.token, start_review))
        .await?;

    match status_of(&response) {
        "ok" => {
            debug!(target = %anchor.target, ?mode, "Annotation submitted");
            Ok(())
        }
        "no_anchor" => Err(Error::TargetNotFound {
            target: anchor.target.clone(),
            detail: "anchor tag disappeared before submission".to_string(),
        }),
        status => Err(Error::Driver(format!(
            "submission control unavailable for {} ({})",
            anchor.target, status
        ))),
    }
}

/// Whether the annotation shows as pending under the anchor row
pub(crate) async fn annotation_pending(page: &impl Evaluate, anchor: &Anchor) -> Result<bool> {
    let response = page.eval_script(&scripts::annotation_pending(&anchor.token)).await?;
    Ok(status_of(&response) == "ok"
        && response
            .get("pending")
            .and_then(Value::as_bool)
            .unwrap_or(false))
}

/// Open the review dialog, fill it, and submit the session
pub(crate) async fn submit_review(
    page: &impl Evaluate,
    record: &SubmissionRecord,
    interval: Duration,
    timeout: Duration,
) -> Result<()> {
    let response = page.eval_script(&scripts::open_review_dialog()).await?;
    if status_of(&response) != "ok" {
        return Err(Error::Driver(
            "review dialog control not found; is a review session open?".to_string(),
        ));
    }

    // The dialog renders asynchronously after the toggle.
    let ready_script = scripts::review_dialog_ready();
    let script = ready_script.as_str();
    let open = poll::until(interval, timeout, move || async move {
        let response = page.eval_script(script).await?;
        Ok(response.get("open").and_then(Value::as_bool).unwrap_or(false))
    })
    .await?;
    if !open {
        return Err(Error::Driver(
            "review dialog did not open before the timeout".to_string(),
        ));
    }

    let event = review_event(record.verdict);
    let response = page
        .eval_script(&scripts::submit_review(event, &record.summary))
        .await?;

    match status_of(&response) {
        "ok" => {
            info!(verdict = %record.verdict, event, "Review dialog submitted");
            Ok(())
        }
        status => Err(Error::Driver(format!(
            "review submission failed in the dialog ({})",
            status
        ))),
    }
}

/// Whether the pending session is gone from the page
pub(crate) async fn review_submitted(page: &impl Evaluate) -> Result<bool> {
    let response = page.eval_script(&scripts::review_submitted()).await?;
    Ok(status_of(&response) == "ok"
        && response
            .get("submitted")
            .and_then(Value::as_bool)
            .unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::testing::ScriptedPage;
    use redline_core::DiffTarget;
    use serde_json::json;

    const FAST: Duration = Duration::from_millis(30);
    const TICK: Duration = Duration::from_millis(1);

    fn anchor() -> Anchor {
        Anchor::new(DiffTarget::revised("src/c.rs", 3), "t-3")
    }

    #[test]
    fn test_verdict_to_review_event() {
        assert_eq!(review_event(Verdict::Approve), "approve");
        assert_eq!(review_event(Verdict::ApproveWithSuggestions), "comment");
        assert_eq!(review_event(Verdict::RequestChanges), "reject");
    }

    #[tokio::test]
    async fn test_submit_annotation_uses_mode_label() {
        let page = ScriptedPage::replying([json!({ "status": "ok" })]);
        submit_annotation(&page, &anchor(), PlacementMode::StartReview)
            .await
            .unwrap();

        let scripts = page.scripts_seen.lock().unwrap();
        assert!(scripts[0].contains("start a review"));
    }

    #[tokio::test]
    async fn test_submit_annotation_maps_missing_button() {
        let page = ScriptedPage::replying([json!({ "status": "no_button" })]);
        let err = submit_annotation(&page, &anchor(), PlacementMode::AddToReview)
            .await
            .unwrap_err();
        match err {
            Error::Driver(msg) => {
                assert!(msg.contains("src/c.rs:3"));
                assert!(msg.contains("no_button"));
            }
            other => panic!("expected Driver, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_annotation_pending_readback() {
        let page = ScriptedPage::replying([
            json!({ "status": "ok", "pending": true }),
            json!({ "status": "ok", "pending": false }),
        ]);
        assert!(annotation_pending(&page, &anchor()).await.unwrap());
        assert!(!annotation_pending(&page, &anchor()).await.unwrap());
    }

    #[tokio::test]
    async fn test_submit_review_full_flow() {
        let page = ScriptedPage::replying([
            json!({ "status": "ok" }),
            json!({ "status": "ok", "open": false }),
            json!({ "status": "ok", "open": true }),
            json!({ "status": "ok" }),
        ]);

        let record = SubmissionRecord::new(Verdict::ApproveWithSuggestions, "two minor notes");
        submit_review(&page, &record, TICK, FAST).await.unwrap();

        let scripts = page.scripts_seen.lock().unwrap();
        let submit = scripts.last().unwrap();
        assert!(submit.contains(r#"const event = "comment";"#));
        assert!(submit.contains("two minor notes"));
    }

    #[tokio::test]
    async fn test_submit_review_fails_when_dialog_never_opens() {
        let page = ScriptedPage::replying(
            std::iter::once(json!({ "status": "ok" }))
                .chain(std::iter::repeat(json!({ "status": "ok", "open": false })).take(64)),
        );

        let record = SubmissionRecord::new(Verdict::Approve, "lgtm");
        let err = submit_review(&page, &record, TICK, FAST).await.unwrap_err();
        match err {
            Error::Driver(msg) => assert!(msg.contains("did not open")),
            other => panic!("expected Driver, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_review_submitted_readback() {
        let page = ScriptedPage::replying([
            json!({ "status": "ok", "submitted": false }),
            json!({ "status": "ok", "submitted": true }),
        ]);
        assert!(!review_submitted(&page).await.unwrap());
        assert!(review_submitted(&page).await.unwrap());
    }
}
