//! Comment-control activation
//!
//! The per-line add-comment control only renders on hover and only responds
//! to the diff view's internal press-handler path, so activation walks the
//! component-instance chain from the anchor outward and invokes the first
//! press handler it finds with a synthesized event. No pointer simulation
//! is involved.

use serde_json::Value;
use tracing::debug;

use redline_core::{Anchor, Error, Result};

use crate::bridge::Evaluate;
use crate::locator::status_of;
use crate::scripts;

/// Invoke the press handler that opens the comment form for the anchor
pub(crate) async fn open(page: &impl Evaluate, anchor: &Anchor) -> Result<()> {
    let response = page.eval_script(&scripts::activate(&anchor.token)).await?;

    match status_of(&response) {
        "ok" => {
            let confirmed = response
                .get("confirmed")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            debug!(target = %anchor.target, confirmed, "Press handler invoked");
            Ok(())
        }
        "no_anchor" => Err(Error::TargetNotFound {
            target: anchor.target.clone(),
            detail: "anchor tag disappeared; the view re-rendered".to_string(),
        }),
        _ => Err(Error::AffordanceNotFound {
            target: anchor.target.clone(),
        }),
    }
}

/// Whether an empty, editable comment form is attached to the anchor
pub(crate) async fn form_ready(page: &impl Evaluate, anchor: &Anchor) -> Result<bool> {
    let response = page.eval_script(&scripts::form_state(&anchor.token)).await?;

    if status_of(&response) != "ok" {
        return Ok(false);
    }

    let open = response.get("open").and_then(Value::as_bool).unwrap_or(false);
    let empty = response
        .get("value")
        .and_then(Value::as_str)
        .map(str::is_empty)
        .unwrap_or(false);

    Ok(open && empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::testing::ScriptedPage;
    use redline_core::DiffTarget;
    use serde_json::json;

    fn anchor() -> Anchor {
        Anchor::new(DiffTarget::revised("src/a.rs", 5), "t-1")
    }

    #[tokio::test]
    async fn test_open_succeeds_when_handler_pressed() {
        let page = ScriptedPage::replying([json!({ "status": "ok", "confirmed": true })]);
        open(&page, &anchor()).await.unwrap();
    }

    #[tokio::test]
    async fn test_open_maps_missing_handler_to_affordance_not_found() {
        let page = ScriptedPage::replying([json!({ "status": "no_handler" })]);
        let err = open(&page, &anchor()).await.unwrap_err();
        match err {
            Error::AffordanceNotFound { target } => assert_eq!(target.file, "src/a.rs"),
            other => panic!("expected AffordanceNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_open_maps_lost_anchor_to_target_not_found() {
        let page = ScriptedPage::replying([json!({ "status": "no_anchor" })]);
        let err = open(&page, &anchor()).await.unwrap_err();
        assert!(matches!(err, Error::TargetNotFound { .. }));
    }

    #[tokio::test]
    async fn test_form_ready_requires_open_and_empty() {
        let page = ScriptedPage::replying([
            json!({ "status": "ok", "open": true, "value": "" }),
            json!({ "status": "ok", "open": true, "value": "leftover" }),
            json!({ "status": "ok", "open": false, "value": null }),
            json!({ "status": "no_anchor" }),
        ]);

        assert!(form_ready(&page, &anchor()).await.unwrap());
        assert!(!form_ready(&page, &anchor()).await.unwrap());
        assert!(!form_ready(&page, &anchor()).await.unwrap());
        assert!(!form_ready(&page, &anchor()).await.unwrap());
    }
}
