//! Comment-form editing
//!
//! Content goes in through the textarea prototype's value setter followed
//! by synthetic input/change events; the diff view's framework tracks input
//! state internally and never sees a bare `value` assignment. The readback
//! returns whatever the form actually holds, which is what the session
//! engine compares against the intended body.

use serde_json::Value;

use redline_core::{Anchor, Error, Result};

use crate::bridge::Evaluate;
use crate::locator::status_of;
use crate::scripts;

/// Set the form content to exactly `body`
pub(crate) async fn write(page: &impl Evaluate, anchor: &Anchor, body: &str) -> Result<()> {
    let response = page.eval_script(&scripts::write_body(&anchor.token, body)).await?;

    match status_of(&response) {
        "ok" => Ok(()),
        _ => Err(Error::EditorNotReady {
            target: anchor.target.clone(),
        }),
    }
}

/// Read back the current form content
pub(crate) async fn read(page: &impl Evaluate, anchor: &Anchor) -> Result<String> {
    let response = page.eval_script(&scripts::form_state(&anchor.token)).await?;

    if status_of(&response) != "ok"
        || !response.get("open").and_then(Value::as_bool).unwrap_or(false)
    {
        return Err(Error::EditorNotReady {
            target: anchor.target.clone(),
        });
    }

    Ok(response
        .get("value")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::testing::ScriptedPage;
    use redline_core::DiffTarget;
    use serde_json::json;

    fn anchor() -> Anchor {
        Anchor::new(DiffTarget::revised("src/b.rs", 9), "t-2")
    }

    #[tokio::test]
    async fn test_write_succeeds_when_editor_accepts() {
        let page = ScriptedPage::replying([json!({ "status": "ok", "value": "note" })]);
        write(&page, &anchor(), "note").await.unwrap();
    }

    #[tokio::test]
    async fn test_write_maps_missing_editor() {
        let page = ScriptedPage::replying([json!({ "status": "no_editor" })]);
        let err = write(&page, &anchor(), "note").await.unwrap_err();
        assert!(matches!(err, Error::EditorNotReady { .. }));
    }

    #[tokio::test]
    async fn test_read_returns_live_value() {
        let page = ScriptedPage::replying([json!({
            "status": "ok", "open": true, "value": "line one\nline two"
        })]);
        let body = read(&page, &anchor()).await.unwrap();
        assert_eq!(body, "line one\nline two");
    }

    #[tokio::test]
    async fn test_read_fails_when_form_closed() {
        let page = ScriptedPage::replying([json!({ "status": "ok", "open": false })]);
        let err = read(&page, &anchor()).await.unwrap_err();
        match err {
            Error::EditorNotReady { target } => assert_eq!(target.line, 9),
            other => panic!("expected EditorNotReady, got {other:?}"),
        }
    }
}
