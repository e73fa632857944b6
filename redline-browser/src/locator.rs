//! Line location in the rendered diff
//!
//! Resolves a target to a unique row, clicking through load-diff
//! placeholders for collapsed files and re-polling while the expansion
//! hydrates. The winning row is stamped with an anchor token and scrolled
//! into view so the layout is settled before activation.

use std::time::Duration;

use serde_json::Value;
use tokio::time::{sleep, Instant};
use tracing::debug;

use redline_core::{Anchor, DiffTarget, Error, Result};

use crate::bridge::Evaluate;
use crate::scripts;

/// Status field of a script response
pub(crate) fn status_of(value: &Value) -> &str {
    value
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("malformed")
}

/// Resolve a target to a tagged, visible row
///
/// Retries while the file's diff is still loading or expanding, bounded by
/// `timeout`. An ambiguous match fails immediately: the target must resolve
/// to exactly one anchor.
pub(crate) async fn resolve(
    page: &impl Evaluate,
    target: &DiffTarget,
    token: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<Anchor> {
    let deadline = Instant::now() + timeout;
    let mut last_status = String::from("not attempted");

    loop {
        let response = page.eval_script(&scripts::locate(target, token)).await?;
        let status = status_of(&response);

        match status {
            "ok" => {
                debug!(%target, token, "Located anchor");
                return Ok(Anchor::new(target.clone(), token.to_string()));
            }
            "ambiguous" => {
                let count = response.get("count").and_then(Value::as_u64).unwrap_or(0);
                return Err(Error::TargetNotFound {
                    target: target.clone(),
                    detail: format!("{} rows match the line on that side", count),
                });
            }
            other => {
                last_status = other.to_string();
            }
        }

        if Instant::now() >= deadline {
            return Err(Error::TargetNotFound {
                target: target.clone(),
                detail: describe(&last_status),
            });
        }

        sleep(interval).await;
    }
}

fn describe(status: &str) -> String {
    match status {
        "no_file" => "file not present in the diff view".to_string(),
        "loading" => "diff did not finish loading before the timeout".to_string(),
        "not_found" => "line not present on the requested side".to_string(),
        other => format!("locator reported '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::testing::ScriptedPage;
    use serde_json::json;

    const FAST: Duration = Duration::from_millis(30);
    const TICK: Duration = Duration::from_millis(1);

    #[tokio::test]
    async fn test_resolve_succeeds_after_expansion() {
        // Collapsed file: first pass clicks the loader, second finds the row.
        let page = ScriptedPage::replying([
            json!({ "status": "loading" }),
            json!({ "status": "loading" }),
            json!({ "status": "ok" }),
        ]);

        let target = DiffTarget::revised("src/big.rs", 500);
        let anchor = resolve(&page, &target, "t-1", FAST, TICK).await.unwrap();

        assert_eq!(anchor.target, target);
        assert_eq!(anchor.token, "t-1");
        assert_eq!(page.scripts_seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_resolve_fails_on_ambiguous_match() {
        let page = ScriptedPage::replying([json!({ "status": "ambiguous", "count": 2 })]);

        let target = DiffTarget::revised("src/a.rs", 10);
        let err = resolve(&page, &target, "t", FAST, TICK).await.unwrap_err();

        match err {
            Error::TargetNotFound { detail, .. } => assert!(detail.contains("2 rows")),
            other => panic!("expected TargetNotFound, got {other:?}"),
        }
        // Ambiguity is terminal, no retry
        assert_eq!(page.scripts_seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_times_out_on_missing_file() {
        let page = ScriptedPage::replying(
            std::iter::repeat(json!({ "status": "no_file" })).take(64),
        );

        let target = DiffTarget::original("gone.rs", 1);
        let err = resolve(&page, &target, "t", FAST, TICK).await.unwrap_err();

        match err {
            Error::TargetNotFound { target: t, detail } => {
                assert_eq!(t.file, "gone.rs");
                assert!(detail.contains("file not present"));
            }
            other => panic!("expected TargetNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_status_of_reads_status_field() {
        assert_eq!(status_of(&json!({ "status": "ok" })), "ok");
        assert_eq!(status_of(&json!({ "status": "loading" })), "loading");
    }

    #[test]
    fn test_status_of_tolerates_malformed_responses() {
        assert_eq!(status_of(&json!({})), "malformed");
        assert_eq!(status_of(&json!(null)), "malformed");
        assert_eq!(status_of(&json!({ "status": 3 })), "malformed");
    }

    #[test]
    fn test_describe_known_statuses() {
        assert!(describe("no_file").contains("file not present"));
        assert!(describe("loading").contains("did not finish loading"));
        assert!(describe("not_found").contains("requested side"));
        assert!(describe("weird").contains("'weird'"));
    }
}
