//! Review reports: the interchange document between analysis and placement
//!
//! The analysis step (an external collaborator, typically an AI reviewer)
//! produces a [`ReviewReport`]: the list of inline annotations plus the
//! overall verdict and summary. Redline consumes the report and places it;
//! it never generates one.

use serde::{Deserialize, Serialize};

use crate::target::Annotation;
use crate::{Error, Result};

/// Overall review verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The change is good to merge as-is
    Approve,
    /// The change is mergeable but the annotations are worth acting on
    ApproveWithSuggestions,
    /// The change needs work before it can merge
    RequestChanges,
}

impl Verdict {
    /// Human-readable description of the verdict
    pub fn description(&self) -> &'static str {
        match self {
            Verdict::Approve => "Approve",
            Verdict::ApproveWithSuggestions => "Approve with suggestions",
            Verdict::RequestChanges => "Request changes",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// The verdict and summary submitted when a review session is finalized
///
/// Produced once per review pass and consumed by the finalizer; not
/// persisted anywhere by Redline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Overall verdict for the change set
    pub verdict: Verdict,
    /// Summary text shown at the top of the submitted review
    pub summary: String,
}

impl SubmissionRecord {
    /// Create a new submission record
    pub fn new(verdict: Verdict, summary: impl Into<String>) -> Self {
        Self {
            verdict,
            summary: summary.into(),
        }
    }
}

/// A complete review ready for placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReport {
    /// Inline annotations, placed in order
    pub annotations: Vec<Annotation>,
    /// Verdict and summary for the final submission
    #[serde(flatten)]
    pub record: SubmissionRecord,
}

impl ReviewReport {
    /// Parse a report from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        let report: ReviewReport = serde_json::from_str(json)?;
        report.validate()?;
        Ok(report)
    }

    /// Check the report is well-formed enough to place
    ///
    /// Rejects empty annotation lists (nothing to place inline), empty
    /// bodies, and zero line numbers.
    pub fn validate(&self) -> Result<()> {
        if self.annotations.is_empty() {
            return Err(Error::Other(
                "review report contains no annotations".to_string(),
            ));
        }

        for annotation in &self.annotations {
            if annotation.body.trim().is_empty() {
                return Err(Error::Other(format!(
                    "annotation for {} has an empty body",
                    annotation.target
                )));
            }
            if annotation.target.line == 0 {
                return Err(Error::Other(format!(
                    "annotation for {} has line 0; lines are 1-based",
                    annotation.target.file
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::DiffTarget;

    fn sample_json() -> &'static str {
        r#"{
            "annotations": [
                {"target": {"file": "src/parse.rs", "line": 42, "side": "revised"},
                 "body": "off-by-one on line 42"},
                {"target": {"file": "src/io.rs", "line": 10, "side": "original"},
                 "body": "consider batching"}
            ],
            "verdict": "approve_with_suggestions",
            "summary": "two minor notes"
        }"#
    }

    #[test]
    fn test_report_from_json() {
        let report = ReviewReport::from_json(sample_json()).unwrap();
        assert_eq!(report.annotations.len(), 2);
        assert_eq!(report.record.verdict, Verdict::ApproveWithSuggestions);
        assert_eq!(report.record.summary, "two minor notes");
    }

    #[test]
    fn test_report_roundtrip_keeps_flattened_record() {
        let report = ReviewReport::from_json(sample_json()).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        // The record stays flattened, not nested under "record"
        assert!(json.contains("\"verdict\":\"approve_with_suggestions\""));
        assert!(!json.contains("\"record\""));

        let parsed = ReviewReport::from_json(&json).unwrap();
        assert_eq!(parsed.annotations, report.annotations);
        assert_eq!(parsed.record, report.record);
    }

    #[test]
    fn test_report_rejects_empty_annotations() {
        let json = r#"{"annotations": [], "verdict": "approve", "summary": "ok"}"#;
        assert!(ReviewReport::from_json(json).is_err());
    }

    #[test]
    fn test_report_rejects_empty_body() {
        let report = ReviewReport {
            annotations: vec![Annotation::new(DiffTarget::revised("a.rs", 1), "   ")],
            record: SubmissionRecord::new(Verdict::Approve, "fine"),
        };
        assert!(report.validate().is_err());
    }

    #[test]
    fn test_report_rejects_line_zero() {
        let report = ReviewReport {
            annotations: vec![Annotation::new(DiffTarget::revised("a.rs", 0), "note")],
            record: SubmissionRecord::new(Verdict::Approve, "fine"),
        };
        assert!(report.validate().is_err());
    }

    #[test]
    fn test_verdict_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&Verdict::RequestChanges).unwrap(),
            "\"request_changes\""
        );
        let verdict: Verdict = serde_json::from_str("\"approve\"").unwrap();
        assert_eq!(verdict, Verdict::Approve);
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(format!("{}", Verdict::Approve), "Approve");
        assert_eq!(
            format!("{}", Verdict::ApproveWithSuggestions),
            "Approve with suggestions"
        );
        assert_eq!(format!("{}", Verdict::RequestChanges), "Request changes");
    }
}
