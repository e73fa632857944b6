//! Diff targets and annotations
//!
//! A [`DiffTarget`] names one annotatable position in a rendered diff: the
//! file, the line number, and which side of the change the line belongs to.
//! Side matters because deletions and additions can share a line number
//! across the old and new content.

use serde::{Deserialize, Serialize};

/// Which side of the diff a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffSide {
    /// The old content (deletions, left column)
    Original,
    /// The new content (additions, right column)
    Revised,
}

impl DiffSide {
    /// Short label used in error messages and logs
    pub fn label(&self) -> &'static str {
        match self {
            DiffSide::Original => "original",
            DiffSide::Revised => "revised",
        }
    }
}

impl std::fmt::Display for DiffSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One annotatable position in a rendered diff
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiffTarget {
    /// Path of the file within the change set
    pub file: String,
    /// 1-based line number on the given side
    pub line: u32,
    /// Which side of the diff the line belongs to
    pub side: DiffSide,
}

impl DiffTarget {
    /// Create a target on the revised (new) side of the diff
    pub fn revised(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            side: DiffSide::Revised,
        }
    }

    /// Create a target on the original (old) side of the diff
    pub fn original(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            side: DiffSide::Original,
        }
    }
}

impl std::fmt::Display for DiffTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} ({})", self.file, self.line, self.side)
    }
}

/// One piece of review feedback bound to one line of the diff
///
/// Immutable once created; the body is free-form markdown and may span
/// multiple lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Where the feedback belongs
    pub target: DiffTarget,
    /// The feedback text
    pub body: String,
}

impl Annotation {
    /// Create a new annotation
    pub fn new(target: DiffTarget, body: impl Into<String>) -> Self {
        Self {
            target,
            body: body.into(),
        }
    }
}
