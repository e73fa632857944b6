//! Redline Core - Review session engine for inline PR annotation
//!
//! This crate owns the data model and the state machine for placing a draft
//! review onto a rendered diff: one pending inline annotation per finding,
//! then a single submission carrying the verdict and summary. Everything
//! browser-specific lives behind the [`DiffSurface`] trait.

pub mod config;
pub mod error;
pub mod poll;
pub mod report;
pub mod secrets;
pub mod session;
pub mod surface;
pub mod target;

pub use config::{BrowserConfig, Config, TimeoutConfig};
pub use error::{Error, Result};
pub use report::{ReviewReport, SubmissionRecord, Verdict};
pub use secrets::Secrets;
pub use session::{PlaceStage, ReviewSession, SessionOptions, SessionState};
pub use surface::{Anchor, DiffSurface, PlacementMode};
pub use target::{Annotation, DiffSide, DiffTarget};
