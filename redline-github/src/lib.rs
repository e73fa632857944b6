//! Redline GitHub - API boundary for pull-request context and comments
//!
//! This crate provides the thin GitHub API wrappers around the review
//! workflow: fetching the context a review is synthesized from, and posting
//! a single conversation comment when inline placement is not selected.
//! Inline annotation itself never goes through the API; that is the browser
//! surface's job.

mod client;
mod comment;
mod context;
mod error;

pub use client::GitHubClient;
pub use context::PrContext;
pub use error::{Error, Result};
