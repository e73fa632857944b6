//! Redline Browser - GitHub diff surface over a Playwright sidecar
//!
//! This crate owns everything browser-specific: the JSON-line bridge to a
//! Node/Playwright driver process, the page scripts that defeat the diff
//! view's hover-gated controls and shadow-tracked inputs, and the
//! [`GithubDiffSurface`] the session engine drives.

mod activator;
mod bridge;
mod controls;
mod editor;
mod locator;
mod scripts;
mod surface;

pub use bridge::{BridgeError, BridgeResult, PageBridge};
pub use surface::GithubDiffSurface;
